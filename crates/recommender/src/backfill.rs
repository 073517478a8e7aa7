//! Backfill Source - filler from the whole catalog
//!
//! When category matching yields fewer courses than requested, the gap is
//! filled with courses the student neither subscribes to nor already got as a
//! match. Backfill candidates carry score 0 and always rank after matches.

use crate::error::Result;
use crate::lookup::CatalogLookup;
use crate::types::{BackfillOrder, Candidate, CandidateSource, StudentContext};
use catalog::CourseId;
use std::collections::HashSet;
use tracing::{debug, instrument};

/// Picks unrelated courses to top up a short recommendation list
#[derive(Debug, Clone, Default)]
pub struct BackfillSource {
    order: BackfillOrder,
}

impl BackfillSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Configure how filler courses are picked (default: ascending id)
    pub fn with_order(mut self, order: BackfillOrder) -> Self {
        self.order = order;
        self
    }

    /// Up to `needed` filler candidates, skipping subscribed courses and the
    /// ids in `already_picked`
    #[instrument(skip(self, lookup, context, already_picked), fields(student_id = context.student_id))]
    pub fn get_candidates<L>(
        &self,
        lookup: &L,
        context: &StudentContext,
        already_picked: &[CourseId],
        needed: usize,
    ) -> Result<Vec<Candidate>>
    where
        L: CatalogLookup + ?Sized,
    {
        if needed == 0 {
            return Ok(Vec::new());
        }

        let mut excluded: HashSet<CourseId> = context.subscribed_ids.clone();
        excluded.extend(already_picked.iter().copied());

        let candidates: Vec<Candidate> = lookup
            .random_sample_excluding(&excluded, needed, self.order)?
            .into_iter()
            .map(|id| Candidate::new(id, CandidateSource::Backfill, 0))
            .collect();

        debug!(
            "Backfilled {} of {} requested courses",
            candidates.len(),
            needed
        );
        Ok(candidates)
    }
}
