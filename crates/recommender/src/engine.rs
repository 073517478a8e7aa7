//! # Recommendation Engine
//!
//! Runs the full heuristic for one student:
//! 1. Build the student context (fails without subscriptions)
//! 2. Category-match candidates, ranked and deduplicated
//! 3. Truncate to `max_results`
//! 4. Backfill from the rest of the catalog if the list is short
//!
//! The result never contains a subscribed course, holds at most
//! `max_results` distinct courses, and is identical across runs for the same
//! catalog, subscriptions and configuration.

use crate::backfill::BackfillSource;
use crate::category_match::CategoryMatchSource;
use crate::error::Result;
use crate::lookup::CatalogLookup;
use crate::student_context::build_student_context;
use crate::types::{Candidate, RecommenderConfig};
use catalog::{CourseId, UserId};
use std::time::Instant;
use tracing::{debug, info, instrument};

#[derive(Debug, Clone)]
pub struct Recommender {
    config: RecommenderConfig,
    category_match: CategoryMatchSource,
    backfill: BackfillSource,
}

impl Recommender {
    /// Create an engine from validated settings
    pub fn new(config: RecommenderConfig) -> Result<Self> {
        config.validate()?;
        let category_match =
            CategoryMatchSource::new().with_per_seed_limit(config.per_seed_limit);
        let backfill = BackfillSource::new().with_order(config.backfill);
        Ok(Self {
            config,
            category_match,
            backfill,
        })
    }

    pub fn config(&self) -> &RecommenderConfig {
        &self.config
    }

    /// Ordered recommendations for `student_id`
    ///
    /// Matches come first (score DESC, course id ASC); backfill courses follow
    /// with score 0 in the order the backfill policy produced them.
    #[instrument(skip(self, lookup))]
    pub fn recommend<L>(&self, lookup: &L, student_id: UserId) -> Result<Vec<Candidate>>
    where
        L: CatalogLookup + ?Sized,
    {
        let start_time = Instant::now();

        let context = build_student_context(lookup, student_id)?;

        let mut recommendations = self.category_match.get_candidates(lookup, &context)?;
        recommendations.truncate(self.config.max_results);
        debug!("{} category matches kept", recommendations.len());

        let needed = self.config.max_results - recommendations.len();
        if needed > 0 {
            let picked: Vec<CourseId> = recommendations.iter().map(|c| c.course_id).collect();
            let filler = self
                .backfill
                .get_candidates(lookup, &context, &picked, needed)?;
            recommendations.extend(filler);
        }

        info!(
            "Recommended {} courses for student {} in {:.2?}",
            recommendations.len(),
            student_id,
            start_time.elapsed()
        );
        Ok(recommendations)
    }

    /// Like `recommend`, reduced to course ids
    pub fn recommend_ids<L>(&self, lookup: &L, student_id: UserId) -> Result<Vec<CourseId>>
    where
        L: CatalogLookup + ?Sized,
    {
        Ok(self
            .recommend(lookup, student_id)?
            .into_iter()
            .map(|c| c.course_id)
            .collect())
    }
}

impl Default for Recommender {
    fn default() -> Self {
        let config = RecommenderConfig::default();
        Self {
            category_match: CategoryMatchSource::new().with_per_seed_limit(config.per_seed_limit),
            backfill: BackfillSource::new().with_order(config.backfill),
            config,
        }
    }
}
