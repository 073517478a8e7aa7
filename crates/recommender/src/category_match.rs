//! Category Match Source - tag overlap within a category
//!
//! Generates candidates from the student's own subscriptions:
//! "Courses in the same category that share the most tags with yours"
//!
//! ## Algorithm
//! 1. For each subscribed course (in parallel):
//!    - Find catalog courses in the same category, minus every subscribed course
//!    - Score each by the number of tag names it shares with the subscribed course
//!    - Sort by score DESC, course id ASC, keep the top `per_seed_limit`
//! 2. Merge the per-seed lists: a course reached from several seeds keeps its
//!    highest score (the earlier seed wins a tie)
//! 3. Sort the merged set by score DESC, course id ASC

use crate::error::Result;
use crate::lookup::CatalogLookup;
use crate::types::{Candidate, CandidateSource, CourseRecord, StudentContext};
use catalog::CourseId;
use rayon::prelude::*;
use std::collections::{HashMap, HashSet};
use tracing::{debug, instrument};

/// Scores same-category courses by shared tags
#[derive(Debug, Clone)]
pub struct CategoryMatchSource {
    /// How many top matches each subscribed course contributes
    per_seed_limit: usize,
}

impl CategoryMatchSource {
    pub fn new() -> Self {
        Self { per_seed_limit: 4 }
    }

    /// Configure matches kept per subscribed course (default: 4)
    pub fn with_per_seed_limit(mut self, limit: usize) -> Self {
        self.per_seed_limit = limit;
        self
    }

    /// Generate ranked, deduplicated candidates for a student
    #[instrument(skip(self, lookup, context), fields(student_id = context.student_id))]
    pub fn get_candidates<L>(&self, lookup: &L, context: &StudentContext) -> Result<Vec<Candidate>>
    where
        L: CatalogLookup + ?Sized,
    {
        // Step 1: Score every seed independently
        let per_seed: Vec<Vec<Candidate>> = context
            .subscribed
            .par_iter()
            .map(|seed| self.score_seed(lookup, seed, &context.subscribed_ids))
            .collect::<Result<_>>()?;

        // Step 2: Merge in seed order so ties resolve the same way every run
        let mut merged: HashMap<CourseId, Candidate> = HashMap::new();
        for candidate in per_seed.into_iter().flatten() {
            merged
                .entry(candidate.course_id)
                .and_modify(|existing| {
                    if candidate.score > existing.score {
                        *existing = candidate.clone();
                    }
                })
                .or_insert(candidate);
        }

        // Step 3: Rank
        let mut candidates: Vec<Candidate> = merged.into_values().collect();
        sort_by_relevance(&mut candidates);

        debug!("Generated {} category-match candidates", candidates.len());
        Ok(candidates)
    }

    /// Top matches for a single subscribed course
    fn score_seed<L>(
        &self,
        lookup: &L,
        seed: &CourseRecord,
        excluded: &HashSet<CourseId>,
    ) -> Result<Vec<Candidate>>
    where
        L: CatalogLookup + ?Sized,
    {
        let same_category = lookup.find_same_category_excluding(&seed.category, excluded)?;

        let mut candidates: Vec<Candidate> = same_category
            .into_iter()
            .map(|course| {
                let shared_tags: Vec<String> =
                    seed.tags.intersection(&course.tags).cloned().collect();
                let mut candidate = Candidate::new(
                    course.id,
                    CandidateSource::CategoryMatch,
                    shared_tags.len() as u32,
                );
                candidate.metadata.seed_course = Some(seed.id);
                candidate.metadata.shared_tags = shared_tags;
                candidate
            })
            .collect();

        sort_by_relevance(&mut candidates);
        candidates.truncate(self.per_seed_limit);
        Ok(candidates)
    }
}

impl Default for CategoryMatchSource {
    fn default() -> Self {
        Self::new()
    }
}

/// Score DESC, then course id ASC
pub(crate) fn sort_by_relevance(candidates: &mut [Candidate]) {
    candidates.sort_by(|a, b| {
        b.score
            .cmp(&a.score)
            .then_with(|| a.course_id.cmp(&b.course_id))
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::StudentContext;
    use std::collections::BTreeSet;

    /// In-memory lookup over a fixed list of records
    struct FixedCatalog(Vec<CourseRecord>);

    impl CatalogLookup for FixedCatalog {
        fn subscribed_courses(&self, _: catalog::UserId) -> catalog::Result<Vec<CourseRecord>> {
            Ok(Vec::new())
        }

        fn find_same_category_excluding(
            &self,
            category: &str,
            excluded: &HashSet<CourseId>,
        ) -> catalog::Result<Vec<CourseRecord>> {
            Ok(self
                .0
                .iter()
                .filter(|c| c.category == category && !excluded.contains(&c.id))
                .cloned()
                .collect())
        }

        fn random_sample_excluding(
            &self,
            _: &HashSet<CourseId>,
            _: usize,
            _: crate::types::BackfillOrder,
        ) -> catalog::Result<Vec<CourseId>> {
            Ok(Vec::new())
        }
    }

    fn record(id: CourseId, category: &str, tags: &[&str]) -> CourseRecord {
        CourseRecord {
            id,
            category: category.to_string(),
            tags: tags.iter().map(|t| t.to_string()).collect::<BTreeSet<_>>(),
        }
    }

    #[test]
    fn test_scores_by_shared_tags() {
        let a = record(1, "programming", &["Python", "Backend"]);
        let catalog = FixedCatalog(vec![
            a.clone(),
            record(2, "programming", &["Python", "DSA"]),
            record(3, "programming", &["Python", "Backend"]),
            record(4, "web", &["Python", "Backend"]),
        ]);
        let context = StudentContext::new(10, vec![a]);

        let candidates = CategoryMatchSource::new()
            .get_candidates(&catalog, &context)
            .unwrap();

        let ranked: Vec<(CourseId, u32)> =
            candidates.iter().map(|c| (c.course_id, c.score)).collect();
        assert_eq!(ranked, vec![(3, 2), (2, 1)]);
        assert_eq!(candidates[0].metadata.seed_course, Some(1));
        assert_eq!(candidates[0].metadata.shared_tags, vec!["Backend", "Python"]);
    }

    #[test]
    fn test_per_seed_limit_and_tie_break() {
        let seed = record(1, "ai", &["AI"]);
        let mut courses = vec![seed.clone()];
        for id in (2..=8).rev() {
            courses.push(record(id, "ai", &["AI"]));
        }
        let catalog = FixedCatalog(courses);
        let context = StudentContext::new(10, vec![seed]);

        let candidates = CategoryMatchSource::new()
            .with_per_seed_limit(3)
            .get_candidates(&catalog, &context)
            .unwrap();

        let ids: Vec<CourseId> = candidates.iter().map(|c| c.course_id).collect();
        assert_eq!(ids, vec![2, 3, 4]);
    }

    #[test]
    fn test_shared_candidate_kept_once_with_best_score() {
        let ml = record(1, "ai", &["Machine Learning", "Python"]);
        let everyone = record(2, "ai", &["AI", "Python"]);
        let catalog = FixedCatalog(vec![
            ml.clone(),
            everyone.clone(),
            record(3, "ai", &["AI", "Machine Learning"]),
        ]);
        let context = StudentContext::new(10, vec![ml, everyone]);

        let candidates = CategoryMatchSource::new()
            .get_candidates(&catalog, &context)
            .unwrap();

        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].course_id, 3);
        assert_eq!(candidates[0].score, 1);
        // Equal score from both seeds: the lower seed id wins
        assert_eq!(candidates[0].metadata.seed_course, Some(1));
    }
}
