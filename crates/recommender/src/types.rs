//! Shared types for the recommendation engine.

use crate::error::{RecommendError, Result};
use catalog::{CourseId, UserId};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};

/// The slice of a course the engine cares about
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CourseRecord {
    pub id: CourseId,
    pub category: String,
    pub tags: BTreeSet<String>,
}

/// Where a candidate came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CandidateSource {
    /// Same category as a subscribed course, scored by shared tags
    CategoryMatch,
    /// Filler drawn from the whole catalog when matches run short
    Backfill,
}

/// Extra context kept for explanations
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CandidateMetadata {
    /// Subscribed course this candidate was matched against
    pub seed_course: Option<CourseId>,
    /// Tag names shared with the seed course, sorted
    pub shared_tags: Vec<String>,
}

/// A course paired with its integer relevance score
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub course_id: CourseId,
    pub source: CandidateSource,
    /// Number of tags shared with the seed course; always 0 for backfill
    pub score: u32,
    pub metadata: CandidateMetadata,
}

impl Candidate {
    pub fn new(course_id: CourseId, source: CandidateSource, score: u32) -> Self {
        Self {
            course_id,
            source,
            score,
            metadata: CandidateMetadata::default(),
        }
    }
}

/// Everything the engine knows about the requesting student
#[derive(Debug, Clone)]
pub struct StudentContext {
    pub student_id: UserId,
    /// Subscribed courses, ascending by id
    pub subscribed: Vec<CourseRecord>,
    pub subscribed_ids: HashSet<CourseId>,
}

impl StudentContext {
    pub fn new(student_id: UserId, mut subscribed: Vec<CourseRecord>) -> Self {
        subscribed.sort_by_key(|c| c.id);
        subscribed.dedup_by_key(|c| c.id);
        let subscribed_ids = subscribed.iter().map(|c| c.id).collect();
        Self {
            student_id,
            subscribed,
            subscribed_ids,
        }
    }
}

/// How backfill courses are picked from the eligible pool.
///
/// Both policies are reproducible: `Ascending` walks course ids in order,
/// `Seeded` shuffles the id-sorted pool with a seeded generator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackfillOrder {
    #[default]
    Ascending,
    Seeded(u64),
}

/// Tunable engine settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecommenderConfig {
    /// Upper bound on returned courses
    pub max_results: usize,
    /// Top matches kept per subscribed course
    pub per_seed_limit: usize,
    pub backfill: BackfillOrder,
}

impl Default for RecommenderConfig {
    fn default() -> Self {
        Self {
            max_results: 5,
            per_seed_limit: 4,
            backfill: BackfillOrder::Ascending,
        }
    }
}

impl RecommenderConfig {
    pub fn validate(&self) -> Result<()> {
        if self.max_results == 0 {
            return Err(RecommendError::InvalidConfig(
                "max_results must be at least 1".to_string(),
            ));
        }
        if self.per_seed_limit == 0 {
            return Err(RecommendError::InvalidConfig(
                "per_seed_limit must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
