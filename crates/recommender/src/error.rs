//! Error types for the recommender crate.

use catalog::{CatalogError, UserId};
use thiserror::Error;

/// Errors surfaced by the recommendation engine.
///
/// `NoSubscriptions` is a precondition failure the caller can recover from
/// (prompt the student to subscribe first). `Catalog` wraps lookup failures
/// unchanged.
#[derive(Error, Debug)]
pub enum RecommendError {
    /// Recommendations need at least one seed course
    #[error("student {student_id} has no subscriptions to base recommendations on")]
    NoSubscriptions { student_id: UserId },

    /// The catalog lookup itself failed
    #[error("catalog lookup failed: {0}")]
    Catalog(#[from] CatalogError),

    /// Engine settings are unusable (zero limits)
    #[error("invalid recommender configuration: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, RecommendError>;
