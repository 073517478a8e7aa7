//! Error types for service operations.
//!
//! Every failure a caller can see is a `ServiceError`; `status_code()` gives
//! the HTTP-style status a transport layer would answer with.

use crate::config::ConfigError;
use access::AccessError;
use catalog::CatalogError;
use recommender::RecommendError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ServiceError {
    /// A policy refused the request
    #[error(transparent)]
    Access(#[from] AccessError),

    /// The catalog rejected a mutation or could not be loaded
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error(transparent)]
    Recommend(#[from] RecommendError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Target row does not exist; `key` is the id or email looked up
    #[error("{entity} not found.")]
    NotFound { entity: &'static str, key: String },

    /// Recommendation took longer than the configured budget
    #[error("Recommendation timed out after {timeout_ms} ms")]
    Timeout { timeout_ms: u64 },

    /// Background task failed (panic or cancellation)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ServiceError {
    pub(crate) fn not_found(entity: &'static str, key: impl ToString) -> Self {
        ServiceError::NotFound {
            entity,
            key: key.to_string(),
        }
    }

    /// HTTP-style status for this failure
    pub fn status_code(&self) -> u16 {
        match self {
            ServiceError::Access(AccessError::Unauthenticated) => 401,
            ServiceError::Access(AccessError::Forbidden { .. }) => 403,
            ServiceError::Access(AccessError::CourseNotFound { .. }) => 404,

            ServiceError::Catalog(e) => match e {
                CatalogError::FileNotFound { .. }
                | CatalogError::IoError(_)
                | CatalogError::ParseError { .. } => 500,
                CatalogError::InvalidValue { .. }
                | CatalogError::MissingReference { .. }
                | CatalogError::UnknownName { .. }
                | CatalogError::DuplicateEmail { .. }
                | CatalogError::DuplicateTag { .. }
                | CatalogError::AlreadySubscribed { .. }
                | CatalogError::ValidationError(_) => 400,
            },

            // No subscriptions is the caller's problem; anything else is ours
            ServiceError::Recommend(RecommendError::NoSubscriptions { .. }) => 404,
            ServiceError::Recommend(_) => 500,

            ServiceError::NotFound { .. } => 404,
            ServiceError::Timeout { .. } => 504,
            ServiceError::Config(_) | ServiceError::Internal(_) => 500,
        }
    }

    /// True for failures the caller can fix by changing the request
    pub fn is_client_error(&self) -> bool {
        (400..500).contains(&self.status_code())
    }
}

pub type Result<T> = std::result::Result<T, ServiceError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(ServiceError::from(AccessError::Unauthenticated).status_code(), 401);
        assert_eq!(
            ServiceError::from(AccessError::Forbidden {
                policy: "StudentOnly".to_string(),
                message: "Only students can access this.".to_string(),
            })
            .status_code(),
            403
        );
        assert_eq!(
            ServiceError::from(CatalogError::AlreadySubscribed {
                student_id: 1,
                course_id: 2
            })
            .status_code(),
            400
        );
        assert_eq!(
            ServiceError::from(RecommendError::NoSubscriptions { student_id: 1 }).status_code(),
            404
        );
        assert_eq!(
            ServiceError::from(RecommendError::Catalog(CatalogError::ValidationError(
                "down".to_string()
            )))
            .status_code(),
            500
        );
        assert_eq!(ServiceError::Timeout { timeout_ms: 10 }.status_code(), 504);
        assert_eq!(ServiceError::not_found("Lesson", 3).status_code(), 404);
    }

    #[test]
    fn test_messages() {
        assert_eq!(ServiceError::not_found("Course", 9).to_string(), "Course not found.");
        assert_eq!(
            ServiceError::from(AccessError::CourseNotFound { course_id: 9 }).to_string(),
            "Course not found."
        );
        assert!(ServiceError::not_found("Course", 9).is_client_error());
        assert!(!ServiceError::Internal("boom".to_string()).is_client_error());
    }
}
