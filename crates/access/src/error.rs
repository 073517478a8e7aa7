//! Error types for access checks.

use catalog::CourseId;
use thiserror::Error;

/// Why a policy refused a request
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AccessError {
    /// No authenticated user behind the request
    #[error("Authentication credentials were not provided.")]
    Unauthenticated,

    /// Authenticated, but not allowed
    #[error("{message}")]
    Forbidden { policy: String, message: String },

    /// The course the request targets does not exist
    #[error("Course not found.")]
    CourseNotFound { course_id: CourseId },
}

impl AccessError {
    pub(crate) fn forbidden(policy: &str, message: impl Into<String>) -> Self {
        AccessError::Forbidden {
            policy: policy.to_string(),
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, AccessError>;
