//! Error types for the catalog crate.
//!
//! Every mutation of the catalog validates its input first and reports the
//! first violation it finds through one of these variants.

use thiserror::Error;

/// Errors that can occur while loading, validating or mutating the catalog
#[derive(Error, Debug)]
pub enum CatalogError {
    /// Seed file could not be found or opened
    #[error("Failed to open file: {path}")]
    FileNotFound { path: String },

    /// I/O error occurred while reading a seed file
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Seed file is not valid JSON for the expected layout
    #[error("Parse error at line {line} in {file}: {reason}")]
    ParseError {
        file: String,
        line: usize,
        reason: String,
    },

    /// A field had an invalid value (empty title, malformed email, ...)
    #[error("Invalid value for {field}: {value}")]
    InvalidValue { field: String, value: String },

    /// Referenced entity doesn't exist (e.g., a lesson for a missing course)
    #[error("Missing reference: {entity} with id {id}")]
    MissingReference { entity: String, id: u32 },

    /// Seed data referenced an entity by name that doesn't exist
    #[error("Unknown {entity}: {name}")]
    UnknownName { entity: String, name: String },

    /// Email is already registered
    #[error("A user with email {email} already exists")]
    DuplicateEmail { email: String },

    /// Tag names are unique
    #[error("A tag named {name} already exists")]
    DuplicateTag { name: String },

    /// At most one subscription per (student, course) pair
    #[error("Student {student_id} is already subscribed to course {course_id}")]
    AlreadySubscribed { student_id: u32, course_id: u32 },

    /// Data validation failed
    #[error("Validation failed: {0}")]
    ValidationError(String),
}

impl CatalogError {
    /// Shorthand for the common "field had a bad value" case
    pub(crate) fn invalid(field: &str, value: impl Into<String>) -> Self {
        CatalogError::InvalidValue {
            field: field.to_string(),
            value: value.into(),
        }
    }

    /// Shorthand for a dangling id reference
    pub(crate) fn missing(entity: &str, id: u32) -> Self {
        CatalogError::MissingReference {
            entity: entity.to_string(),
            id,
        }
    }
}

/// Convenience type alias for Results in this crate
pub type Result<T> = std::result::Result<T, CatalogError>;
