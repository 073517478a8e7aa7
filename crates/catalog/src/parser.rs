//! Parser for catalog seed files.
//!
//! A seed file is a single JSON document:
//!
//! ```json
//! {
//!   "tags": ["Python", "Backend"],
//!   "users": [{ "email": "ada@example.com", "role": "educator", "full_name": "Ada" }],
//!   "courses": [{ "title": "Learn Python", "category": "programming", "tags": ["Python"] }],
//!   "lessons": [{ "course": "Learn Python", "title": "Setup", "content": "...", "lesson_number": 1 }],
//!   "subscriptions": [{ "student": "sam@example.com", "course": "Learn Python" }]
//! }
//! ```
//!
//! Every section is optional. Rows reference each other by name (tag name,
//! user email, course title) rather than by id, since ids are assigned on load.

use crate::error::{CatalogError, Result};
use crate::types::NewUser;
use serde::Deserialize;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

/// The whole seed document
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SeedFile {
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub users: Vec<NewUser>,
    #[serde(default)]
    pub courses: Vec<SeedCourse>,
    #[serde(default)]
    pub lessons: Vec<SeedLesson>,
    #[serde(default)]
    pub subscriptions: Vec<SeedSubscription>,
}

#[derive(Debug, Deserialize)]
pub struct SeedCourse {
    pub title: String,
    pub category: String,
    /// Defaults to a sentence derived from the title
    #[serde(default)]
    pub description: Option<String>,
    /// Tag names; undeclared tags are created on load
    #[serde(default)]
    pub tags: Vec<String>,
    /// Email of the creating educator
    #[serde(default)]
    pub created_by: Option<String>,
    #[serde(default)]
    pub course_image: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SeedLesson {
    /// Course title
    pub course: String,
    pub title: String,
    #[serde(default)]
    pub content: String,
    pub lesson_number: u32,
}

#[derive(Debug, Deserialize)]
pub struct SeedSubscription {
    /// Student email
    pub student: String,
    /// Course title
    pub course: String,
}

/// Read and parse a seed file from disk
pub fn parse_seed_file(path: &Path) -> Result<SeedFile> {
    let content = fs::read_to_string(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => CatalogError::FileNotFound {
            path: path.display().to_string(),
        },
        _ => CatalogError::IoError(e),
    })?;

    let file_label = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    parse_seed_str(&content, &file_label)
}

/// Parse seed JSON held in memory. `file_label` only feeds error messages.
pub fn parse_seed_str(content: &str, file_label: &str) -> Result<SeedFile> {
    serde_json::from_str(content).map_err(|e| CatalogError::ParseError {
        file: file_label.to_string(),
        line: e.line(),
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Role;

    #[test]
    fn test_parse_minimal_seed() {
        let seed = parse_seed_str("{}", "seed.json").unwrap();
        assert!(seed.tags.is_empty());
        assert!(seed.courses.is_empty());
    }

    #[test]
    fn test_parse_full_seed() {
        let content = r#"{
            "tags": ["Python"],
            "users": [{ "email": "e@example.com", "role": "educator", "full_name": "Ed" }],
            "courses": [{ "title": "Learn Python", "category": "programming", "tags": ["Python", "Backend"] }],
            "lessons": [{ "course": "Learn Python", "title": "Setup", "lesson_number": 1 }],
            "subscriptions": []
        }"#;

        let seed = parse_seed_str(content, "seed.json").unwrap();
        assert_eq!(seed.users[0].role, Role::Educator);
        assert_eq!(seed.courses[0].tags, vec!["Python", "Backend"]);
        assert!(seed.courses[0].description.is_none());
        assert_eq!(seed.lessons[0].content, "");
    }

    #[test]
    fn test_parse_error_reports_line() {
        let content = "{\n  \"tags\": [\n    \"Python\",\n  ]\n}";
        match parse_seed_str(content, "broken.json") {
            Err(CatalogError::ParseError { file, line, .. }) => {
                assert_eq!(file, "broken.json");
                assert_eq!(line, 4);
            }
            other => panic!("expected parse error, got {:?}", other),
        }
    }

    #[test]
    fn test_unknown_role_rejected() {
        let content = r#"{ "users": [{ "email": "a@example.com", "role": "admin", "full_name": "A" }] }"#;
        assert!(parse_seed_str(content, "seed.json").is_err());
    }
}
