//! # Catalog Crate
//!
//! This crate owns the EduLearn data: users with their role profiles, tags,
//! courses, lessons and subscriptions, held in an in-memory `CatalogIndex`.
//!
//! ## Main Components
//!
//! - **types**: Domain types and the read-only side of `CatalogIndex`
//! - **parser**: Parse JSON seed files into `SeedFile`
//! - **index**: Mutations, bulk loading and integrity validation
//! - **error**: Error types for the catalog
//!
//! ## Example Usage
//!
//! ```ignore
//! use catalog::CatalogIndex;
//! use std::path::Path;
//!
//! let index = CatalogIndex::load_from_file(Path::new("data/catalog.json"))?;
//!
//! let course = index.get_course(1).unwrap();
//! let peers: Vec<_> = index.courses_in_category(&course.category).collect();
//! println!("{} shares its category with {} courses", course.title, peers.len() - 1);
//! ```

// Public modules
pub mod error;
pub mod index;
pub mod parser;
pub mod types;

// Re-export commonly used types for convenience
pub use error::{CatalogError, Result};
pub use parser::{SeedCourse, SeedFile, SeedLesson, SeedSubscription};
pub use types::{
    // Type aliases
    CourseId,
    LessonId,
    SubscriptionId,
    TagId,
    UserId,
    // Core types
    CatalogCounts,
    CatalogIndex,
    Course,
    EducatorProfile,
    Lesson,
    StudentProfile,
    Subscription,
    Tag,
    User,
    // Inputs
    CourseUpdate,
    LessonUpdate,
    NewCourse,
    NewLesson,
    NewUser,
    // Enums
    Role,
    // Helpers
    normalize_email,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_creation() {
        let index = CatalogIndex::new();
        assert_eq!(index.counts(), CatalogCounts::default());
    }

    #[test]
    fn test_empty_queries() {
        let index = CatalogIndex::new();

        // Querying non-existent data should return None or empty collections
        assert!(index.get_user(999).is_none());
        assert!(index.get_course(999).is_none());
        assert!(index.get_tag_by_name("Python").is_none());
        assert!(index.course_lessons(999).is_empty());
        assert!(index.student_subscriptions(999).is_empty());
        assert!(index.course_tag_names(999).is_empty());
        assert_eq!(index.courses_in_category("programming").count(), 0);
    }

    #[test]
    fn test_course_tag_names() {
        let mut index = CatalogIndex::new();
        let python = index.create_tag("Python").unwrap();
        let backend = index.create_tag("Backend").unwrap();
        let id = index
            .create_course(
                NewCourse {
                    title: "Learn Python Programming".to_string(),
                    description: String::new(),
                    category: "programming".to_string(),
                    tags: vec![python, backend],
                    course_image: None,
                },
                None,
            )
            .unwrap();

        let names: Vec<String> = index.course_tag_names(id).into_iter().collect();
        assert_eq!(names, vec!["Backend".to_string(), "Python".to_string()]);
    }
}
