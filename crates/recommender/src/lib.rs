//! # Recommender Crate
//!
//! Suggests additional courses to a student based on what they already
//! subscribe to.
//!
//! ## Components
//!
//! ### Category Match Source
//! "Courses in the same category that share the most tags with yours":
//! - Every subscribed course contributes its top 4 same-category matches
//! - Score is the number of shared tag names
//! - Matches from several subscriptions are deduplicated
//!
//! ### Backfill Source
//! Tops up short lists with unrelated courses from the whole catalog,
//! in ascending id order or a seeded shuffle.
//!
//! ## Example Usage
//!
//! ```ignore
//! use catalog::CatalogIndex;
//! use recommender::{Recommender, RecommenderConfig};
//! use std::path::Path;
//!
//! let index = CatalogIndex::load_from_file(Path::new("data/catalog.json"))?;
//! let engine = Recommender::new(RecommenderConfig::default())?;
//!
//! for candidate in engine.recommend(&index, student_id)? {
//!     println!("{} (score {})", candidate.course_id, candidate.score);
//! }
//! ```
//!
//! ## Ordering
//!
//! Results are reproducible: ties between equal scores are broken by
//! ascending course id, seeds are processed in ascending course id, and
//! backfill never draws from an unseeded generator.

// Public modules
pub mod backfill;
pub mod category_match;
pub mod engine;
pub mod error;
pub mod lookup;
pub mod student_context;
pub mod types;

// Re-export commonly used types
pub use backfill::BackfillSource;
pub use category_match::CategoryMatchSource;
pub use engine::Recommender;
pub use error::{RecommendError, Result};
pub use lookup::CatalogLookup;
pub use types::{
    BackfillOrder, Candidate, CandidateMetadata, CandidateSource, CourseRecord,
    RecommenderConfig, StudentContext,
};
