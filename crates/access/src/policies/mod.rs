//! Policy implementations for the access chain.
//!
//! This module contains the concrete policies that can be composed into a
//! PolicyChain.

pub mod authenticated;
pub mod course_owner;
pub mod educator_or_read_only;
pub mod student_only;
pub mod subscribed;

// Re-export for convenience
pub use authenticated::Authenticated;
pub use course_owner::CourseOwner;
pub use educator_or_read_only::EducatorOrReadOnly;
pub use student_only::StudentOnly;
pub use subscribed::SubscribedToCourse;
