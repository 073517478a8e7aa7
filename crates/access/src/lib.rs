//! Access control for EduLearn operations.
//!
//! This crate provides:
//! - `Actor`: who is calling (anonymous or an authenticated user)
//! - `Policy` trait and implementations for role and ownership checks
//! - `PolicyChain` for composing policies into a `Grant`
//!
//! ## Architecture
//! Every service operation builds an `AccessRequest` (read or write, maybe
//! targeting a course) and runs it through its chain. Policies are checked
//! in order and the first refusal is returned:
//! 1. `Authenticated` turns away anonymous callers (401)
//! 2. Role policies (`EducatorOrReadOnly`, `StudentOnly`) refuse with 403
//! 3. Catalog-aware policies (`SubscribedToCourse`, `CourseOwner`) may also
//!    report a missing course (404)
//!
//! ## Example Usage
//! ```ignore
//! use access::policies::*;
//! use access::{AccessRequest, PolicyChain};
//!
//! let chain = PolicyChain::new()
//!     .add_policy(Authenticated)
//!     .add_policy(StudentOnly::new("Only students can access lessons."))
//!     .add_policy(SubscribedToCourse);
//!
//! let grant = chain.authorize(&actor, &AccessRequest::read().on_course(course_id), &catalog)?;
//! ```

pub mod actor;
pub mod error;
pub mod policies;
pub mod policy_chain;
pub mod traits;

// Re-export main types
pub use actor::Actor;
pub use error::{AccessError, Result};
pub use policy_chain::{Grant, PolicyChain};
pub use traits::{AccessRequest, Operation, Policy};
