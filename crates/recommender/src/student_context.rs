//! Helper to build a StudentContext from a catalog lookup.
//!
//! The context is gathered once per request so the sources don't repeat the
//! subscription query.

use crate::error::{RecommendError, Result};
use crate::lookup::CatalogLookup;
use crate::types::StudentContext;
use catalog::UserId;
use tracing::debug;

/// Build a StudentContext for a given student
///
/// Fails with `NoSubscriptions` when the student has no subscribed courses:
/// every recommendation needs at least one seed course.
pub fn build_student_context<L>(lookup: &L, student_id: UserId) -> Result<StudentContext>
where
    L: CatalogLookup + ?Sized,
{
    let subscribed = lookup.subscribed_courses(student_id)?;
    if subscribed.is_empty() {
        return Err(RecommendError::NoSubscriptions { student_id });
    }

    let context = StudentContext::new(student_id, subscribed);
    debug!(
        "Student {} has {} subscribed courses",
        student_id,
        context.subscribed.len()
    );
    Ok(context)
}
