//! Course content is visible to subscribers only.

use crate::actor::Actor;
use crate::error::{AccessError, Result};
use crate::traits::{AccessRequest, Policy};
use catalog::CatalogIndex;

/// The targeted course must exist (404 otherwise) and the actor must be
/// subscribed to it (403 otherwise).
pub struct SubscribedToCourse;

impl Policy for SubscribedToCourse {
    fn name(&self) -> &str {
        "SubscribedToCourse"
    }

    fn check(&self, actor: &Actor, request: &AccessRequest, catalog: &CatalogIndex) -> Result<()> {
        let Some(course_id) = request.course_id else {
            return Err(AccessError::forbidden(self.name(), "No course specified."));
        };
        if catalog.get_course(course_id).is_none() {
            return Err(AccessError::CourseNotFound { course_id });
        }
        match actor.user_id() {
            Some(user_id) if catalog.is_subscribed(user_id, course_id) => Ok(()),
            _ => Err(AccessError::forbidden(
                self.name(),
                "You are not subscribed to this course.",
            )),
        }
    }
}
