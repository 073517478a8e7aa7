//! Only a course's creator (or staff) may change it.

use crate::actor::Actor;
use crate::error::{AccessError, Result};
use crate::traits::{AccessRequest, Policy};
use catalog::CatalogIndex;

/// Guards writes to an existing course and its lessons. Reads and writes
/// that target no existing course (creation) pass through. Courses without
/// a recorded creator can only be changed by staff.
pub struct CourseOwner;

impl Policy for CourseOwner {
    fn name(&self) -> &str {
        "CourseOwner"
    }

    fn check(&self, actor: &Actor, request: &AccessRequest, catalog: &CatalogIndex) -> Result<()> {
        if !request.is_write() {
            return Ok(());
        }
        let Some(course_id) = request.course_id else {
            return Ok(());
        };
        let course = catalog
            .get_course(course_id)
            .ok_or(AccessError::CourseNotFound { course_id })?;

        if actor.is_staff() {
            return Ok(());
        }
        match (course.created_by, actor.user_id()) {
            (Some(owner), Some(user_id)) if owner == user_id => Ok(()),
            _ => Err(AccessError::forbidden(
                self.name(),
                "Only the course creator can modify this course.",
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use catalog::{NewCourse, NewUser, Role, UserId};

    fn educator(catalog: &mut CatalogIndex, email: &str, is_staff: bool) -> Actor {
        let id = catalog
            .register_user(NewUser {
                email: email.to_string(),
                role: Role::Educator,
                full_name: "Educator".to_string(),
                profile_image: None,
                bio: None,
                specialization: None,
                is_staff,
            })
            .unwrap();
        Actor::from_user(catalog.get_user(id).unwrap())
    }

    fn course(catalog: &mut CatalogIndex, created_by: Option<UserId>) -> u32 {
        catalog
            .create_course(
                NewCourse {
                    title: "Owned".to_string(),
                    category: "programming".to_string(),
                    ..NewCourse::default()
                },
                created_by,
            )
            .unwrap()
    }

    #[test]
    fn test_owner_and_staff_may_write() {
        let mut catalog = CatalogIndex::new();
        let grace = educator(&mut catalog, "grace@example.com", false);
        let alan = educator(&mut catalog, "alan@example.com", false);
        let admin = educator(&mut catalog, "admin@example.com", true);
        let id = course(&mut catalog, grace.user_id());
        let write = AccessRequest::write().on_course(id);

        assert!(CourseOwner.check(&grace, &write, &catalog).is_ok());
        assert!(CourseOwner.check(&admin, &write, &catalog).is_ok());
        assert!(matches!(
            CourseOwner.check(&alan, &write, &catalog),
            Err(AccessError::Forbidden { .. })
        ));
        assert!(CourseOwner
            .check(&alan, &AccessRequest::read().on_course(id), &catalog)
            .is_ok());
    }

    #[test]
    fn test_creation_and_missing_course() {
        let mut catalog = CatalogIndex::new();
        let grace = educator(&mut catalog, "grace@example.com", false);

        assert!(CourseOwner.check(&grace, &AccessRequest::write(), &catalog).is_ok());
        assert_eq!(
            CourseOwner.check(&grace, &AccessRequest::write().on_course(7), &catalog),
            Err(AccessError::CourseNotFound { course_id: 7 })
        );
    }

    #[test]
    fn test_orphan_course_needs_staff() {
        let mut catalog = CatalogIndex::new();
        let grace = educator(&mut catalog, "grace@example.com", false);
        let id = course(&mut catalog, None);
        assert!(CourseOwner
            .check(&grace, &AccessRequest::write().on_course(id), &catalog)
            .is_err());
    }
}
