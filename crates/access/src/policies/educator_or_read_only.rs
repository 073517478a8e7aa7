//! Educators may write; everyone may read.

use crate::actor::Actor;
use crate::error::{AccessError, Result};
use crate::traits::{AccessRequest, Policy};
use catalog::CatalogIndex;

/// Reads pass for anyone, anonymous included. Writes need an authenticated
/// educator.
pub struct EducatorOrReadOnly;

impl Policy for EducatorOrReadOnly {
    fn name(&self) -> &str {
        "EducatorOrReadOnly"
    }

    fn check(&self, actor: &Actor, request: &AccessRequest, _: &CatalogIndex) -> Result<()> {
        if !request.is_write() {
            return Ok(());
        }
        match actor {
            Actor::Anonymous => Err(AccessError::Unauthenticated),
            _ if actor.is_educator() => Ok(()),
            _ => Err(AccessError::forbidden(
                self.name(),
                "You do not have permission to perform this action.",
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use catalog::Role;

    fn actor(role: Role) -> Actor {
        Actor::Authenticated {
            user_id: 1,
            role,
            is_staff: false,
        }
    }

    #[test]
    fn test_reads_always_pass() {
        let catalog = CatalogIndex::new();
        let read = AccessRequest::read().on_course(1);
        for a in [Actor::Anonymous, actor(Role::Student), actor(Role::Educator)] {
            assert!(EducatorOrReadOnly.check(&a, &read, &catalog).is_ok());
        }
    }

    #[test]
    fn test_writes_need_educator() {
        let catalog = CatalogIndex::new();
        let write = AccessRequest::write();

        assert!(EducatorOrReadOnly.check(&actor(Role::Educator), &write, &catalog).is_ok());
        assert!(matches!(
            EducatorOrReadOnly.check(&actor(Role::Student), &write, &catalog),
            Err(AccessError::Forbidden { .. })
        ));
        assert_eq!(
            EducatorOrReadOnly.check(&Actor::Anonymous, &write, &catalog),
            Err(AccessError::Unauthenticated)
        );
    }
}
