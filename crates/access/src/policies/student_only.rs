//! Student-only operations.

use crate::actor::Actor;
use crate::error::{AccessError, Result};
use crate::traits::{AccessRequest, Policy};
use catalog::CatalogIndex;

/// Refuses anyone without a student profile, with an operation-specific
/// message ("Only students can subscribe to courses.", ...).
pub struct StudentOnly {
    message: String,
}

impl StudentOnly {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl Default for StudentOnly {
    fn default() -> Self {
        Self::new("Only students can access this.")
    }
}

impl Policy for StudentOnly {
    fn name(&self) -> &str {
        "StudentOnly"
    }

    fn check(&self, actor: &Actor, _: &AccessRequest, _: &CatalogIndex) -> Result<()> {
        if actor.is_student() {
            Ok(())
        } else {
            Err(AccessError::forbidden(self.name(), self.message.clone()))
        }
    }
}
