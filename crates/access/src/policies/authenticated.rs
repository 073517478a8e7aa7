//! Rejects anonymous callers.

use crate::actor::Actor;
use crate::error::{AccessError, Result};
use crate::traits::{AccessRequest, Policy};
use catalog::CatalogIndex;

/// Requires an authenticated, active user.
pub struct Authenticated;

impl Policy for Authenticated {
    fn name(&self) -> &str {
        "Authenticated"
    }

    fn check(&self, actor: &Actor, _: &AccessRequest, _: &CatalogIndex) -> Result<()> {
        if actor.is_authenticated() {
            Ok(())
        } else {
            Err(AccessError::Unauthenticated)
        }
    }
}
