//! The PolicyChain runs several policies in order.
//!
//! A request passes only if every policy passes; the first refusal is
//! returned as-is. Passing yields a `Grant`, which service operations take
//! as proof the check happened.

use crate::actor::Actor;
use crate::error::Result;
use crate::traits::{AccessRequest, Policy};
use catalog::{CatalogIndex, UserId};
use tracing::{debug, trace};

/// Proof that an actor passed a policy chain for one request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Grant {
    actor: Actor,
    request: AccessRequest,
}

impl Grant {
    pub fn actor(&self) -> &Actor {
        &self.actor
    }

    pub fn request(&self) -> &AccessRequest {
        &self.request
    }

    /// The authenticated user, when the chain required one
    pub fn user_id(&self) -> Option<UserId> {
        self.actor.user_id()
    }
}

/// Chains multiple policies together.
///
/// ## Usage
/// ```ignore
/// let chain = PolicyChain::new()
///     .add_policy(Authenticated)
///     .add_policy(StudentOnly::new("Only students can access lessons."))
///     .add_policy(SubscribedToCourse);
///
/// let grant = chain.authorize(&actor, &AccessRequest::read().on_course(id), &catalog)?;
/// ```
pub struct PolicyChain {
    policies: Vec<Box<dyn Policy>>,
}

impl PolicyChain {
    /// Create an empty chain; it grants everything
    pub fn new() -> Self {
        Self {
            policies: Vec::new(),
        }
    }

    /// Add a policy to the chain (builder pattern).
    pub fn add_policy(mut self, policy: impl Policy + 'static) -> Self {
        self.policies.push(Box::new(policy));
        self
    }

    pub fn len(&self) -> usize {
        self.policies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.policies.is_empty()
    }

    /// Run every policy in order; stop at the first refusal.
    pub fn authorize(
        &self,
        actor: &Actor,
        request: &AccessRequest,
        catalog: &CatalogIndex,
    ) -> Result<Grant> {
        for policy in &self.policies {
            if let Err(e) = policy.check(actor, request, catalog) {
                debug!("Policy {} refused {}: {}", policy.name(), actor, e);
                return Err(e);
            }
        }
        trace!("Granted {:?} to {}", request.operation, actor);
        Ok(Grant {
            actor: *actor,
            request: *request,
        })
    }
}

impl Default for PolicyChain {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for PolicyChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.policies.iter().map(|p| p.name()))
            .finish()
    }
}
