//! Who is making a request.

use catalog::{Role, User, UserId};
use serde::Serialize;
use std::fmt;

/// The caller of an operation, resolved once per request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Actor {
    Anonymous,
    Authenticated {
        user_id: UserId,
        role: Role,
        is_staff: bool,
    },
}

impl Actor {
    /// Actor for a known user; deactivated accounts act as anonymous
    pub fn from_user(user: &User) -> Self {
        if !user.is_active {
            return Actor::Anonymous;
        }
        Actor::Authenticated {
            user_id: user.id,
            role: user.role,
            is_staff: user.is_staff,
        }
    }

    pub fn user_id(&self) -> Option<UserId> {
        match self {
            Actor::Anonymous => None,
            Actor::Authenticated { user_id, .. } => Some(*user_id),
        }
    }

    pub fn role(&self) -> Option<Role> {
        match self {
            Actor::Anonymous => None,
            Actor::Authenticated { role, .. } => Some(*role),
        }
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, Actor::Authenticated { .. })
    }

    pub fn is_student(&self) -> bool {
        self.role() == Some(Role::Student)
    }

    pub fn is_educator(&self) -> bool {
        self.role() == Some(Role::Educator)
    }

    pub fn is_staff(&self) -> bool {
        matches!(self, Actor::Authenticated { is_staff: true, .. })
    }
}

impl fmt::Display for Actor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Actor::Anonymous => write!(f, "anonymous"),
            Actor::Authenticated { user_id, role, .. } => write!(f, "{role} #{user_id}"),
        }
    }
}
