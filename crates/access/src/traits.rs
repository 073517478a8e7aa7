//! Core traits for access checks.
//!
//! This module defines the Policy trait that lets composable checks be
//! chained in front of every service operation.

use crate::actor::Actor;
use crate::error::Result;
use catalog::{CatalogIndex, CourseId};

/// Read or write, the only distinction the policies draw
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Read,
    Write,
}

/// What the actor is trying to do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccessRequest {
    pub operation: Operation,
    /// Course the request targets, if any
    pub course_id: Option<CourseId>,
}

impl AccessRequest {
    pub fn read() -> Self {
        Self {
            operation: Operation::Read,
            course_id: None,
        }
    }

    pub fn write() -> Self {
        Self {
            operation: Operation::Write,
            course_id: None,
        }
    }

    pub fn on_course(mut self, course_id: CourseId) -> Self {
        self.course_id = Some(course_id);
        self
    }

    pub fn is_write(&self) -> bool {
        self.operation == Operation::Write
    }
}

/// Core trait for access policies.
///
/// ## Design Note
/// - `Send + Sync` so one chain can be shared across concurrent requests
/// - Policies read the catalog but never change it
pub trait Policy: Send + Sync {
    /// Returns the name of this policy (for logging/debugging)
    fn name(&self) -> &str;

    /// `Ok(())` lets the request through to the next policy
    fn check(&self, actor: &Actor, request: &AccessRequest, catalog: &CatalogIndex) -> Result<()>;
}
