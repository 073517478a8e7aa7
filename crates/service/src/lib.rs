//! Service crate for the EduLearn backend.
//!
//! This crate wires the catalog, access policies and recommendation engine
//! into async operations, and carries the ambient pieces the binaries share:
//! TOML configuration, logger setup and HTTP-style error statuses.

pub mod config;
pub mod dto;
pub mod error;
pub mod logging;
pub mod service;

pub use config::{ConfigError, ServiceConfig};
pub use dto::{CourseView, RecommendedCourse, RegisterRequest, SubscribeResponse, UserView};
pub use error::{Result, ServiceError};
pub use logging::init_logger;
pub use service::EduLearnService;
