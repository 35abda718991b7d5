//! # SiteProbe Config
//!
//! Configuration management for the SiteProbe coordinator, popup and page
//! analyzer.

mod error;
mod loader;
mod schema;
mod validator;

pub use error::ConfigError;
pub use loader::ConfigLoader;
pub use schema::*;
pub use validator::{ConfigValidator, ValidationError, ValidationResult, ValidationWarning};
