//! Inkpot Core Library
//!
//! This crate provides core domain models, error types, configuration, and
//! policy (plans, quotas, role capabilities) shared across all Inkpot
//! components.

pub mod config;
pub mod error;
pub mod models;
pub mod quota;
pub mod roles;

// Re-export commonly used types
pub use config::Config;
pub use error::{AppError, ErrorMetadata, LogLevel};
pub use quota::Plan;
pub use roles::{Capabilities, Role};
