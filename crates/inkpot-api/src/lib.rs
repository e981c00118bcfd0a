//! Inkpot API Library
//!
//! This crate provides the HTTP API handlers, middleware, and application setup.

// Module declarations
pub mod constants;
mod handlers;
mod middleware;
pub mod services;
pub mod setup;
mod utils;

// Public modules
pub mod auth;
pub mod error;
pub mod state;

// Re-exports
pub use error::ErrorResponse;
