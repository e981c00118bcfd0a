//! API constants
//!
//! The API is versioned under a fixed prefix; handlers and tests build paths
//! from it so a version bump is a one-line change.

/// API base path prefix
pub const API_PREFIX: &str = "/api/v1";
