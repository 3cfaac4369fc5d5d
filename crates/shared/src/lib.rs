//! Shared library for the catalog workspace.
//!
//! This crate provides common functionality used by the catalog server:
//! - Configuration management
//! - Logging infrastructure
//! - Normalized record models

pub mod config;
pub mod logging;
pub mod models;

// Re-export commonly used types
pub use config::Config;
pub use logging::LogConfig;
pub use models::*;
