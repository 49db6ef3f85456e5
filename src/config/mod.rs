//! # Configuration Module
//!
//! Configuration loading and management. Settings come from:
//! - Environment variables (prefixed with APP__)
//! - Configuration files (config/default.toml, config/{environment}.toml)
//! - .env files (via dotenvy)

mod settings;

pub use settings::*;
