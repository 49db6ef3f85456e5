//! Shared utilities: error types and snowflake ID generation.

pub mod error;
pub mod snowflake;

pub use error::AppError;
pub use snowflake::SnowflakeGenerator;
