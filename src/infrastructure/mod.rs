//! Infrastructure layer: database and repository implementations.

pub mod database;
pub mod repositories;
