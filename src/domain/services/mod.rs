//! Domain services.

pub mod authorization;

pub use authorization::AuthorizationGuard;
