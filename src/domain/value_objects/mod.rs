//! Domain value objects.

pub mod billing;
pub mod role;

pub use billing::BillingTier;
pub use role::GuildRole;
