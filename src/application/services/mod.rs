//! Application services: the membership core and its facade.

pub mod guild_service;
pub mod invite_engine;
pub mod lifecycle_service;
pub mod membership_service;

pub use guild_service::GuildService;
pub use invite_engine::InviteCodeEngine;
pub use lifecycle_service::GuildLifecycleManager;
pub use membership_service::{MembershipManager, MAX_CONFLICT_RETRIES};
