//! Domain layer: entities, value objects, repository traits, and the
//! stateless authorization predicates.

pub mod entities;
pub mod services;
pub mod value_objects;

pub use entities::{
    Guild, GuildRepository, InviteCode, InviteRepository, RedeemedInvite, User, UserRepository,
};
pub use services::AuthorizationGuard;
pub use value_objects::{BillingTier, GuildRole};
