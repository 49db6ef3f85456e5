//! Domain entities and their repository traits.

pub mod guild;
pub mod invite;
pub mod user;

pub use guild::{Guild, GuildRepository};
pub use invite::{InviteCode, InviteRepository, RedeemedInvite};
pub use user::{User, UserRepository};
