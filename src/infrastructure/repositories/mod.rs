//! PostgreSQL repository implementations.

pub mod guild_repository;
pub mod invite_repository;
pub mod user_repository;

pub use guild_repository::PgGuildRepository;
pub use invite_repository::PgInviteRepository;
pub use user_repository::PgUserRepository;
