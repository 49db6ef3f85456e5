//! User entity and repository trait.
//!
//! Maps to the `users` table in the database schema.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::entities::Guild;
use crate::domain::value_objects::GuildRole;
use crate::shared::error::AppError;

/// Represents a user account.
///
/// Accounts are created by the external account system; this core never
/// deletes them. `current_guild_id` is the single membership record: a user
/// is in exactly one guild at a time, and the pointer is never null because
/// every user owns an undeletable solo guild they fall back to.
///
/// Maps to the `users` table:
/// - id: BIGINT PRIMARY KEY (Snowflake ID)
/// - username: VARCHAR(32) NOT NULL UNIQUE
/// - current_guild_id: BIGINT NOT NULL REFERENCES guilds(id) DEFERRABLE
/// - solo_guild_id: BIGINT NOT NULL REFERENCES guilds(id) DEFERRABLE
/// - created_at: TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// - updated_at: TIMESTAMPTZ NOT NULL DEFAULT NOW()
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Snowflake ID (primary key)
    pub id: i64,

    /// Username (2-32 characters, unique)
    pub username: String,

    /// The guild the user is currently a member of
    pub current_guild_id: i64,

    /// The user's personal solo guild (fallback home, immutable)
    pub solo_guild_id: i64,

    /// Account creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Whether the user is currently a member of the given guild.
    pub fn is_member_of(&self, guild_id: i64) -> bool {
        self.current_guild_id == guild_id
    }

    /// The user's role within a guild. Derived, never stored.
    pub fn role_in(&self, guild: &Guild) -> GuildRole {
        if guild.creator_id == self.id {
            GuildRole::Creator
        } else {
            GuildRole::Member
        }
    }
}

/// Repository trait for User data access operations.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Find a user by their Snowflake ID.
    async fn find_by_id(&self, id: i64) -> Result<Option<User>, AppError>;

    /// Find a user by username.
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, AppError>;

    /// Provision a new user together with their solo guild.
    ///
    /// The two inserts are one transaction; the circular reference between
    /// the user's membership pointer and the guild's creator is resolved by
    /// deferred constraints. Fails with Conflict if the username is taken.
    async fn provision(&self, user: &User, solo_guild: &Guild) -> Result<User, AppError>;
}
