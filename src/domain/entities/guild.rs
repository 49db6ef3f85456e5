//! Guild entity and repository trait.
//!
//! Maps to the `guilds` table in the database schema.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::entities::User;
use crate::domain::value_objects::BillingTier;
use crate::shared::error::AppError;

/// Represents a guild: a tenant group with bounded membership.
///
/// `member_count` mirrors the number of users whose `current_guild_id`
/// points at this guild and is maintained transactionally alongside every
/// pointer move. Admission control is the conditional increment
/// `member_count < member_limit` executed under the guild's row lock.
///
/// Maps to the `guilds` table:
/// - id: BIGINT PRIMARY KEY (Snowflake ID)
/// - name: VARCHAR(100) NOT NULL
/// - creator_id: BIGINT NOT NULL REFERENCES users(id) DEFERRABLE
/// - billing_tier: VARCHAR(20) NOT NULL
/// - member_limit: INTEGER NOT NULL CHECK (member_limit > 0)
/// - member_count: INTEGER NOT NULL CHECK (member_count >= 0 AND member_count <= member_limit)
/// - is_solo: BOOLEAN NOT NULL DEFAULT FALSE
/// - created_at: TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// - updated_at: TIMESTAMPTZ NOT NULL DEFAULT NOW()
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Guild {
    /// Snowflake ID (primary key)
    pub id: i64,

    /// Guild name (1-100 characters)
    pub name: String,

    /// User ID of the guild creator (immutable)
    pub creator_id: i64,

    /// Billing tier the member limit was derived from
    pub billing_tier: BillingTier,

    /// Maximum concurrent members admitted
    pub member_limit: i32,

    /// Current member count (derived, maintained transactionally)
    pub member_count: i32,

    /// True for the auto-provisioned personal guild (immutable)
    pub is_solo: bool,

    /// Guild creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

impl Guild {
    /// Check if a user is the creator of this guild.
    pub fn is_creator(&self, user_id: i64) -> bool {
        self.creator_id == user_id
    }

    /// Whether another member can still be admitted.
    pub fn has_capacity(&self) -> bool {
        self.member_count < self.member_limit
    }

    /// Whether this guild is `user`'s personal solo guild.
    pub fn is_solo_of(&self, user_id: i64) -> bool {
        self.is_solo && self.creator_id == user_id
    }

    /// Build a new regular guild for `creator_id` with the limit taken from
    /// the billing tier. The creator is the sole member.
    pub fn new(id: i64, name: String, creator_id: i64, tier: BillingTier) -> Self {
        let now = Utc::now();
        Self {
            id,
            name,
            creator_id,
            billing_tier: tier,
            member_limit: tier.member_limit(),
            member_count: 1,
            is_solo: false,
            created_at: now,
            updated_at: now,
        }
    }

    /// Build the auto-provisioned solo guild for a user. Capacity is pinned
    /// to one so admission control keeps everyone else out.
    pub fn new_solo(id: i64, owner_id: i64, owner_name: &str) -> Self {
        let now = Utc::now();
        Self {
            id,
            name: format!("{}'s guild", owner_name),
            creator_id: owner_id,
            billing_tier: BillingTier::Free,
            member_limit: 1,
            member_count: 1,
            is_solo: true,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Repository trait for Guild data access operations.
///
/// The compound operations are the atomic units the membership invariants
/// rest on: each runs as one transaction with conditional, row-locked
/// counter updates. Implementations must guarantee that `member_count`
/// never exceeds `member_limit` and never goes negative.
#[async_trait]
pub trait GuildRepository: Send + Sync {
    /// Find a guild by its Snowflake ID.
    async fn find_by_id(&self, id: i64) -> Result<Option<Guild>, AppError>;

    /// Find all guilds created by a user (includes their solo guild).
    async fn find_by_creator(&self, creator_id: i64) -> Result<Vec<Guild>, AppError>;

    /// List the current members of a guild.
    async fn members(&self, guild_id: i64) -> Result<Vec<User>, AppError>;

    /// Create a guild with its creator as sole member.
    ///
    /// One transaction: insert the guild with member_count 1, repoint the
    /// creator's membership, decrement their previous guild's count.
    async fn create_with_creator(&self, guild: &Guild) -> Result<Guild, AppError>;

    /// Atomically move a user into `target_guild_id`.
    ///
    /// One transaction under the user's row lock: conditional admission
    /// increment on the target (fails with LimitExceeded when full), pointer
    /// reassignment, decrement of the previous guild. Fails with
    /// AlreadyMember if the user is already in the target guild and with
    /// NotFound if user or guild is absent.
    async fn move_member(&self, user_id: i64, target_guild_id: i64) -> Result<(), AppError>;

    /// Delete a guild, evicting every remaining member to their solo guild
    /// and purging the guild's invite codes, all in one transaction.
    async fn delete_with_evictions(&self, guild_id: i64) -> Result<(), AppError>;
}
