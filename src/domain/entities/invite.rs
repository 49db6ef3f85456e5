//! Invite code entity and repository trait.
//!
//! Maps to the `invite_codes` table in the database schema.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::shared::error::AppError;

/// Length of generated invite codes. Ten characters over a 62-symbol
/// alphabet give ~59.5 bits of entropy, keeping the collision probability
/// far below 2^-40 for any realistic code population.
pub const CODE_LEN: usize = 10;

/// Represents a bounded-use, time-limited invite code for a guild.
///
/// Maps to the `invite_codes` table:
/// - code: VARCHAR(16) PRIMARY KEY
/// - guild_id: BIGINT NOT NULL REFERENCES guilds(id) ON DELETE CASCADE
/// - created_by: BIGINT NOT NULL REFERENCES users(id)
/// - expires_at: TIMESTAMPTZ NULL (NULL = never expires)
/// - uses_left: INTEGER NULL (NULL = unlimited)
/// - created_at: TIMESTAMPTZ NOT NULL DEFAULT NOW()
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InviteCode {
    /// Opaque invite code (e.g. "aB3xQ91kzD"), primary key
    pub code: String,

    /// Guild this invite admits into
    pub guild_id: i64,

    /// User who issued the invite
    pub created_by: i64,

    /// Expiration timestamp (None = never expires)
    pub expires_at: Option<DateTime<Utc>>,

    /// Remaining uses (None = unlimited). Monotonically non-increasing;
    /// consumption is atomic with redemption.
    pub uses_left: Option<i32>,

    /// When the invite was created
    pub created_at: DateTime<Utc>,
}

impl InviteCode {
    /// Check if the invite has expired at `now`.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|expires_at| expires_at <= now)
    }

    /// Check if the invite has burned through all its uses.
    pub fn is_exhausted(&self) -> bool {
        self.uses_left.is_some_and(|left| left <= 0)
    }

    /// Check if the invite can still be redeemed at `now`.
    pub fn is_redeemable(&self, now: DateTime<Utc>) -> bool {
        !self.is_expired(now) && !self.is_exhausted()
    }

    /// Generate a cryptographically random invite code.
    pub fn generate_code() -> String {
        use rand::Rng;
        const CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

        let mut rng = rand::rng();
        (0..CODE_LEN)
            .map(|_| {
                let idx = rng.random_range(0..CHARSET.len());
                CHARSET[idx] as char
            })
            .collect()
    }

    /// Create a new invite for a guild. `ttl_secs` of None means the code
    /// never expires; `max_uses` of None means unlimited uses.
    pub fn new(
        guild_id: i64,
        created_by: i64,
        ttl_secs: Option<i64>,
        max_uses: Option<i32>,
    ) -> Self {
        let now = Utc::now();
        Self {
            code: Self::generate_code(),
            guild_id,
            created_by,
            expires_at: ttl_secs.map(|secs| now + chrono::Duration::seconds(secs)),
            uses_left: max_uses,
            created_at: now,
        }
    }
}

/// Outcome of a successful redemption.
#[derive(Debug, Clone)]
pub struct RedeemedInvite {
    /// Guild the user was admitted into
    pub guild_id: i64,

    /// Guild name, for the join response
    pub guild_name: String,

    /// Remaining uses after this redemption (None = unlimited)
    pub uses_left: Option<i32>,
}

/// Repository trait for invite code data access operations.
#[async_trait]
pub trait InviteRepository: Send + Sync {
    /// Find an invite by its code.
    async fn find_by_code(&self, code: &str) -> Result<Option<InviteCode>, AppError>;

    /// Find all invites for a guild.
    async fn find_by_guild(&self, guild_id: i64) -> Result<Vec<InviteCode>, AppError>;

    /// Check if an invite code exists.
    async fn code_exists(&self, code: &str) -> Result<bool, AppError>;

    /// Create a new invite.
    async fn create(&self, invite: &InviteCode) -> Result<InviteCode, AppError>;

    /// Redeem an invite for `user_id`: one serializable operation that
    /// validates the code, decrements `uses_left`, and moves the user into
    /// the guild under admission control. Two callers racing on the last
    /// use or the last free slot get exactly one winner; the loser receives
    /// Exhausted or LimitExceeded.
    ///
    /// Fails with NotFound (absent code), Expired, Exhausted, LimitExceeded,
    /// or AlreadyMember. On failure nothing is consumed.
    async fn redeem(
        &self,
        code: &str,
        user_id: i64,
        now: DateTime<Utc>,
    ) -> Result<RedeemedInvite, AppError>;

    /// Delete invites that expired before `now` (advisory sweep; redemption
    /// checks stay authoritative regardless).
    async fn delete_expired(&self, now: DateTime<Utc>) -> Result<u64, AppError>;
}
