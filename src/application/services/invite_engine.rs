//! Invite Code Engine
//!
//! Issues, validates, and consumes invite codes. Validation and consumption
//! are one conditional repository operation, so two callers racing on the
//! last remaining use or the last free slot deterministically yield exactly
//! one winner.

use std::sync::Arc;

use chrono::Utc;

use crate::application::services::membership_service::MAX_CONFLICT_RETRIES;
use crate::domain::{
    GuildRepository, InviteCode, InviteRepository, RedeemedInvite, UserRepository,
};
use crate::shared::error::AppError;

/// Collision retry budget for code generation.
const MAX_CODE_ATTEMPTS: u32 = 5;

/// Invite code engine over the abstract repositories.
pub struct InviteCodeEngine<U, G, I>
where
    U: UserRepository,
    G: GuildRepository,
    I: InviteRepository,
{
    user_repo: Arc<U>,
    guild_repo: Arc<G>,
    invite_repo: Arc<I>,
}

impl<U, G, I> InviteCodeEngine<U, G, I>
where
    U: UserRepository,
    G: GuildRepository,
    I: InviteRepository,
{
    pub fn new(user_repo: Arc<U>, guild_repo: Arc<G>, invite_repo: Arc<I>) -> Self {
        Self {
            user_repo,
            guild_repo,
            invite_repo,
        }
    }

    /// Issue a new invite for a guild.
    ///
    /// The issuer must be a current member; solo guilds never take invites.
    /// Issuance against a full guild is rejected early with LimitExceeded so
    /// callers get fast feedback instead of a dead code.
    pub async fn issue(
        &self,
        guild_id: i64,
        issuer_id: i64,
        ttl_secs: Option<i64>,
        max_uses: Option<i32>,
    ) -> Result<InviteCode, AppError> {
        if ttl_secs.is_some_and(|ttl| ttl <= 0) {
            return Err(AppError::Validation("Invite TTL must be positive".into()));
        }
        if max_uses.is_some_and(|uses| uses <= 0) {
            return Err(AppError::Validation("Invite max uses must be positive".into()));
        }

        let guild = self
            .guild_repo
            .find_by_id(guild_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Guild {} not found", guild_id)))?;

        // Solo guilds hold exactly their owner; issuance is the only source
        // of codes, so closing it here keeps strangers out for good.
        if guild.is_solo {
            return Err(AppError::PermissionDenied(
                "Solo guilds cannot be invited into".into(),
            ));
        }

        let issuer = self
            .user_repo
            .find_by_id(issuer_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User {} not found", issuer_id)))?;

        if !issuer.is_member_of(guild_id) {
            return Err(AppError::PermissionDenied(
                "Only guild members can issue invites".into(),
            ));
        }

        if !guild.has_capacity() {
            return Err(AppError::LimitExceeded);
        }

        let mut invite = InviteCode::new(guild_id, issuer_id, ttl_secs, max_uses);
        let mut attempts = 0;
        while self.invite_repo.code_exists(&invite.code).await? {
            attempts += 1;
            if attempts >= MAX_CODE_ATTEMPTS {
                return Err(AppError::Internal(
                    "Failed to generate a unique invite code".into(),
                ));
            }
            invite.code = InviteCode::generate_code();
        }

        let created = self.invite_repo.create(&invite).await?;
        tracing::debug!(guild_id = %guild_id, code = %created.code, "Invite issued");
        Ok(created)
    }

    /// Redeem an invite code for a user.
    ///
    /// The use-decrement, the admission check, and the membership move are
    /// one serializable repository operation; this layer only maps an absent
    /// code to InvalidCode and retries transient conflicts.
    pub async fn redeem(&self, code: &str, user_id: i64) -> Result<RedeemedInvite, AppError> {
        let mut attempts = 0;
        loop {
            match self.invite_repo.redeem(code, user_id, Utc::now()).await {
                Err(AppError::NotFound(_)) => return Err(AppError::InvalidCode),
                Err(e) if e.is_retryable() && attempts < MAX_CONFLICT_RETRIES => attempts += 1,
                other => return other,
            }
        }
    }

    /// Look up an invite without consuming a use. Pre-join preview: callers
    /// learn whether a code is worth redeeming before committing.
    pub async fn preview(&self, code: &str) -> Result<InviteCode, AppError> {
        let invite = self
            .invite_repo
            .find_by_code(code)
            .await?
            .ok_or(AppError::InvalidCode)?;

        let now = Utc::now();
        if invite.is_redeemable(now) {
            return Ok(invite);
        }

        Err(if invite.is_expired(now) {
            AppError::Expired
        } else {
            AppError::Exhausted
        })
    }

    /// List a guild's invites. Member-only audit surface.
    pub async fn guild_invites(
        &self,
        guild_id: i64,
        actor_id: i64,
    ) -> Result<Vec<InviteCode>, AppError> {
        let actor = self
            .user_repo
            .find_by_id(actor_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User {} not found", actor_id)))?;

        if !actor.is_member_of(guild_id) {
            return Err(AppError::PermissionDenied(
                "Only guild members can list invites".into(),
            ));
        }

        self.invite_repo.find_by_guild(guild_id).await
    }

    /// Purge invites that have already expired. Advisory: redemption-time
    /// checks are authoritative whether or not the sweep has run.
    pub async fn sweep_expired(&self) -> Result<u64, AppError> {
        let purged = self.invite_repo.delete_expired(Utc::now()).await?;
        if purged > 0 {
            tracing::info!(purged = %purged, "Swept expired invite codes");
        }
        Ok(purged)
    }
}
