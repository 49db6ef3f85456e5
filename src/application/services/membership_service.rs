//! Membership Manager
//!
//! Owns the "one active guild per user" invariant: switch, join, leave, and
//! kick are all pointer reassignments executed through the repository's
//! atomic `move_member`, so member counts can never overshoot the limit or
//! go negative. Transient conflicts are retried a bounded number of times.

use std::sync::Arc;

use crate::domain::{AuthorizationGuard, Guild, GuildRepository, User, UserRepository};
use crate::shared::error::AppError;

/// Bounded retry budget for transient race losses.
pub const MAX_CONFLICT_RETRIES: u32 = 3;

/// Membership manager over the abstract repositories.
pub struct MembershipManager<U, G>
where
    U: UserRepository,
    G: GuildRepository,
{
    user_repo: Arc<U>,
    guild_repo: Arc<G>,
}

impl<U, G> MembershipManager<U, G>
where
    U: UserRepository,
    G: GuildRepository,
{
    pub fn new(user_repo: Arc<U>, guild_repo: Arc<G>) -> Self {
        Self {
            user_repo,
            guild_repo,
        }
    }

    async fn user(&self, user_id: i64) -> Result<User, AppError> {
        self.user_repo
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User {} not found", user_id)))
    }

    async fn guild(&self, guild_id: i64) -> Result<Guild, AppError> {
        self.guild_repo
            .find_by_id(guild_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Guild {} not found", guild_id)))
    }

    /// Reassign a user's membership pointer, retrying transient conflicts.
    async fn reassign(&self, user_id: i64, target_guild_id: i64) -> Result<(), AppError> {
        let mut attempts = 0;
        loop {
            match self.guild_repo.move_member(user_id, target_guild_id).await {
                Err(e) if e.is_retryable() && attempts < MAX_CONFLICT_RETRIES => attempts += 1,
                other => return other,
            }
        }
    }

    /// Switch the active guild to one the user already has standing in:
    /// their current guild (no-op), their solo guild, or a guild they
    /// created. Anything else fails with NotMember.
    pub async fn switch(&self, user_id: i64, target_guild_id: i64) -> Result<(User, Guild), AppError> {
        let user = self.user(user_id).await?;
        let guild = self
            .guild_repo
            .find_by_id(target_guild_id)
            .await?
            .ok_or(AppError::NotMember)?;

        if user.current_guild_id == target_guild_id {
            return Ok((user, guild));
        }

        let has_standing = target_guild_id == user.solo_guild_id || guild.is_creator(user.id);
        if !has_standing {
            return Err(AppError::NotMember);
        }

        self.reassign(user_id, target_guild_id).await?;

        let user = self.user(user_id).await?;
        let guild = self.guild(target_guild_id).await?;
        Ok((user, guild))
    }

    /// Join a guild the user has been granted access to (invite redemption
    /// takes its own fully-atomic path through the invite repository).
    pub async fn join(&self, user_id: i64, guild_id: i64) -> Result<(), AppError> {
        let user = self.user(user_id).await?;
        self.guild(guild_id).await?;

        if user.current_guild_id == guild_id {
            return Err(AppError::AlreadyMember);
        }

        self.reassign(user_id, guild_id).await
    }

    /// Leave the current guild, falling back to the user's solo guild.
    /// A user may never be memberless.
    pub async fn leave(&self, user_id: i64) -> Result<(), AppError> {
        let user = self.user(user_id).await?;
        let current = self.guild(user.current_guild_id).await?;

        if current.is_solo {
            return Err(AppError::CannotLeaveSolo);
        }

        self.reassign(user_id, user.solo_guild_id).await
    }

    /// Kick a member out of a guild, forcing them back to their solo guild.
    pub async fn kick(
        &self,
        acting_user_id: i64,
        target_user_id: i64,
        guild_id: i64,
    ) -> Result<(), AppError> {
        let actor = self.user(acting_user_id).await?;
        let target = self.user(target_user_id).await?;
        let guild = self.guild(guild_id).await?;

        // A solo guild only ever holds its owner; kicking out of it is
        // rejected before any role check.
        if guild.is_solo {
            return Err(AppError::CannotKickFromSolo);
        }

        if !AuthorizationGuard::can_kick(&actor, &target, &guild) {
            return Err(AppError::PermissionDenied(
                "Only the guild creator can kick other members".into(),
            ));
        }

        if target.current_guild_id != guild_id {
            return Err(AppError::NotMember);
        }

        self.reassign(target_user_id, target.solo_guild_id).await
    }
}
