//! Guild Service
//!
//! Facade composing the invite engine, membership manager, and lifecycle
//! manager into the operation surface the API layer consumes. Handlers talk
//! to this type only; errors pass through unchanged.

use std::sync::Arc;

use crate::application::services::{GuildLifecycleManager, InviteCodeEngine, MembershipManager};
use crate::domain::{
    BillingTier, Guild, GuildRepository, InviteCode, InviteRepository, RedeemedInvite, User,
    UserRepository,
};
use crate::shared::error::AppError;
use crate::shared::snowflake::SnowflakeGenerator;

/// Facade over the membership core.
pub struct GuildService<U, G, I>
where
    U: UserRepository,
    G: GuildRepository,
    I: InviteRepository,
{
    user_repo: Arc<U>,
    guild_repo: Arc<G>,
    membership: MembershipManager<U, G>,
    lifecycle: GuildLifecycleManager<U, G>,
    invites: InviteCodeEngine<U, G, I>,
}

impl<U, G, I> GuildService<U, G, I>
where
    U: UserRepository,
    G: GuildRepository,
    I: InviteRepository,
{
    pub fn new(
        user_repo: Arc<U>,
        guild_repo: Arc<G>,
        invite_repo: Arc<I>,
        id_generator: Arc<SnowflakeGenerator>,
    ) -> Self {
        Self {
            membership: MembershipManager::new(user_repo.clone(), guild_repo.clone()),
            lifecycle: GuildLifecycleManager::new(
                user_repo.clone(),
                guild_repo.clone(),
                id_generator,
            ),
            invites: InviteCodeEngine::new(user_repo.clone(), guild_repo.clone(), invite_repo),
            user_repo,
            guild_repo,
        }
    }

    /// Provision a user and their solo guild (account-system hook).
    pub async fn register_user(&self, username: &str) -> Result<(User, Guild), AppError> {
        self.lifecycle.provision_user(username).await
    }

    /// A user together with their current guild.
    pub async fn current_user(&self, user_id: i64) -> Result<(User, Guild), AppError> {
        let user = self
            .user_repo
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User {} not found", user_id)))?;
        let guild = self.get_guild(user.current_guild_id).await?;
        Ok((user, guild))
    }

    /// Guilds the user created, solo guild included. These are the user's
    /// valid switch targets.
    pub async fn my_guilds(&self, user_id: i64) -> Result<Vec<Guild>, AppError> {
        self.user_repo
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User {} not found", user_id)))?;
        self.guild_repo.find_by_creator(user_id).await
    }

    pub async fn get_guild(&self, guild_id: i64) -> Result<Guild, AppError> {
        self.guild_repo
            .find_by_id(guild_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Guild {} not found", guild_id)))
    }

    pub async fn guild_members(&self, guild_id: i64) -> Result<Vec<User>, AppError> {
        self.get_guild(guild_id).await?;
        self.guild_repo.members(guild_id).await
    }

    pub async fn create_guild(
        &self,
        creator_id: i64,
        name: String,
        tier: BillingTier,
    ) -> Result<Guild, AppError> {
        self.lifecycle.create(creator_id, name, tier).await
    }

    pub async fn delete_guild(&self, acting_user_id: i64, guild_id: i64) -> Result<(), AppError> {
        self.lifecycle.delete(acting_user_id, guild_id).await
    }

    pub async fn switch_guild(
        &self,
        user_id: i64,
        target_guild_id: i64,
    ) -> Result<(User, Guild), AppError> {
        self.membership.switch(user_id, target_guild_id).await
    }

    pub async fn leave_guild(&self, user_id: i64) -> Result<(), AppError> {
        self.membership.leave(user_id).await
    }

    pub async fn kick_member(
        &self,
        acting_user_id: i64,
        target_user_id: i64,
        guild_id: i64,
    ) -> Result<(), AppError> {
        self.membership
            .kick(acting_user_id, target_user_id, guild_id)
            .await
    }

    pub async fn create_invite(
        &self,
        guild_id: i64,
        issuer_id: i64,
        ttl_secs: Option<i64>,
        max_uses: Option<i32>,
    ) -> Result<InviteCode, AppError> {
        self.invites.issue(guild_id, issuer_id, ttl_secs, max_uses).await
    }

    pub async fn guild_invites(
        &self,
        guild_id: i64,
        actor_id: i64,
    ) -> Result<Vec<InviteCode>, AppError> {
        self.invites.guild_invites(guild_id, actor_id).await
    }

    /// Look up an invite without consuming it.
    pub async fn preview_invite(&self, code: &str) -> Result<InviteCode, AppError> {
        self.invites.preview(code).await
    }

    pub async fn join_with_code(
        &self,
        code: &str,
        user_id: i64,
    ) -> Result<RedeemedInvite, AppError> {
        self.invites.redeem(code, user_id).await
    }

    pub async fn sweep_expired_invites(&self) -> Result<u64, AppError> {
        self.invites.sweep_expired().await
    }
}
