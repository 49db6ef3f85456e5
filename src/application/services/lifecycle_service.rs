//! Guild Lifecycle Manager
//!
//! Creates and deletes guilds, and provisions the user + solo guild pair at
//! registration time. Solo guilds are never deletable; deletion of a regular
//! guild is creator-only and evicts every remaining member in the same
//! transaction.

use std::sync::Arc;

use crate::domain::{
    AuthorizationGuard, BillingTier, Guild, GuildRepository, User, UserRepository,
};
use crate::shared::error::AppError;
use crate::shared::snowflake::SnowflakeGenerator;

/// Guild lifecycle manager over the abstract repositories.
pub struct GuildLifecycleManager<U, G>
where
    U: UserRepository,
    G: GuildRepository,
{
    user_repo: Arc<U>,
    guild_repo: Arc<G>,
    id_generator: Arc<SnowflakeGenerator>,
}

impl<U, G> GuildLifecycleManager<U, G>
where
    U: UserRepository,
    G: GuildRepository,
{
    pub fn new(user_repo: Arc<U>, guild_repo: Arc<G>, id_generator: Arc<SnowflakeGenerator>) -> Self {
        Self {
            user_repo,
            guild_repo,
            id_generator,
        }
    }

    /// Provision a new user together with their solo guild.
    ///
    /// Registration hook for the external account system; the inserts land
    /// in one transaction so the user is never observed memberless.
    pub async fn provision_user(&self, username: &str) -> Result<(User, Guild), AppError> {
        if self.user_repo.find_by_username(username).await?.is_some() {
            return Err(AppError::Conflict(format!(
                "Username '{}' is already taken",
                username
            )));
        }

        let user_id = self.id_generator.generate();
        let guild_id = self.id_generator.generate();
        let solo = Guild::new_solo(guild_id, user_id, username);

        let now = chrono::Utc::now();
        let user = User {
            id: user_id,
            username: username.to_string(),
            current_guild_id: guild_id,
            solo_guild_id: guild_id,
            created_at: now,
            updated_at: now,
        };

        let user = self.user_repo.provision(&user, &solo).await?;
        tracing::info!(user_id = %user.id, guild_id = %solo.id, "Provisioned user with solo guild");

        Ok((user, solo))
    }

    /// Create a regular guild. The member limit comes from the billing tier
    /// and the creator becomes the sole member with role creator.
    pub async fn create(
        &self,
        creator_id: i64,
        name: String,
        tier: BillingTier,
    ) -> Result<Guild, AppError> {
        self.user_repo
            .find_by_id(creator_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User {} not found", creator_id)))?;

        let guild = Guild::new(self.id_generator.generate(), name, creator_id, tier);
        let created = self.guild_repo.create_with_creator(&guild).await?;

        tracing::info!(guild_id = %created.id, creator_id = %creator_id, tier = %created.billing_tier, "Guild created");
        Ok(created)
    }

    /// Delete a guild. Solo guilds are rejected regardless of caller; for
    /// regular guilds only the creator may delete, and every remaining
    /// member is evicted to their solo guild inside the same transaction.
    /// Outstanding invite codes for the guild vanish with it.
    pub async fn delete(&self, acting_user_id: i64, guild_id: i64) -> Result<(), AppError> {
        let guild = self
            .guild_repo
            .find_by_id(guild_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Guild {} not found", guild_id)))?;

        if guild.is_solo {
            return Err(AppError::NotDeletable);
        }

        let actor = self
            .user_repo
            .find_by_id(acting_user_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User {} not found", acting_user_id)))?;

        if !AuthorizationGuard::can_delete(&actor, &guild) {
            return Err(AppError::PermissionDenied(
                "Only the guild creator can delete the guild".into(),
            ));
        }

        self.guild_repo.delete_with_evictions(guild_id).await?;
        tracing::info!(guild_id = %guild_id, "Guild deleted");
        Ok(())
    }
}
