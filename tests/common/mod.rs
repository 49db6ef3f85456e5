//! Shared test utilities.
//!
//! An in-memory implementation of the repository traits backing hermetic
//! integration tests. All compound operations run under a single lock, so
//! they are atomic exactly like their SQL-transaction counterparts and the
//! concurrency properties can be exercised without a database.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;

use guild_service::application::services::GuildService;
use guild_service::domain::{
    Guild, GuildRepository, InviteCode, InviteRepository, RedeemedInvite, User, UserRepository,
};
use guild_service::shared::error::AppError;
use guild_service::shared::snowflake::SnowflakeGenerator;

#[derive(Default)]
struct StoreInner {
    users: HashMap<i64, User>,
    guilds: HashMap<i64, Guild>,
    invites: HashMap<String, InviteCode>,
}

/// In-memory store implementing all three repository traits.
#[derive(Clone, Default)]
pub struct MemStore {
    inner: Arc<Mutex<StoreInner>>,
}

impl MemStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of a guild row.
    pub fn guild(&self, guild_id: i64) -> Option<Guild> {
        self.inner.lock().guilds.get(&guild_id).cloned()
    }

    /// Snapshot of a user row.
    pub fn user(&self, user_id: i64) -> Option<User> {
        self.inner.lock().users.get(&user_id).cloned()
    }

    /// Snapshot of an invite row.
    pub fn invite(&self, code: &str) -> Option<InviteCode> {
        self.inner.lock().invites.get(code).cloned()
    }

    /// Plant an invite row directly, bypassing the engine. Used to set up
    /// already-expired codes.
    pub fn plant_invite(&self, invite: InviteCode) {
        self.inner.lock().invites.insert(invite.code.clone(), invite);
    }

    /// Assert the core invariants over the whole store: counts within
    /// bounds and consistent with the membership pointers, every pointer
    /// aimed at an existing guild.
    pub fn assert_invariants(&self) {
        let inner = self.inner.lock();
        for guild in inner.guilds.values() {
            assert!(
                guild.member_count >= 0 && guild.member_count <= guild.member_limit,
                "guild {} count {} outside 0..={}",
                guild.id,
                guild.member_count,
                guild.member_limit
            );
            let pointing = inner
                .users
                .values()
                .filter(|u| u.current_guild_id == guild.id)
                .count() as i32;
            assert_eq!(
                guild.member_count, pointing,
                "guild {} count {} != {} members pointing at it",
                guild.id, guild.member_count, pointing
            );
        }
        for user in inner.users.values() {
            assert!(
                inner.guilds.contains_key(&user.current_guild_id),
                "user {} points at missing guild {}",
                user.id,
                user.current_guild_id
            );
        }
    }
}

#[async_trait]
impl UserRepository for MemStore {
    async fn find_by_id(&self, id: i64) -> Result<Option<User>, AppError> {
        Ok(self.inner.lock().users.get(&id).cloned())
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, AppError> {
        Ok(self
            .inner
            .lock()
            .users
            .values()
            .find(|u| u.username == username)
            .cloned())
    }

    async fn provision(&self, user: &User, solo_guild: &Guild) -> Result<User, AppError> {
        let mut inner = self.inner.lock();
        if inner.users.values().any(|u| u.username == user.username) {
            return Err(AppError::Conflict(format!(
                "Username '{}' is already taken",
                user.username
            )));
        }
        inner.users.insert(user.id, user.clone());
        inner.guilds.insert(solo_guild.id, solo_guild.clone());
        Ok(user.clone())
    }
}

#[async_trait]
impl GuildRepository for MemStore {
    async fn find_by_id(&self, id: i64) -> Result<Option<Guild>, AppError> {
        Ok(self.inner.lock().guilds.get(&id).cloned())
    }

    async fn find_by_creator(&self, creator_id: i64) -> Result<Vec<Guild>, AppError> {
        Ok(self
            .inner
            .lock()
            .guilds
            .values()
            .filter(|g| g.creator_id == creator_id)
            .cloned()
            .collect())
    }

    async fn members(&self, guild_id: i64) -> Result<Vec<User>, AppError> {
        let mut members: Vec<User> = self
            .inner
            .lock()
            .users
            .values()
            .filter(|u| u.current_guild_id == guild_id)
            .cloned()
            .collect();
        members.sort_by_key(|u| u.id);
        Ok(members)
    }

    async fn create_with_creator(&self, guild: &Guild) -> Result<Guild, AppError> {
        let mut inner = self.inner.lock();
        let previous = inner
            .users
            .get(&guild.creator_id)
            .map(|u| u.current_guild_id)
            .ok_or_else(|| AppError::NotFound(format!("User {} not found", guild.creator_id)))?;

        inner.guilds.insert(guild.id, guild.clone());
        if let Some(user) = inner.users.get_mut(&guild.creator_id) {
            user.current_guild_id = guild.id;
        }
        if let Some(prev) = inner.guilds.get_mut(&previous) {
            if prev.member_count > 0 {
                prev.member_count -= 1;
            }
        }
        Ok(guild.clone())
    }

    async fn move_member(&self, user_id: i64, target_guild_id: i64) -> Result<(), AppError> {
        let mut inner = self.inner.lock();
        let previous = inner
            .users
            .get(&user_id)
            .map(|u| u.current_guild_id)
            .ok_or_else(|| AppError::NotFound(format!("User {} not found", user_id)))?;

        if previous == target_guild_id {
            return Err(AppError::AlreadyMember);
        }

        let target = inner
            .guilds
            .get_mut(&target_guild_id)
            .ok_or_else(|| AppError::NotFound(format!("Guild {} not found", target_guild_id)))?;
        if target.member_count >= target.member_limit {
            return Err(AppError::LimitExceeded);
        }
        target.member_count += 1;

        if let Some(user) = inner.users.get_mut(&user_id) {
            user.current_guild_id = target_guild_id;
        }
        if let Some(prev) = inner.guilds.get_mut(&previous) {
            if prev.member_count > 0 {
                prev.member_count -= 1;
            }
        }
        Ok(())
    }

    async fn delete_with_evictions(&self, guild_id: i64) -> Result<(), AppError> {
        let mut inner = self.inner.lock();
        if !inner.guilds.contains_key(&guild_id) {
            return Err(AppError::NotFound(format!("Guild {} not found", guild_id)));
        }

        let evicted: Vec<(i64, i64)> = inner
            .users
            .values()
            .filter(|u| u.current_guild_id == guild_id)
            .map(|u| (u.id, u.solo_guild_id))
            .collect();

        for (user_id, solo_id) in evicted {
            if let Some(user) = inner.users.get_mut(&user_id) {
                user.current_guild_id = solo_id;
            }
            if let Some(solo) = inner.guilds.get_mut(&solo_id) {
                solo.member_count += 1;
            }
        }

        inner.invites.retain(|_, invite| invite.guild_id != guild_id);
        inner.guilds.remove(&guild_id);
        Ok(())
    }
}

#[async_trait]
impl InviteRepository for MemStore {
    async fn find_by_code(&self, code: &str) -> Result<Option<InviteCode>, AppError> {
        Ok(self.inner.lock().invites.get(code).cloned())
    }

    async fn find_by_guild(&self, guild_id: i64) -> Result<Vec<InviteCode>, AppError> {
        Ok(self
            .inner
            .lock()
            .invites
            .values()
            .filter(|i| i.guild_id == guild_id)
            .cloned()
            .collect())
    }

    async fn code_exists(&self, code: &str) -> Result<bool, AppError> {
        Ok(self.inner.lock().invites.contains_key(code))
    }

    async fn create(&self, invite: &InviteCode) -> Result<InviteCode, AppError> {
        let mut inner = self.inner.lock();
        if inner.invites.contains_key(&invite.code) {
            return Err(AppError::Conflict("Invite code collision".into()));
        }
        inner.invites.insert(invite.code.clone(), invite.clone());
        Ok(invite.clone())
    }

    async fn redeem(
        &self,
        code: &str,
        user_id: i64,
        now: DateTime<Utc>,
    ) -> Result<RedeemedInvite, AppError> {
        let mut inner = self.inner.lock();

        let invite = inner
            .invites
            .get(code)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("Invite code '{}' not found", code)))?;

        if invite.is_expired(now) {
            return Err(AppError::Expired);
        }
        if invite.is_exhausted() {
            return Err(AppError::Exhausted);
        }

        let previous = inner
            .users
            .get(&user_id)
            .map(|u| u.current_guild_id)
            .ok_or_else(|| AppError::NotFound(format!("User {} not found", user_id)))?;

        if previous == invite.guild_id {
            return Err(AppError::AlreadyMember);
        }

        let guild = inner
            .guilds
            .get_mut(&invite.guild_id)
            .ok_or_else(|| AppError::NotFound(format!("Guild {} not found", invite.guild_id)))?;
        if guild.member_count >= guild.member_limit {
            return Err(AppError::LimitExceeded);
        }
        guild.member_count += 1;
        let guild_name = guild.name.clone();

        let uses_left = match invite.uses_left {
            Some(left) => {
                let remaining = left - 1;
                if let Some(stored) = inner.invites.get_mut(code) {
                    stored.uses_left = Some(remaining);
                }
                Some(remaining)
            }
            None => None,
        };

        if let Some(user) = inner.users.get_mut(&user_id) {
            user.current_guild_id = invite.guild_id;
        }
        if let Some(prev) = inner.guilds.get_mut(&previous) {
            if prev.member_count > 0 {
                prev.member_count -= 1;
            }
        }

        Ok(RedeemedInvite {
            guild_id: invite.guild_id,
            guild_name,
            uses_left,
        })
    }

    async fn delete_expired(&self, now: DateTime<Utc>) -> Result<u64, AppError> {
        let mut inner = self.inner.lock();
        let before = inner.invites.len();
        inner
            .invites
            .retain(|_, invite| !invite.is_expired(now));
        Ok((before - inner.invites.len()) as u64)
    }
}

/// The membership core wired against the in-memory store.
pub struct TestCore {
    pub store: MemStore,
    pub service: Arc<GuildService<MemStore, MemStore, MemStore>>,
}

impl TestCore {
    pub fn new() -> Self {
        let store = MemStore::new();
        let repo = Arc::new(store.clone());
        let service = Arc::new(GuildService::new(
            repo.clone(),
            repo.clone(),
            repo,
            Arc::new(SnowflakeGenerator::new(1, 0)),
        ));
        Self { store, service }
    }

    /// Provision a user with their solo guild.
    pub async fn register(&self, username: &str) -> (User, Guild) {
        self.service
            .register_user(username)
            .await
            .expect("user registration should succeed")
    }
}
