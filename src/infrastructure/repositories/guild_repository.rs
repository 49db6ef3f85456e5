//! Guild Repository Implementation
//!
//! PostgreSQL implementation of the GuildRepository trait. The compound
//! operations here are the atomic units membership correctness rests on:
//! counter mutations are conditional UPDATEs under row locks inside one
//! transaction, and a dropped transaction rolls back cleanly.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, Transaction};

use crate::domain::value_objects::BillingTier;
use crate::domain::{Guild, GuildRepository, User};
use crate::shared::error::AppError;

/// Database row representation matching the `guilds` table schema.
#[derive(Debug, sqlx::FromRow)]
struct GuildRow {
    id: i64,
    name: String,
    creator_id: i64,
    billing_tier: String,
    member_limit: i32,
    member_count: i32,
    is_solo: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl GuildRow {
    fn into_guild(self) -> Guild {
        Guild {
            id: self.id,
            name: self.name,
            creator_id: self.creator_id,
            billing_tier: BillingTier::from_str(&self.billing_tier),
            member_limit: self.member_limit,
            member_count: self.member_count,
            is_solo: self.is_solo,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct MemberPointerRow {
    id: i64,
    solo_guild_id: i64,
}

#[derive(Debug, sqlx::FromRow)]
struct MemberRow {
    id: i64,
    username: String,
    current_guild_id: i64,
    solo_guild_id: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl MemberRow {
    fn into_user(self) -> User {
        User {
            id: self.id,
            username: self.username,
            current_guild_id: self.current_guild_id,
            solo_guild_id: self.solo_guild_id,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// PostgreSQL guild repository implementation.
#[derive(Clone)]
pub struct PgGuildRepository {
    pool: PgPool,
}

impl PgGuildRepository {
    /// Create a new PgGuildRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Lock the user's row and return their current guild pointer.
    async fn lock_current_guild(
        tx: &mut Transaction<'_, Postgres>,
        user_id: i64,
    ) -> Result<i64, AppError> {
        sqlx::query_scalar::<_, i64>(
            r#"
            SELECT current_guild_id FROM users
            WHERE id = $1
            FOR UPDATE
            "#,
        )
        .bind(user_id)
        .fetch_optional(&mut **tx)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User {} not found", user_id)))
    }

    /// Admission control: conditionally claim a seat in the target guild.
    /// The UPDATE takes the guild's row lock, so two racing joins serialize
    /// and the loser sees zero rows affected.
    async fn claim_seat(
        tx: &mut Transaction<'_, Postgres>,
        guild_id: i64,
    ) -> Result<(), AppError> {
        let claimed = sqlx::query(
            r#"
            UPDATE guilds
            SET member_count = member_count + 1, updated_at = NOW()
            WHERE id = $1 AND member_count < member_limit
            "#,
        )
        .bind(guild_id)
        .execute(&mut **tx)
        .await?;

        if claimed.rows_affected() == 0 {
            let exists = sqlx::query_scalar::<_, bool>(
                r#"SELECT EXISTS(SELECT 1 FROM guilds WHERE id = $1)"#,
            )
            .bind(guild_id)
            .fetch_one(&mut **tx)
            .await?;

            return Err(if exists {
                AppError::LimitExceeded
            } else {
                AppError::NotFound(format!("Guild {} not found", guild_id))
            });
        }

        Ok(())
    }

    /// Release a seat in the guild the user is leaving. The `member_count > 0`
    /// guard keeps the counter from ever going negative.
    async fn release_seat(
        tx: &mut Transaction<'_, Postgres>,
        guild_id: i64,
    ) -> Result<(), AppError> {
        sqlx::query(
            r#"
            UPDATE guilds
            SET member_count = member_count - 1, updated_at = NOW()
            WHERE id = $1 AND member_count > 0
            "#,
        )
        .bind(guild_id)
        .execute(&mut **tx)
        .await?;

        Ok(())
    }

    async fn repoint_user(
        tx: &mut Transaction<'_, Postgres>,
        user_id: i64,
        guild_id: i64,
    ) -> Result<(), AppError> {
        sqlx::query(
            r#"
            UPDATE users
            SET current_guild_id = $2, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(user_id)
        .bind(guild_id)
        .execute(&mut **tx)
        .await?;

        Ok(())
    }
}

#[async_trait]
impl GuildRepository for PgGuildRepository {
    async fn find_by_id(&self, id: i64) -> Result<Option<Guild>, AppError> {
        let row = sqlx::query_as::<_, GuildRow>(
            r#"
            SELECT id, name, creator_id, billing_tier, member_limit, member_count,
                   is_solo, created_at, updated_at
            FROM guilds
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(GuildRow::into_guild))
    }

    async fn find_by_creator(&self, creator_id: i64) -> Result<Vec<Guild>, AppError> {
        let rows = sqlx::query_as::<_, GuildRow>(
            r#"
            SELECT id, name, creator_id, billing_tier, member_limit, member_count,
                   is_solo, created_at, updated_at
            FROM guilds
            WHERE creator_id = $1
            ORDER BY created_at ASC
            "#,
        )
        .bind(creator_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(GuildRow::into_guild).collect())
    }

    async fn members(&self, guild_id: i64) -> Result<Vec<User>, AppError> {
        let rows = sqlx::query_as::<_, MemberRow>(
            r#"
            SELECT id, username, current_guild_id, solo_guild_id, created_at, updated_at
            FROM users
            WHERE current_guild_id = $1
            ORDER BY id ASC
            "#,
        )
        .bind(guild_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(|r| r.into_user()).collect())
    }

    async fn create_with_creator(&self, guild: &Guild) -> Result<Guild, AppError> {
        let mut tx = self.pool.begin().await?;

        let previous = Self::lock_current_guild(&mut tx, guild.creator_id).await?;

        let row = sqlx::query_as::<_, GuildRow>(
            r#"
            INSERT INTO guilds
                (id, name, creator_id, billing_tier, member_limit, member_count, is_solo, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, 1, $6, $7, $8)
            RETURNING id, name, creator_id, billing_tier, member_limit, member_count,
                      is_solo, created_at, updated_at
            "#,
        )
        .bind(guild.id)
        .bind(&guild.name)
        .bind(guild.creator_id)
        .bind(guild.billing_tier.as_str())
        .bind(guild.member_limit)
        .bind(guild.is_solo)
        .bind(guild.created_at)
        .bind(guild.updated_at)
        .fetch_one(&mut *tx)
        .await?;

        Self::repoint_user(&mut tx, guild.creator_id, guild.id).await?;
        Self::release_seat(&mut tx, previous).await?;

        tx.commit().await?;

        Ok(row.into_guild())
    }

    async fn move_member(&self, user_id: i64, target_guild_id: i64) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;

        let previous = Self::lock_current_guild(&mut tx, user_id).await?;
        if previous == target_guild_id {
            return Err(AppError::AlreadyMember);
        }

        Self::claim_seat(&mut tx, target_guild_id).await?;
        Self::repoint_user(&mut tx, user_id, target_guild_id).await?;
        Self::release_seat(&mut tx, previous).await?;

        tx.commit().await?;

        Ok(())
    }

    async fn delete_with_evictions(&self, guild_id: i64) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;

        let locked = sqlx::query_scalar::<_, i64>(
            r#"SELECT id FROM guilds WHERE id = $1 FOR UPDATE"#,
        )
        .bind(guild_id)
        .fetch_optional(&mut *tx)
        .await?;

        if locked.is_none() {
            return Err(AppError::NotFound(format!("Guild {} not found", guild_id)));
        }

        let members = sqlx::query_as::<_, MemberPointerRow>(
            r#"
            SELECT id, solo_guild_id FROM users
            WHERE current_guild_id = $1
            ORDER BY id ASC
            FOR UPDATE
            "#,
        )
        .bind(guild_id)
        .fetch_all(&mut *tx)
        .await?;

        // Every member, creator included, falls back to their solo guild.
        for member in &members {
            Self::repoint_user(&mut tx, member.id, member.solo_guild_id).await?;
            sqlx::query(
                r#"
                UPDATE guilds
                SET member_count = member_count + 1, updated_at = NOW()
                WHERE id = $1
                "#,
            )
            .bind(member.solo_guild_id)
            .execute(&mut *tx)
            .await?;
        }

        sqlx::query(r#"DELETE FROM invite_codes WHERE guild_id = $1"#)
            .bind(guild_id)
            .execute(&mut *tx)
            .await?;

        sqlx::query(r#"DELETE FROM guilds WHERE id = $1"#)
            .bind(guild_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(())
    }
}
