//! User Repository Implementation
//!
//! PostgreSQL implementation of the UserRepository trait.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::domain::{Guild, User, UserRepository};
use crate::shared::error::AppError;

/// Database row representation matching the `users` table schema.
#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    id: i64,
    username: String,
    current_guild_id: i64,
    solo_guild_id: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl UserRow {
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

/// PostgreSQL user repository implementation.
#[derive(Clone)]
pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    /// Create a new PgUserRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn find_by_id(&self, id: i64) -> Result<Option<User>, AppError> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, username, current_guild_id, solo_guild_id, created_at, updated_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(UserRow::into_user))
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, AppError> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, username, current_guild_id, solo_guild_id, created_at, updated_at
            FROM users
            WHERE username = $1
            "#,
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(UserRow::into_user))
    }

    /// Insert the user and their solo guild in one transaction. The circular
    /// reference between `users.current_guild_id` and `guilds.creator_id` is
    /// covered by deferred constraints checked at commit.
    async fn provision(&self, user: &User, solo_guild: &Guild) -> Result<User, AppError> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query_as::<_, UserRow>(
            r#"
            INSERT INTO users (id, username, current_guild_id, solo_guild_id, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, username, current_guild_id, solo_guild_id, created_at, updated_at
            "#,
        )
        .bind(user.id)
        .bind(&user.username)
        .bind(user.current_guild_id)
        .bind(user.solo_guild_id)
        .bind(user.created_at)
        .bind(user.updated_at)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                AppError::Conflict(format!("Username '{}' is already taken", user.username))
            }
            _ => AppError::from(e),
        })?;

        sqlx::query(
            r#"
            INSERT INTO guilds
                (id, name, creator_id, billing_tier, member_limit, member_count, is_solo, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(solo_guild.id)
        .bind(&solo_guild.name)
        .bind(solo_guild.creator_id)
        .bind(solo_guild.billing_tier.as_str())
        .bind(solo_guild.member_limit)
        .bind(solo_guild.member_count)
        .bind(solo_guild.is_solo)
        .bind(solo_guild.created_at)
        .bind(solo_guild.updated_at)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(row.into_user())
    }
}
