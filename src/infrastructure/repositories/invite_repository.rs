//! Invite Repository Implementation
//!
//! PostgreSQL implementation of the InviteRepository trait. Redemption is
//! one transaction holding the invite's row lock: use-decrement, admission
//! check, and the membership pointer move commit or roll back together, so
//! a failed admission never burns a use.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::domain::{InviteCode, InviteRepository, RedeemedInvite};
use crate::shared::error::AppError;

/// Database row representation matching the `invite_codes` table schema.
#[derive(Debug, sqlx::FromRow)]
struct InviteRow {
    code: String,
    guild_id: i64,
    created_by: i64,
    expires_at: Option<DateTime<Utc>>,
    uses_left: Option<i32>,
    created_at: DateTime<Utc>,
}

impl InviteRow {
    fn into_invite(self) -> InviteCode {
        InviteCode {
            code: self.code,
            guild_id: self.guild_id,
            created_by: self.created_by,
            expires_at: self.expires_at,
            uses_left: self.uses_left,
            created_at: self.created_at,
        }
    }
}

/// PostgreSQL invite repository implementation.
#[derive(Clone)]
pub struct PgInviteRepository {
    pool: PgPool,
}

impl PgInviteRepository {
    /// Create a new PgInviteRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl InviteRepository for PgInviteRepository {
    async fn find_by_code(&self, code: &str) -> Result<Option<InviteCode>, AppError> {
        let row = sqlx::query_as::<_, InviteRow>(
            r#"
            SELECT code, guild_id, created_by, expires_at, uses_left, created_at
            FROM invite_codes
            WHERE code = $1
            "#,
        )
        .bind(code)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(InviteRow::into_invite))
    }

    async fn find_by_guild(&self, guild_id: i64) -> Result<Vec<InviteCode>, AppError> {
        let rows = sqlx::query_as::<_, InviteRow>(
            r#"
            SELECT code, guild_id, created_by, expires_at, uses_left, created_at
            FROM invite_codes
            WHERE guild_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(guild_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(InviteRow::into_invite).collect())
    }

    async fn code_exists(&self, code: &str) -> Result<bool, AppError> {
        let exists = sqlx::query_scalar::<_, bool>(
            r#"SELECT EXISTS(SELECT 1 FROM invite_codes WHERE code = $1)"#,
        )
        .bind(code)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    async fn create(&self, invite: &InviteCode) -> Result<InviteCode, AppError> {
        let row = sqlx::query_as::<_, InviteRow>(
            r#"
            INSERT INTO invite_codes (code, guild_id, created_by, expires_at, uses_left, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING code, guild_id, created_by, expires_at, uses_left, created_at
            "#,
        )
        .bind(&invite.code)
        .bind(invite.guild_id)
        .bind(invite.created_by)
        .bind(invite.expires_at)
        .bind(invite.uses_left)
        .bind(invite.created_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                AppError::Conflict("Invite code collision".to_string())
            }
            _ => AppError::from(e),
        })?;

        Ok(row.into_invite())
    }

    async fn redeem(
        &self,
        code: &str,
        user_id: i64,
        now: DateTime<Utc>,
    ) -> Result<RedeemedInvite, AppError> {
        let mut tx = self.pool.begin().await?;

        // The invite row lock serializes racing redemptions of the same code;
        // the loser re-reads the decremented counter.
        let invite = sqlx::query_as::<_, InviteRow>(
            r#"
            SELECT code, guild_id, created_by, expires_at, uses_left, created_at
            FROM invite_codes
            WHERE code = $1
            FOR UPDATE
            "#,
        )
        .bind(code)
        .fetch_optional(&mut *tx)
        .await?
        .map(InviteRow::into_invite)
        .ok_or_else(|| AppError::NotFound(format!("Invite code '{}' not found", code)))?;

        if invite.is_expired(now) {
            return Err(AppError::Expired);
        }
        if invite.is_exhausted() {
            return Err(AppError::Exhausted);
        }

        let uses_left = match invite.uses_left {
            Some(left) => {
                sqlx::query(
                    r#"UPDATE invite_codes SET uses_left = uses_left - 1 WHERE code = $1"#,
                )
                .bind(code)
                .execute(&mut *tx)
                .await?;
                Some(left - 1)
            }
            None => None,
        };

        let previous = sqlx::query_scalar::<_, i64>(
            r#"SELECT current_guild_id FROM users WHERE id = $1 FOR UPDATE"#,
        )
        .bind(user_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User {} not found", user_id)))?;

        if previous == invite.guild_id {
            return Err(AppError::AlreadyMember);
        }

        // Admission control under the guild's row lock.
        let guild_name = sqlx::query_scalar::<_, String>(
            r#"
            UPDATE guilds
            SET member_count = member_count + 1, updated_at = NOW()
            WHERE id = $1 AND member_count < member_limit
            RETURNING name
            "#,
        )
        .bind(invite.guild_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(AppError::LimitExceeded)?;

        sqlx::query(
            r#"
            UPDATE users
            SET current_guild_id = $2, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(user_id)
        .bind(invite.guild_id)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            UPDATE guilds
            SET member_count = member_count - 1, updated_at = NOW()
            WHERE id = $1 AND member_count > 0
            "#,
        )
        .bind(previous)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(RedeemedInvite {
            guild_id: invite.guild_id,
            guild_name,
            uses_left,
        })
    }

    async fn delete_expired(&self, now: DateTime<Utc>) -> Result<u64, AppError> {
        let result = sqlx::query(
            r#"DELETE FROM invite_codes WHERE expires_at IS NOT NULL AND expires_at <= $1"#,
        )
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }
}
