//! HTTP request handlers.

pub mod guild;
pub mod health;
pub mod invite;
pub mod user;

use std::sync::Arc;

use crate::application::services::GuildService;
use crate::infrastructure::repositories::{
    PgGuildRepository, PgInviteRepository, PgUserRepository,
};
use crate::shared::error::AppError;
use crate::startup::AppState;

/// The facade wired against the PostgreSQL repositories.
pub type PgGuildService = GuildService<PgUserRepository, PgGuildRepository, PgInviteRepository>;

/// Build the guild service for a request. Repositories are thin wrappers
/// over the shared pool, so per-request construction is cheap.
pub fn guild_service(state: &AppState) -> PgGuildService {
    GuildService::new(
        Arc::new(PgUserRepository::new(state.db.clone())),
        Arc::new(PgGuildRepository::new(state.db.clone())),
        Arc::new(PgInviteRepository::new(state.db.clone())),
        state.snowflake.clone(),
    )
}

/// Parse a snowflake ID from its wire (string) form.
pub fn parse_snowflake(raw: &str, what: &str) -> Result<i64, AppError> {
    raw.parse()
        .map_err(|_| AppError::BadRequest(format!("Invalid {} ID", what)))
}
