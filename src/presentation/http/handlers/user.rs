//! User Handlers
//!
//! Provisioning plus the current-user membership surface: view, switch,
//! and leave.

use axum::{
    extract::{Extension, State},
    http::StatusCode,
    Json,
};
use validator::Validate;

use crate::application::dto::request::{RegisterUserRequest, SwitchGuildRequest};
use crate::application::dto::response::{GuildResponse, UserGuildResponse};
use crate::presentation::http::handlers::{guild_service, parse_snowflake};
use crate::presentation::middleware::AuthUser;
use crate::shared::error::AppError;
use crate::startup::AppState;

/// Provision a user and their solo guild (account-system hook)
pub async fn register_user(
    State(state): State<AppState>,
    Json(body): Json<RegisterUserRequest>,
) -> Result<(StatusCode, Json<UserGuildResponse>), AppError> {
    body.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let (user, solo_guild) = guild_service(&state).register_user(&body.username).await?;

    Ok((
        StatusCode::CREATED,
        Json(UserGuildResponse::new(user, solo_guild)),
    ))
}

/// Get the authenticated user together with their current guild
pub async fn get_current_user(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<UserGuildResponse>, AppError> {
    let (user, guild) = guild_service(&state).current_user(auth.user_id).await?;

    Ok(Json(UserGuildResponse::new(user, guild)))
}

/// List the guilds the user created (their valid switch targets)
pub async fn get_my_guilds(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<Vec<GuildResponse>>, AppError> {
    let guilds = guild_service(&state).my_guilds(auth.user_id).await?;

    Ok(Json(guilds.into_iter().map(GuildResponse::from).collect()))
}

/// Switch the active guild
pub async fn switch_guild(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Json(body): Json<SwitchGuildRequest>,
) -> Result<Json<UserGuildResponse>, AppError> {
    let guild_id = parse_snowflake(&body.guild_id, "guild")?;

    let (user, guild) = guild_service(&state)
        .switch_guild(auth.user_id, guild_id)
        .await?;

    Ok(Json(UserGuildResponse::new(user, guild)))
}

/// Leave the current guild, falling back to the solo guild
pub async fn leave_guild(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> Result<StatusCode, AppError> {
    guild_service(&state).leave_guild(auth.user_id).await?;

    Ok(StatusCode::NO_CONTENT)
}
