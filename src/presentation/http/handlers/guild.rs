//! Guild Handlers

use axum::{
    extract::{Extension, Path, State},
    http::StatusCode,
    Json,
};
use validator::Validate;

use crate::application::dto::request::CreateGuildRequest;
use crate::application::dto::response::{GuildResponse, MemberResponse};
use crate::presentation::http::handlers::{guild_service, parse_snowflake};
use crate::presentation::middleware::AuthUser;
use crate::shared::error::AppError;
use crate::startup::AppState;

/// Create a new guild
pub async fn create_guild(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Json(body): Json<CreateGuildRequest>,
) -> Result<(StatusCode, Json<GuildResponse>), AppError> {
    body.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let guild = guild_service(&state)
        .create_guild(auth.user_id, body.name, body.billing_tier)
        .await?;

    Ok((StatusCode::CREATED, Json(GuildResponse::from(guild))))
}

/// Get guild by ID
pub async fn get_guild(
    State(state): State<AppState>,
    Path(guild_id): Path<String>,
) -> Result<Json<GuildResponse>, AppError> {
    let guild_id = parse_snowflake(&guild_id, "guild")?;

    let guild = guild_service(&state).get_guild(guild_id).await?;

    Ok(Json(GuildResponse::from(guild)))
}

/// List guild members
pub async fn get_guild_members(
    State(state): State<AppState>,
    Path(guild_id): Path<String>,
) -> Result<Json<Vec<MemberResponse>>, AppError> {
    let guild_id = parse_snowflake(&guild_id, "guild")?;

    let service = guild_service(&state);
    let guild = service.get_guild(guild_id).await?;
    let members = service.guild_members(guild_id).await?;

    Ok(Json(
        members
            .into_iter()
            .map(|user| MemberResponse::new(user, &guild))
            .collect(),
    ))
}

/// Delete a guild (creator only; solo guilds are never deletable)
pub async fn delete_guild(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(guild_id): Path<String>,
) -> Result<StatusCode, AppError> {
    let guild_id = parse_snowflake(&guild_id, "guild")?;

    guild_service(&state)
        .delete_guild(auth.user_id, guild_id)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

/// Kick a member out of a guild
pub async fn kick_member(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path((guild_id, user_id)): Path<(String, String)>,
) -> Result<StatusCode, AppError> {
    let guild_id = parse_snowflake(&guild_id, "guild")?;
    let target_id = parse_snowflake(&user_id, "user")?;

    guild_service(&state)
        .kick_member(auth.user_id, target_id, guild_id)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
