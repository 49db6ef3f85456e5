//! Invite Handlers

use axum::{
    extract::{Extension, Path, State},
    http::StatusCode,
    Json,
};
use validator::Validate;

use crate::application::dto::request::CreateInviteRequest;
use crate::application::dto::response::{InviteResponse, JoinResponse};
use crate::presentation::http::handlers::{guild_service, parse_snowflake};
use crate::presentation::middleware::AuthUser;
use crate::shared::error::AppError;
use crate::startup::AppState;

/// Issue a new invite for a guild
pub async fn create_invite(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(guild_id): Path<String>,
    Json(body): Json<CreateInviteRequest>,
) -> Result<(StatusCode, Json<InviteResponse>), AppError> {
    let guild_id = parse_snowflake(&guild_id, "guild")?;

    body.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let invite = guild_service(&state)
        .create_invite(guild_id, auth.user_id, body.ttl_secs, body.max_uses)
        .await?;

    Ok((StatusCode::CREATED, Json(InviteResponse::from(invite))))
}

/// List a guild's invites (members only)
pub async fn get_guild_invites(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(guild_id): Path<String>,
) -> Result<Json<Vec<InviteResponse>>, AppError> {
    let guild_id = parse_snowflake(&guild_id, "guild")?;

    let invites = guild_service(&state)
        .guild_invites(guild_id, auth.user_id)
        .await?;

    Ok(Json(invites.into_iter().map(InviteResponse::from).collect()))
}

/// Preview an invite code without consuming a use
pub async fn get_invite(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Result<Json<InviteResponse>, AppError> {
    let invite = guild_service(&state).preview_invite(&code).await?;

    Ok(Json(InviteResponse::from(invite)))
}

/// Join a guild by redeeming an invite code
pub async fn join_with_code(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(code): Path<String>,
) -> Result<Json<JoinResponse>, AppError> {
    let redeemed = guild_service(&state)
        .join_with_code(&code, auth.user_id)
        .await?;

    Ok(Json(JoinResponse::from(redeemed)))
}
