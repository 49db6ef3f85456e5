//! Route Configuration
//!
//! Configures all HTTP routes for the API.

use axum::{
    middleware,
    routing::{delete, get, post, put},
    Router,
};

use super::handlers;
use crate::presentation::middleware::auth_middleware;
use crate::startup::AppState;

/// Create the main API router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .nest("/api/v1", api_routes(state.clone()))
        // Health check endpoints
        .route("/health", get(handlers::health::health_check))
        .route("/health/live", get(handlers::health::liveness))
        .route("/health/ready", get(handlers::health::readiness))
        .with_state(state)
}

/// API v1 routes
fn api_routes(state: AppState) -> Router<AppState> {
    Router::new()
        // User provisioning is invoked by the external account system
        .route("/users", post(handlers::user::register_user))
        .nest("/users/@me", me_routes(state.clone()))
        .nest("/guilds", guild_routes(state.clone()))
        .nest("/invites", invite_routes(state))
}

/// Current-user membership routes (protected)
fn me_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::user::get_current_user))
        .route("/guilds", get(handlers::user::get_my_guilds))
        .route("/guild", put(handlers::user::switch_guild))
        .route("/guild", delete(handlers::user::leave_guild))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}

/// Guild routes (protected)
fn guild_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/", post(handlers::guild::create_guild))
        .route("/{guild_id}", get(handlers::guild::get_guild))
        .route("/{guild_id}", delete(handlers::guild::delete_guild))
        .route("/{guild_id}/members", get(handlers::guild::get_guild_members))
        .route(
            "/{guild_id}/members/{user_id}",
            delete(handlers::guild::kick_member),
        )
        .route("/{guild_id}/invites", post(handlers::invite::create_invite))
        .route("/{guild_id}/invites", get(handlers::invite::get_guild_invites))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}

/// Invite preview and redemption routes (protected)
fn invite_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/{code}", get(handlers::invite::get_invite))
        .route("/{code}/join", post(handlers::invite::join_with_code))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}
