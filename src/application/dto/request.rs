//! Request DTOs
//!
//! Data structures for API request bodies.

use serde::Deserialize;
use validator::Validate;

use crate::domain::BillingTier;

/// User provisioning request (account-system hook)
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterUserRequest {
    #[validate(length(min = 2, max = 32, message = "Username must be 2-32 characters"))]
    pub username: String,
}

/// Create guild request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateGuildRequest {
    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub name: String,

    #[serde(default)]
    pub billing_tier: BillingTier,
}

/// Switch active guild request
#[derive(Debug, Deserialize)]
pub struct SwitchGuildRequest {
    /// Target guild ID (snowflake, stringly typed on the wire)
    pub guild_id: String,
}

/// Create invite request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateInviteRequest {
    /// Seconds until expiration (None = never expires)
    #[validate(range(min = 1, message = "TTL must be positive"))]
    pub ttl_secs: Option<i64>,

    /// Maximum number of uses (None = unlimited)
    #[validate(range(min = 1, message = "Max uses must be positive"))]
    pub max_uses: Option<i32>,
}
