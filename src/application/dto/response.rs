//! Response DTOs
//!
//! Data structures for API response bodies. Snowflake IDs serialize as
//! strings to survive JSON number precision limits.

use serde::Serialize;

use crate::domain::{Guild, InviteCode, RedeemedInvite, User};

/// User response
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: String,
    pub username: String,
    pub current_guild_id: String,
    pub solo_guild_id: String,
    pub created_at: String,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id.to_string(),
            username: user.username,
            current_guild_id: user.current_guild_id.to_string(),
            solo_guild_id: user.solo_guild_id.to_string(),
            created_at: user.created_at.to_rfc3339(),
        }
    }
}

/// Guild response
#[derive(Debug, Serialize)]
pub struct GuildResponse {
    pub id: String,
    pub name: String,
    pub creator_id: String,
    pub billing_tier: String,
    pub member_limit: i32,
    pub member_count: i32,
    pub is_solo: bool,
    pub created_at: String,
}

impl From<Guild> for GuildResponse {
    fn from(guild: Guild) -> Self {
        Self {
            id: guild.id.to_string(),
            name: guild.name,
            creator_id: guild.creator_id.to_string(),
            billing_tier: guild.billing_tier.as_str().to_string(),
            member_limit: guild.member_limit,
            member_count: guild.member_count,
            is_solo: guild.is_solo,
            created_at: guild.created_at.to_rfc3339(),
        }
    }
}

/// User together with their current guild
#[derive(Debug, Serialize)]
pub struct UserGuildResponse {
    pub user: UserResponse,
    pub guild: GuildResponse,
    /// The user's role in that guild
    pub role: String,
}

impl UserGuildResponse {
    pub fn new(user: User, guild: Guild) -> Self {
        let role = user.role_in(&guild).as_str().to_string();
        Self {
            user: user.into(),
            guild: guild.into(),
            role,
        }
    }
}

/// Guild member entry
#[derive(Debug, Serialize)]
pub struct MemberResponse {
    pub user_id: String,
    pub username: String,
    pub role: String,
}

impl MemberResponse {
    pub fn new(user: User, guild: &Guild) -> Self {
        Self {
            role: user.role_in(guild).as_str().to_string(),
            user_id: user.id.to_string(),
            username: user.username,
        }
    }
}

/// Invite code response
#[derive(Debug, Serialize)]
pub struct InviteResponse {
    pub code: String,
    pub guild_id: String,
    pub created_by: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uses_left: Option<i32>,
    pub created_at: String,
}

impl From<InviteCode> for InviteResponse {
    fn from(invite: InviteCode) -> Self {
        Self {
            code: invite.code,
            guild_id: invite.guild_id.to_string(),
            created_by: invite.created_by.to_string(),
            expires_at: invite.expires_at.map(|dt| dt.to_rfc3339()),
            uses_left: invite.uses_left,
            created_at: invite.created_at.to_rfc3339(),
        }
    }
}

/// Join-via-invite response
#[derive(Debug, Serialize)]
pub struct JoinResponse {
    pub guild_name: String,
    pub current_guild_id: String,
}

impl From<RedeemedInvite> for JoinResponse {
    fn from(redeemed: RedeemedInvite) -> Self {
        Self {
            guild_name: redeemed.guild_name,
            current_guild_id: redeemed.guild_id.to_string(),
        }
    }
}
