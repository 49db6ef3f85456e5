//! Guild roles.

use serde::{Deserialize, Serialize};

/// A user's role within their current guild.
///
/// Closed enumeration: the creator of a guild is its only privileged member;
/// everyone else is a plain member. The role is derived from
/// `guild.creator_id`, never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GuildRole {
    Creator,
    Member,
}

impl GuildRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Creator => "creator",
            Self::Member => "member",
        }
    }
}

impl std::fmt::Display for GuildRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
