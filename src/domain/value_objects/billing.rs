//! Billing tiers and the member-limit table derived from them.

use serde::{Deserialize, Serialize};

/// Billing tier for a guild, stored as VARCHAR in the `guilds` table.
///
/// The tier fixes the guild's member-limit ceiling at creation time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum BillingTier {
    #[default]
    Free,
    Standard,
    Premium,
}

impl BillingTier {
    /// Member-limit ceiling for the tier.
    pub fn member_limit(&self) -> i32 {
        match self {
            Self::Free => 2,
            Self::Standard => 25,
            Self::Premium => 100,
        }
    }

    /// Convert from database string representation.
    pub fn from_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "standard" => Self::Standard,
            "premium" => Self::Premium,
            _ => Self::Free,
        }
    }

    /// Convert to database string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Free => "free",
            Self::Standard => "standard",
            Self::Premium => "premium",
        }
    }
}

impl std::fmt::Display for BillingTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
