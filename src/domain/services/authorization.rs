//! Authorization Guard
//!
//! Stateless predicate evaluator gating the security-sensitive mutations.
//! Every kick and delete consults these predicates before touching state;
//! an authorization failure performs no partial mutation.

use crate::domain::entities::{Guild, User};

/// Stateless role/ownership checks.
pub struct AuthorizationGuard;

impl AuthorizationGuard {
    /// Whether `actor` may kick `target` out of `guild`.
    ///
    /// True iff the actor is the guild's creator, is not kicking themself,
    /// and the guild is not the target's solo guild.
    pub fn can_kick(actor: &User, target: &User, guild: &Guild) -> bool {
        guild.is_creator(actor.id) && actor.id != target.id && !guild.is_solo_of(target.id)
    }

    /// Whether `actor` may delete `guild`.
    ///
    /// True iff the actor created the guild and the guild is not a solo
    /// guild (solo guilds are never deletable).
    pub fn can_delete(actor: &User, guild: &Guild) -> bool {
        guild.is_creator(actor.id) && !guild.is_solo
    }
}
