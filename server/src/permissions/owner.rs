//! Owner-only capability checks.
//!
//! Every mutating registry or credentials operation takes an
//! [`OwnerCapability`]. The token can only be minted by
//! [`OwnerPolicy::authorize`], so a caller that has one has passed the check.

use std::collections::HashSet;
use std::fmt;

use tracing::warn;

use crate::error::ConfigError;

/// Who is asking for a configuration change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Actor {
    /// The process itself (startup seeding).
    System,
    /// A chat user, identified by platform user id.
    User(String),
}

impl fmt::Display for Actor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::System => f.write_str("system"),
            Self::User(id) => write!(f, "user:{id}"),
        }
    }
}

/// Proof that the bearer passed the owner check.
#[derive(Debug, Clone)]
pub struct OwnerCapability {
    actor: Actor,
}

impl OwnerCapability {
    /// The actor this capability was granted to.
    pub const fn actor(&self) -> &Actor {
        &self.actor
    }
}

/// Set of platform user ids allowed to change configuration.
#[derive(Debug, Clone, Default)]
pub struct OwnerPolicy {
    owners: HashSet<String>,
}

impl OwnerPolicy {
    pub fn new<I, S>(owners: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            owners: owners.into_iter().map(Into::into).collect(),
        }
    }

    /// Check whether an actor is an owner.
    pub fn is_owner(&self, actor: &Actor) -> bool {
        match actor {
            Actor::System => true,
            Actor::User(id) => self.owners.contains(id),
        }
    }

    /// Grant a capability to an owner, or reject with `Forbidden`.
    pub fn authorize(&self, actor: &Actor) -> Result<OwnerCapability, ConfigError> {
        if self.is_owner(actor) {
            Ok(OwnerCapability {
                actor: actor.clone(),
            })
        } else {
            warn!(actor = %actor, "Rejected configuration change from non-owner");
            Err(ConfigError::Forbidden)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn owners_are_authorized() {
        let policy = OwnerPolicy::new(["1234"]);
        let cap = policy.authorize(&Actor::User("1234".into())).unwrap();
        assert_eq!(cap.actor(), &Actor::User("1234".into()));
    }

    #[test]
    fn non_owners_are_forbidden() {
        let policy = OwnerPolicy::new(["1234"]);
        let err = policy.authorize(&Actor::User("999".into())).unwrap_err();
        assert!(matches!(err, ConfigError::Forbidden));
    }

    #[test]
    fn system_is_always_authorized() {
        let policy = OwnerPolicy::default();
        assert!(policy.authorize(&Actor::System).is_ok());
        assert!(!policy.is_owner(&Actor::User(String::new())));
    }
}
