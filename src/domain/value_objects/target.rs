//! Attack targets and hit records

use serde::{Deserialize, Serialize};

use super::{ActorId, TokenId};

/// A target of an action, referenced by its actor and/or the token standing in for it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Target {
    #[serde(default)]
    pub actor_id: Option<ActorId>,
    #[serde(default)]
    pub token_id: Option<TokenId>,
    /// Actor behind the token, when the target was picked on the map
    #[serde(default)]
    pub token_actor_id: Option<ActorId>,
    #[serde(default)]
    pub name: String,
}

impl Target {
    pub fn actor(actor_id: ActorId, name: impl Into<String>) -> Self {
        Self {
            actor_id: Some(actor_id),
            token_id: None,
            token_actor_id: None,
            name: name.into(),
        }
    }

    pub fn token(token_id: TokenId, actor_id: Option<ActorId>, name: impl Into<String>) -> Self {
        Self {
            actor_id: None,
            token_id: Some(token_id),
            token_actor_id: actor_id,
            name: name.into(),
        }
    }

    /// Key used by the damage ledger; `None` for targets with no actor behind them
    pub fn stable_key(&self) -> Option<String> {
        self.actor_id
            .or(self.token_actor_id)
            .map(|id| id.to_string())
    }
}

/// Outcome of one attack roll against one target
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HitResult {
    pub target: Target,
    #[serde(default)]
    pub total: i32,
    pub hit: bool,
    #[serde(default)]
    pub crit: bool,
}

impl HitResult {
    pub fn hit(target: Target) -> Self {
        Self {
            target,
            total: 0,
            hit: true,
            crit: false,
        }
    }

    pub fn crit(target: Target) -> Self {
        Self {
            target,
            total: 0,
            hit: true,
            crit: true,
        }
    }

    pub fn miss(target: Target) -> Self {
        Self {
            target,
            total: 0,
            hit: false,
            crit: false,
        }
    }
}
