use async_trait::async_trait;

use crate::domain::value_objects::Damage;

/// What the user decided on the damage HUD
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HudDecision {
    /// Roll with the damage shown
    Confirmed,
    /// Roll with edited damage lists
    Edited {
        damage: Vec<Damage>,
        bonus_damage: Vec<Damage>,
    },
    Cancelled,
}

/// Summary shown on the HUD before rolling
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DamageHudRequest {
    pub title: String,
    pub damage: Vec<Damage>,
    pub bonus_damage: Vec<Damage>,
    pub target_names: Vec<String>,
    pub ap: bool,
    pub overkill: bool,
    pub reliable: bool,
}

/// Asks the user to confirm or adjust a damage roll
#[async_trait]
pub trait DamageHudPort: Send + Sync {
    async fn confirm(&self, request: DamageHudRequest) -> HudDecision;
}
