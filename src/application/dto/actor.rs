use serde::{Deserialize, Serialize};

use crate::domain::effects::EffectChange;
use crate::domain::entities::{Actor, ActorKind, CombatStats, DamageReport, Item};
use crate::domain::value_objects::TokenId;

/// Request to create an actor
#[derive(Debug, Deserialize)]
pub struct CreateActorRequestDto {
    pub name: String,
    #[serde(default)]
    pub kind: ActorKind,
    #[serde(default)]
    pub tier: Option<u8>,
    #[serde(default)]
    pub stats: Option<CombatStats>,
    #[serde(default)]
    pub items: Vec<Item>,
}

impl From<CreateActorRequestDto> for Actor {
    fn from(dto: CreateActorRequestDto) -> Self {
        let mut actor = Actor::new(dto.name, dto.kind);
        if let Some(tier) = dto.tier {
            actor = actor.with_tier(tier);
        }
        if let Some(stats) = dto.stats {
            actor = actor.with_stats(stats);
        }
        for item in dto.items {
            actor = actor.with_item(item);
        }
        actor
    }
}

/// Request to apply JSON effect changes to an actor's system document
#[derive(Debug, Deserialize)]
pub struct ApplyEffectsRequestDto {
    pub changes: Vec<EffectChange>,
}

#[derive(Debug, Serialize)]
pub struct PlaceTokenResponseDto {
    pub token_id: TokenId,
}

/// Request sent by the apply-damage button of a damage card
#[derive(Debug, Default, Deserialize)]
pub struct ApplyDamageRequestDto {
    #[serde(default)]
    pub target: Option<String>,
    /// Multiplier as typed into the card, either a number or text
    #[serde(default)]
    pub multiple: Option<MultiplierInput>,
}

/// A damage multiplier as sent by a client. Validation happens in the service,
/// so every shape is accepted here and handed over as text.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum MultiplierInput {
    Number(serde_json::Number),
    Text(String),
    Other(serde_json::Value),
}

impl MultiplierInput {
    pub fn into_raw(self) -> String {
        match self {
            Self::Number(n) => n.to_string(),
            Self::Text(text) => text,
            Self::Other(value) => value.to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ApplyDamageResponseDto {
    pub target: String,
    pub report: DamageReport,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn multiple(body: &str) -> Option<String> {
        serde_json::from_str::<ApplyDamageRequestDto>(body)
            .unwrap()
            .multiple
            .map(MultiplierInput::into_raw)
    }

    #[test]
    fn test_multiplier_accepts_numbers_and_text() {
        assert_eq!(multiple(r#"{"multiple": 2}"#).as_deref(), Some("2"));
        assert_eq!(multiple(r#"{"multiple": 0.5}"#).as_deref(), Some("0.5"));
        assert_eq!(multiple(r#"{"multiple": "1.5"}"#).as_deref(), Some("1.5"));
        assert_eq!(multiple(r#"{"multiple": true}"#).as_deref(), Some("true"));
        assert_eq!(multiple(r#"{"multiple": null}"#), None);
        assert_eq!(multiple(r#"{"target": "x"}"#), None);
    }
}
