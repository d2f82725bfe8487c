use serde::{Deserialize, Serialize};

use crate::domain::value_objects::{ChatMessageId, Damage, DamageResult, HitResult, Target};

/// Caller-supplied starting values for a damage roll
///
/// Anything left empty is filled in from the rolling item.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DamageRollInput {
    pub title: Option<String>,
    pub configurable: Option<bool>,
    pub ap: bool,
    pub overkill: bool,
    pub reliable: bool,
    pub hit_results: Vec<HitResult>,
    pub damage: Vec<Damage>,
    pub bonus_damage: Vec<Damage>,
    pub targets: Vec<Target>,
}

/// Working data of a damage roll; serialized as the damage card content
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DamageRollData {
    pub title: String,
    /// Whether the user may adjust the roll on the HUD
    pub configurable: bool,
    pub ap: bool,
    pub overkill: bool,
    pub overkill_heat: Option<u32>,
    pub reliable: bool,
    pub reliable_val: Option<i32>,
    pub hit_results: Vec<HitResult>,
    pub has_normal_hit: bool,
    pub has_crit_hit: bool,
    pub damage: Vec<Damage>,
    pub bonus_damage: Vec<Damage>,
    pub damage_results: Vec<DamageResult>,
    pub crit_damage_results: Vec<DamageResult>,
    pub damage_total: i64,
    pub crit_total: i64,
    pub targets: Vec<Target>,
    pub chat_message_id: Option<ChatMessageId>,
}

impl Default for DamageRollData {
    fn default() -> Self {
        Self::from(DamageRollInput::default())
    }
}

impl From<DamageRollInput> for DamageRollData {
    fn from(input: DamageRollInput) -> Self {
        Self {
            title: input.title.unwrap_or_else(|| "Damage Roll".to_string()),
            configurable: input.configurable.unwrap_or(true),
            ap: input.ap,
            overkill: input.overkill,
            overkill_heat: None,
            reliable: input.reliable,
            reliable_val: None,
            hit_results: input.hit_results,
            has_normal_hit: false,
            has_crit_hit: false,
            damage: input.damage,
            bonus_damage: input.bonus_damage,
            damage_results: Vec::new(),
            crit_damage_results: Vec::new(),
            damage_total: 0,
            crit_total: 0,
            targets: input.targets,
            chat_message_id: None,
        }
    }
}

/// Request to roll damage for an actor, optionally from one of its items
#[derive(Debug, Deserialize)]
pub struct DamageRollRequestDto {
    pub actor_id: String,
    #[serde(default)]
    pub item_id: Option<String>,
    /// Chat card template for this roll only
    #[serde(default)]
    pub card_template: Option<String>,
    #[serde(flatten)]
    pub input: DamageRollInput,
}

#[derive(Debug, Serialize)]
pub struct DamageRollResponseDto {
    pub success: bool,
    pub chat_message_id: Option<ChatMessageId>,
    pub completed_steps: Vec<String>,
    pub data: Option<DamageRollData>,
}
