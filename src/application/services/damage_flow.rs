//! Damage Roll Flow - steps that resolve, roll and print damage for an attack
//!
//! The flow runs over a [`DamageRollData`] record:
//! initDamageData -> setDamageTags -> setDamageTargets -> showDamageHUD ->
//! rollDamages -> applyOverkillHeat -> printDamageCard.
//! The final step persists a chat card carrying the per-target damage ledger.

use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info};

use crate::application::dto::DamageRollData;
use crate::application::flow::{FlowBuilder, FlowError, FlowState, Step, StepRegistry};
use crate::application::ports::outbound::{
    ChatLogPort, DamageHudPort, DamageHudRequest, DiceRollerPort, HudDecision, NotificationPort,
};
use crate::domain::dice::{crit_roll, DiceExpression, Roll};
use crate::domain::entities::{ChatFlags, ChatMessage, DamageFlag};
use crate::domain::value_objects::{DamageResult, Target};

const FLOW: &str = "Damage";

/// Step names and the order of a damage roll
pub struct DamageRollFlow;

impl DamageRollFlow {
    pub const NAME: &'static str = FLOW;

    pub const STEPS: [&'static str; 7] = [
        "initDamageData",
        "setDamageTags",
        "setDamageTargets",
        "showDamageHUD",
        "rollDamages",
        "applyOverkillHeat",
        "printDamageCard",
    ];

    /// Builder running the registered damage sub-flow, open to per-flow overrides
    pub fn builder(registry: &StepRegistry<DamageRollData>) -> FlowBuilder<DamageRollData> {
        FlowBuilder::new(Self::NAME, registry).with_steps([Self::NAME])
    }
}

/// Settings the damage steps read
#[derive(Debug, Clone)]
pub struct DamageFlowSettings {
    pub card_template: String,
    /// Face overkill dice explode on; the die's maximum when `None`
    pub overkill_explode_face: Option<u32>,
}

impl Default for DamageFlowSettings {
    fn default() -> Self {
        Self {
            card_template: "templates/chat/damage-card.hbs".to_string(),
            overkill_explode_face: None,
        }
    }
}

/// Collaborators shared by the damage steps
#[derive(Clone)]
pub struct DamageFlowDeps {
    pub dice: Arc<dyn DiceRollerPort>,
    pub hud: Arc<dyn DamageHudPort>,
    pub chat: Arc<dyn ChatLogPort>,
    pub notifier: Arc<dyn NotificationPort>,
    pub settings: DamageFlowSettings,
}

/// Register every damage step, and the damage sub-flow under [`DamageRollFlow::NAME`]
pub fn register_damage_steps(registry: &mut StepRegistry<DamageRollData>, deps: &DamageFlowDeps) {
    registry.register_flow(DamageRollFlow::NAME, DamageRollFlow::STEPS);
    registry.register_step(
        "initDamageData",
        Arc::new(InitDamageData {
            notifier: Arc::clone(&deps.notifier),
        }),
    );
    registry.register_step(
        "setDamageTags",
        Arc::new(SetDamageTags {
            notifier: Arc::clone(&deps.notifier),
        }),
    );
    registry.register_step("setDamageTargets", Arc::new(SetDamageTargets));
    registry.register_step(
        "showDamageHUD",
        Arc::new(ShowDamageHud {
            hud: Arc::clone(&deps.hud),
        }),
    );
    registry.register_step(
        "rollDamages",
        Arc::new(RollDamages {
            dice: Arc::clone(&deps.dice),
            notifier: Arc::clone(&deps.notifier),
            overkill_explode_face: deps.settings.overkill_explode_face,
        }),
    );
    registry.register_step("applyOverkillHeat", Arc::new(ApplyOverkillHeat));
    registry.register_step(
        "printDamageCard",
        Arc::new(PrintDamageCard::new(
            Arc::clone(&deps.chat),
            deps.settings.card_template.clone(),
        )),
    );
}

/// Fill damage from the item when the caller gave none, then classify hits
pub struct InitDamageData {
    notifier: Arc<dyn NotificationPort>,
}

#[async_trait]
impl Step<DamageRollData> for InitDamageData {
    async fn run(&self, state: &mut FlowState<DamageRollData>) -> Result<bool, FlowError> {
        let (actor, item, data) = state.parts_mut(FLOW)?;

        match item.and_then(|i| i.as_weapon()) {
            Some(source) => {
                let resolved = source.resolve(actor.tier);
                if data.damage.is_empty() {
                    data.damage = resolved.damage;
                }
                if data.bonus_damage.is_empty() {
                    data.bonus_damage = resolved.bonus_damage;
                }
            }
            None if data.damage.is_empty() => {
                let message = match item {
                    Some(item) => format!("Item {} is not a weapon!", item.id),
                    None => "Damage flow is missing damage to roll!".to_string(),
                };
                self.notifier.warn(&message);
                return Ok(false);
            }
            None => {}
        }

        data.has_normal_hit =
            data.hit_results.is_empty() || data.hit_results.iter().any(|h| h.hit && !h.crit);
        data.has_crit_hit = data.hit_results.iter().any(|h| h.crit);

        debug!(
            damage_entries = data.damage.len(),
            has_normal_hit = data.has_normal_hit,
            has_crit_hit = data.has_crit_hit,
            "Damage data initialised"
        );
        Ok(true)
    }
}

/// Merge the weapon's AP, overkill and reliable tags into the roll
pub struct SetDamageTags {
    notifier: Arc<dyn NotificationPort>,
}

#[async_trait]
impl Step<DamageRollData> for SetDamageTags {
    async fn run(&self, state: &mut FlowState<DamageRollData>) -> Result<bool, FlowError> {
        let (actor, item, data) = state.parts_mut(FLOW)?;
        // Ad-hoc damage carries no tags
        let Some(item) = item else {
            return Ok(true);
        };
        let Some(source) = item.as_weapon() else {
            self.notifier.warn(&format!("Item {} is not a weapon!", item.id));
            return Ok(false);
        };

        let resolved = source.resolve(actor.tier);
        data.ap |= resolved.is_ap();
        data.overkill |= resolved.is_overkill();
        if let Some(tag) = resolved.reliable_tag() {
            data.reliable = true;
            if let Some(value) = tag.numeric_value() {
                data.reliable_val = Some(value);
            }
        }
        Ok(true)
    }
}

/// Collect the targets from the hit results when none were supplied
pub struct SetDamageTargets;

#[async_trait]
impl Step<DamageRollData> for SetDamageTargets {
    async fn run(&self, state: &mut FlowState<DamageRollData>) -> Result<bool, FlowError> {
        let (_, _, data) = state.parts_mut(FLOW)?;
        if data.targets.is_empty() {
            data.targets = unique_targets(data.hit_results.iter().map(|h| &h.target));
        }
        debug!(targets = data.targets.len(), "Damage targets set");
        Ok(true)
    }
}

fn unique_targets<'a>(targets: impl Iterator<Item = &'a Target>) -> Vec<Target> {
    let mut seen = HashSet::new();
    let mut unique: Vec<Target> = Vec::new();
    for target in targets {
        let fresh = match target.stable_key() {
            Some(key) => seen.insert(key),
            None => !unique.contains(target),
        };
        if fresh {
            unique.push(target.clone());
        }
    }
    unique
}

/// Let the user confirm or edit the damage before it is rolled
pub struct ShowDamageHud {
    hud: Arc<dyn DamageHudPort>,
}

#[async_trait]
impl Step<DamageRollData> for ShowDamageHud {
    async fn run(&self, state: &mut FlowState<DamageRollData>) -> Result<bool, FlowError> {
        let (_, _, data) = state.parts_mut(FLOW)?;
        if !data.configurable {
            return Ok(true);
        }

        let request = DamageHudRequest {
            title: data.title.clone(),
            damage: data.damage.clone(),
            bonus_damage: data.bonus_damage.clone(),
            target_names: data.targets.iter().map(|t| t.name.clone()).collect(),
            ap: data.ap,
            overkill: data.overkill,
            reliable: data.reliable,
        };
        match self.hud.confirm(request).await {
            HudDecision::Confirmed => Ok(true),
            HudDecision::Edited {
                damage,
                bonus_damage,
            } => {
                debug!(damage_entries = damage.len(), "Damage edited on HUD");
                data.damage = damage;
                data.bonus_damage = bonus_damage;
                Ok(true)
            }
            HudDecision::Cancelled => {
                info!(title = %data.title, "Damage roll cancelled on HUD");
                Ok(false)
            }
        }
    }
}

/// Roll every damage entry, derive crit results and count overkill explosions
pub struct RollDamages {
    dice: Arc<dyn DiceRollerPort>,
    notifier: Arc<dyn NotificationPort>,
    overkill_explode_face: Option<u32>,
}

#[async_trait]
impl Step<DamageRollData> for RollDamages {
    async fn run(&self, state: &mut FlowState<DamageRollData>) -> Result<bool, FlowError> {
        let (actor, _, data) = state.parts_mut(FLOW)?;
        if !data.damage_results.is_empty() || !data.crit_damage_results.is_empty() {
            debug!("Damage already rolled, skipping");
            return Ok(true);
        }

        // Normal damage is rolled even for crit-only attacks; crits are derived from it
        let mut normal = Vec::new();
        if data.has_normal_hit || data.has_crit_hit {
            for damage in data.damage.iter().filter(|d| d.is_rollable()) {
                let expression = match DiceExpression::parse(&damage.val) {
                    Ok(expression) => expression,
                    Err(e) => {
                        self.notifier.warn(&format!("Cannot roll damage {}: {}", damage.val, e));
                        return Ok(false);
                    }
                };
                let expression = if data.overkill {
                    expression.with_overkill(self.overkill_explode_face)
                } else {
                    expression
                };
                let roll = Roll::evaluate(&expression, self.dice.as_ref());
                normal.push(DamageResult::new(roll, damage.damage_type));
            }
        }

        if data.has_crit_hit {
            data.crit_damage_results = if actor.is_npc() {
                // NPCs roll no extra crit dice; bonus crit features hook in here
                normal.clone()
            } else {
                normal
                    .iter()
                    .map(|r| {
                        DamageResult::new(crit_roll(&r.roll, self.dice.as_ref()), r.damage_type)
                    })
                    .collect()
            };
        }
        if data.has_normal_hit {
            data.damage_results = normal;
        }

        if data.overkill {
            let shown = if data.has_crit_hit {
                &data.crit_damage_results
            } else {
                &data.damage_results
            };
            let heat: usize = shown.iter().map(|r| r.roll.exploded_count()).sum();
            data.overkill_heat = Some(heat as u32);
        }

        data.damage_total = data.damage_results.iter().map(DamageResult::total).sum();
        data.crit_total = data.crit_damage_results.iter().map(DamageResult::total).sum();

        info!(
            actor = %actor.name,
            damage_total = data.damage_total,
            crit_total = data.crit_total,
            overkill_heat = ?data.overkill_heat,
            "Damage rolled"
        );
        Ok(true)
    }
}

/// Overkill heat is counted by `rollDamages`; charging it to the actor is left to the caller
pub struct ApplyOverkillHeat;

#[async_trait]
impl Step<DamageRollData> for ApplyOverkillHeat {
    async fn run(&self, state: &mut FlowState<DamageRollData>) -> Result<bool, FlowError> {
        let (actor, _, data) = state.parts_mut(FLOW)?;
        if let Some(heat) = data.overkill_heat.filter(|h| *h > 0) {
            debug!(actor = %actor.id, heat, "Overkill heat pending");
        }
        Ok(true)
    }
}

/// Persist the damage card and its ledger
pub struct PrintDamageCard {
    chat: Arc<dyn ChatLogPort>,
    template: String,
}

impl PrintDamageCard {
    pub fn new(chat: Arc<dyn ChatLogPort>, template: impl Into<String>) -> Self {
        Self {
            chat,
            template: template.into(),
        }
    }
}

#[async_trait]
impl Step<DamageRollData> for PrintDamageCard {
    async fn run(&self, state: &mut FlowState<DamageRollData>) -> Result<bool, FlowError> {
        let (actor, _, data) = state.parts_mut(FLOW)?;
        if let Some(id) = data.chat_message_id {
            debug!(message_id = %id, "Damage card already printed");
            return Ok(true);
        }

        let targets_applied: BTreeMap<String, bool> = data
            .targets
            .iter()
            .filter_map(Target::stable_key)
            .map(|key| (key, false))
            .collect();
        let crit_targets: BTreeSet<String> = data
            .hit_results
            .iter()
            .filter(|h| h.crit)
            .filter_map(|h| h.target.stable_key())
            .collect();
        let flag = DamageFlag {
            damage_results: data.damage_results.clone(),
            crit_damage_results: data.crit_damage_results.clone(),
            ap: false,
            paracausal: false,
            targets_applied,
            crit_targets,
        };

        let content = serde_json::to_value(&*data)
            .map_err(|e| FlowError::step_failed("printDamageCard", e))?;
        let message = ChatMessage::new(
            actor.id,
            self.template.clone(),
            content,
            ChatFlags {
                damage_data: Some(flag),
            },
        );
        let id = self
            .chat
            .create(message)
            .await
            .map_err(|e| FlowError::step_failed("printDamageCard", e))?;

        data.chat_message_id = Some(id);
        info!(message_id = %id, actor = %actor.name, "Damage card printed");
        Ok(true)
    }
}
