//! Actor entity - combatants that roll and receive damage

use serde::{Deserialize, Serialize};

use super::Item;
use crate::domain::value_objects::{ActorId, AppliedDamage, DamageOptions, DamageType, ItemId};

/// The broad kind of an actor. Only NPCs follow different crit rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActorKind {
    Pilot,
    Mech,
    Npc,
    Deployable,
}

impl Default for ActorKind {
    fn default() -> Self {
        Self::Mech
    }
}

/// A combatant with its tracks and items
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Actor {
    pub id: ActorId,
    pub name: String,
    pub kind: ActorKind,
    /// NPC tier, 1-based
    pub tier: Option<u8>,
    pub stats: CombatStats,
    /// Free-form system document that effects write into
    #[serde(default)]
    pub system: serde_json::Value,
    #[serde(default)]
    pub items: Vec<Item>,
}

impl Actor {
    pub fn new(name: impl Into<String>, kind: ActorKind) -> Self {
        Self {
            id: ActorId::new(),
            name: name.into(),
            kind,
            tier: None,
            stats: CombatStats::default(),
            system: serde_json::Value::Object(Default::default()),
            items: Vec::new(),
        }
    }

    pub fn with_tier(mut self, tier: u8) -> Self {
        self.tier = Some(tier);
        self
    }

    pub fn with_stats(mut self, stats: CombatStats) -> Self {
        self.stats = stats;
        self
    }

    pub fn with_item(mut self, item: Item) -> Self {
        self.items.push(item);
        self
    }

    pub fn is_npc(&self) -> bool {
        self.kind == ActorKind::Npc
    }

    pub fn item(&self, item_id: ItemId) -> Option<&Item> {
        self.items.iter().find(|i| i.id == item_id)
    }

    /// Copy the values a flow reads, detached from this actor
    pub fn snapshot(&self) -> ActorSnapshot {
        ActorSnapshot {
            id: self.id,
            name: self.name.clone(),
            kind: self.kind,
            tier: self.tier,
        }
    }

    /// Apply an aggregated damage vector to this actor's tracks.
    ///
    /// Heat and burn go to their own tracks; every other type is multiplied,
    /// reduced by armor and taken from hp. Overflowing hp costs structure.
    /// Scaled amounts saturate at the width of the tracks.
    pub fn take_damage(&mut self, damage: &AppliedDamage, options: DamageOptions) -> DamageReport {
        let scale = |amount: i64| -> i64 {
            let scaled = (amount as f64 * options.multiple).floor();
            scaled.clamp(0.0, f64::from(i32::MAX)) as i64
        };
        let to_track = |amount: i64| i32::try_from(amount).unwrap_or(i32::MAX);

        let heat = scale(damage.get(DamageType::Heat));
        let burn = scale(damage.get(DamageType::Burn));
        let armor_reducible = damage
            .entries()
            .iter()
            .filter(|(t, _)| t.is_armor_reducible())
            .fold(0i64, |sum, (_, amount)| sum.saturating_add(scale(*amount)));
        let mut hp_damage = (armor_reducible - i64::from(self.stats.armor)).max(0);
        if options.add_burn {
            hp_damage = hp_damage.saturating_add(burn);
        }
        let hp_damage = hp_damage.min(i64::from(i32::MAX));

        self.stats.heat = self.stats.heat.saturating_add(to_track(heat));
        self.stats.burn = self.stats.burn.saturating_add(to_track(burn));

        let mut structure_lost = 0;
        let mut remaining = to_track(hp_damage);
        while remaining > 0 {
            if remaining < self.stats.hp {
                self.stats.hp -= remaining;
                remaining = 0;
            } else {
                remaining -= self.stats.hp;
                if self.stats.structure == 0 {
                    self.stats.hp = 0;
                    break;
                }
                self.stats.structure -= 1;
                structure_lost += 1;
                self.stats.hp = self.stats.max_hp;
                if self.stats.max_hp <= 0 {
                    break;
                }
            }
        }

        DamageReport {
            hp_damage,
            heat,
            burn,
            structure_lost,
        }
    }
}

/// Read-only copy of an actor handed to a flow
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActorSnapshot {
    pub id: ActorId,
    pub name: String,
    pub kind: ActorKind,
    pub tier: Option<u8>,
}

impl ActorSnapshot {
    pub fn is_npc(&self) -> bool {
        self.kind == ActorKind::Npc
    }
}

/// Health and heat tracks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CombatStats {
    pub hp: i32,
    pub max_hp: i32,
    pub structure: u32,
    pub armor: u32,
    pub heat: i32,
    pub burn: i32,
}

impl Default for CombatStats {
    fn default() -> Self {
        Self {
            hp: 10,
            max_hp: 10,
            structure: 4,
            armor: 0,
            heat: 0,
            burn: 0,
        }
    }
}

impl CombatStats {
    pub fn new(max_hp: i32, structure: u32, armor: u32) -> Self {
        Self {
            hp: max_hp,
            max_hp,
            structure,
            armor,
            heat: 0,
            burn: 0,
        }
    }
}

/// What a damage application did to an actor
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DamageReport {
    pub hp_damage: i64,
    pub heat: i64,
    pub burn: i64,
    pub structure_lost: u32,
}
