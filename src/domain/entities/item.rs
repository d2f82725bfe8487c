//! Item entity - weapons and other equipment an action can originate from

use serde::{Deserialize, Serialize};

use crate::domain::value_objects::{Damage, ItemId, Tag};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    pub name: String,
    pub kind: ItemKind,
}

impl Item {
    pub fn new(name: impl Into<String>, kind: ItemKind) -> Self {
        Self {
            id: ItemId::new(),
            name: name.into(),
            kind,
        }
    }

    pub fn weapon(name: impl Into<String>, source: WeaponSource) -> Self {
        Self::new(name, ItemKind::Weapon(source))
    }

    pub fn as_weapon(&self) -> Option<&WeaponSource> {
        match &self.kind {
            ItemKind::Weapon(source) => Some(source),
            ItemKind::Other(_) => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum ItemKind {
    Weapon(WeaponSource),
    /// Anything that cannot deal damage (frames, systems, talents...)
    Other(String),
}

/// The three shapes of item that can be rolled for damage
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum WeaponSource {
    MechWeapon(MechWeaponProfile),
    NpcFeatureWeapon(NpcFeatureWeapon),
    PilotWeapon(PilotWeapon),
}

/// The currently selected profile of a mech weapon
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MechWeaponProfile {
    pub damage: Vec<Damage>,
    #[serde(default)]
    pub bonus_damage: Vec<Damage>,
    #[serde(default)]
    pub tags: Vec<Tag>,
}

/// An NPC weapon feature with one damage list per tier
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NpcFeatureWeapon {
    pub damage: Vec<Vec<Damage>>,
    /// 1-based tier that replaces the owning NPC's tier
    #[serde(default)]
    pub tier_override: Option<u8>,
    #[serde(default)]
    pub tags: Vec<Tag>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PilotWeapon {
    pub damage: Vec<Damage>,
    #[serde(default)]
    pub tags: Vec<Tag>,
}

/// Canonical damage and tags of a weapon source
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedWeapon {
    pub damage: Vec<Damage>,
    pub bonus_damage: Vec<Damage>,
    pub tags: Vec<Tag>,
}

impl ResolvedWeapon {
    pub fn is_ap(&self) -> bool {
        self.tags.iter().any(Tag::is_ap)
    }

    pub fn is_overkill(&self) -> bool {
        self.tags.iter().any(Tag::is_overkill)
    }

    pub fn reliable_tag(&self) -> Option<&Tag> {
        self.tags.iter().find(|t| t.is_reliable())
    }
}

impl WeaponSource {
    /// Resolve the damage list and tags, using `actor_tier` for NPC features
    pub fn resolve(&self, actor_tier: Option<u8>) -> ResolvedWeapon {
        match self {
            Self::MechWeapon(profile) => ResolvedWeapon {
                damage: profile.damage.clone(),
                bonus_damage: profile.bonus_damage.clone(),
                tags: profile.tags.clone(),
            },
            Self::NpcFeatureWeapon(feature) => {
                let damage = feature
                    .tier_override
                    .or(actor_tier)
                    .and_then(|tier| usize::from(tier).checked_sub(1))
                    .and_then(|index| feature.damage.get(index))
                    .cloned()
                    .unwrap_or_default();
                ResolvedWeapon {
                    damage,
                    bonus_damage: Vec::new(),
                    tags: feature.tags.clone(),
                }
            }
            Self::PilotWeapon(weapon) => ResolvedWeapon {
                damage: weapon.damage.clone(),
                bonus_damage: Vec::new(),
                tags: weapon.tags.clone(),
            },
        }
    }
}
