//! Damage value objects - typed damage expressions and aggregated damage vectors

use serde::{Deserialize, Serialize};

use crate::domain::dice::Roll;

/// The kinds of damage a weapon or effect can deal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum DamageType {
    Kinetic,
    Energy,
    Explosive,
    Heat,
    Burn,
    Variable,
}

impl DamageType {
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Kinetic => "Kinetic",
            Self::Energy => "Energy",
            Self::Explosive => "Explosive",
            Self::Heat => "Heat",
            Self::Burn => "Burn",
            Self::Variable => "Variable",
        }
    }

    /// Whether armor reduces this damage type
    pub fn is_armor_reducible(&self) -> bool {
        !matches!(self, Self::Heat | Self::Burn)
    }
}

impl std::fmt::Display for DamageType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.display_name())
    }
}

/// One typed damage entry, where `val` is a dice expression such as `1d6+2`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Damage {
    #[serde(rename = "type")]
    pub damage_type: DamageType,
    pub val: String,
}

impl Damage {
    pub fn new(damage_type: DamageType, val: impl Into<String>) -> Self {
        Self {
            damage_type,
            val: val.into(),
        }
    }

    /// Empty or literal-zero expressions never produce a roll
    pub fn is_rollable(&self) -> bool {
        let val = self.val.trim();
        !val.is_empty() && val != "0"
    }
}

/// One evaluated damage expression tied to its damage type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DamageResult {
    pub roll: Roll,
    pub tooltip: String,
    pub damage_type: DamageType,
}

impl DamageResult {
    pub fn new(roll: Roll, damage_type: DamageType) -> Self {
        Self {
            tooltip: roll.tooltip(),
            roll,
            damage_type,
        }
    }

    pub fn total(&self) -> i64 {
        self.roll.total()
    }
}

/// Evaluated damage amounts aggregated per damage type
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppliedDamage {
    entries: Vec<(DamageType, i64)>,
}

impl AppliedDamage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an amount, merging it into an existing entry of the same type
    pub fn add(&mut self, damage_type: DamageType, amount: i64) {
        match self.entries.iter_mut().find(|(t, _)| *t == damage_type) {
            Some((_, existing)) => *existing = existing.saturating_add(amount),
            None => self.entries.push((damage_type, amount)),
        }
    }

    pub fn get(&self, damage_type: DamageType) -> i64 {
        self.entries
            .iter()
            .find(|(t, _)| *t == damage_type)
            .map(|(_, amount)| *amount)
            .unwrap_or(0)
    }

    pub fn entries(&self) -> &[(DamageType, i64)] {
        &self.entries
    }

    pub fn total(&self) -> i64 {
        self.entries
            .iter()
            .fold(0i64, |sum, (_, amount)| sum.saturating_add(*amount))
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Aggregate stored results by their totals, without re-rolling
    pub fn from_results(results: &[DamageResult]) -> Self {
        results
            .iter()
            .map(|r| (r.damage_type, r.total()))
            .collect()
    }
}

impl FromIterator<(DamageType, i64)> for AppliedDamage {
    fn from_iter<I: IntoIterator<Item = (DamageType, i64)>>(iter: I) -> Self {
        let mut damage = Self::new();
        for (damage_type, amount) in iter {
            damage.add(damage_type, amount);
        }
        damage
    }
}

/// Options passed to a damage application routine
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DamageOptions {
    pub multiple: f64,
    pub add_burn: bool,
}

impl Default for DamageOptions {
    fn default() -> Self {
        Self {
            multiple: 1.0,
            add_burn: false,
        }
    }
}
