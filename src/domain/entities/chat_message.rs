//! Chat message entity - a persisted, renderable card and the flags stored with it

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::value_objects::{ActorId, ChatMessageId, DamageResult};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: ChatMessageId,
    pub speaker: ActorId,
    pub template: String,
    pub content: serde_json::Value,
    pub flags: ChatFlags,
    pub created_at: DateTime<Utc>,
}

impl ChatMessage {
    pub fn new(
        speaker: ActorId,
        template: impl Into<String>,
        content: serde_json::Value,
        flags: ChatFlags,
    ) -> Self {
        Self {
            id: ChatMessageId::new(),
            speaker,
            template: template.into(),
            content,
            flags,
            created_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatFlags {
    #[serde(default)]
    pub damage_data: Option<DamageFlag>,
}

/// Damage results printed on a card, with the per-target ledger guarding application
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DamageFlag {
    pub damage_results: Vec<DamageResult>,
    pub crit_damage_results: Vec<DamageResult>,
    // Always false for now; kept so stored cards stay readable once they are wired up
    pub ap: bool,
    pub paracausal: bool,
    /// Target key -> whether damage has been applied to it
    pub targets_applied: BTreeMap<String, bool>,
    /// Targets that were critically hit
    #[serde(default)]
    pub crit_targets: BTreeSet<String>,
}

impl DamageFlag {
    pub fn is_applied(&self, target: &str) -> bool {
        self.targets_applied.get(target).copied().unwrap_or(false)
    }

    pub fn mark_applied(&mut self, target: &str) {
        self.targets_applied.insert(target.to_string(), true);
    }

    /// Results that apply to `target`: crit results for critically hit targets,
    /// normal results otherwise, falling back to whichever bucket is non-empty.
    pub fn results_for(&self, target: &str) -> &[DamageResult] {
        let (preferred, fallback) = if self.crit_targets.contains(target) {
            (&self.crit_damage_results, &self.damage_results)
        } else {
            (&self.damage_results, &self.crit_damage_results)
        };
        if preferred.is_empty() {
            fallback
        } else {
            preferred
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::dice::{DiceExpression, Roll};
    use crate::domain::value_objects::DamageType;
    use crate::test_support::ScriptedDiceRoller;

    fn result(expr: &str, faces: Vec<u32>) -> DamageResult {
        let roll = Roll::evaluate(
            &DiceExpression::parse(expr).unwrap(),
            &ScriptedDiceRoller::new(faces),
        );
        DamageResult::new(roll, DamageType::Kinetic)
    }

    #[test]
    fn test_results_for_picks_bucket() {
        let mut flag = DamageFlag {
            damage_results: vec![result("1d6", vec![2])],
            crit_damage_results: vec![result("2d6kh1", vec![2, 5])],
            ..Default::default()
        };
        flag.crit_targets.insert("crit".to_string());

        assert_eq!(flag.results_for("crit")[0].total(), 5);
        assert_eq!(flag.results_for("normal")[0].total(), 2);

        flag.damage_results.clear();
        assert_eq!(flag.results_for("normal")[0].total(), 5);
    }

    #[test]
    fn test_ledger_marking() {
        let mut flag = DamageFlag::default();
        flag.targets_applied.insert("a".to_string(), false);

        assert!(!flag.is_applied("a"));
        flag.mark_applied("a");
        assert!(flag.is_applied("a"));
        assert!(!flag.is_applied("unknown"));
    }
}
