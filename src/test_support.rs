//! Fakes and fixtures shared by unit tests

use std::sync::Mutex;

use async_trait::async_trait;

use crate::application::ports::outbound::{
    DamageHudPort, DamageHudRequest, HudDecision, NotificationLevel, NotificationPort,
};
use crate::domain::dice::DiceRoller;
use crate::domain::entities::{
    Actor, ActorKind, CombatStats, Item, MechWeaponProfile, WeaponSource,
};
use crate::domain::value_objects::{Damage, DamageType, Tag};

/// Returns scripted faces in order, starting over when the script runs out
pub struct ScriptedDiceRoller {
    faces: Vec<u32>,
    next: Mutex<usize>,
}

impl ScriptedDiceRoller {
    pub fn new(faces: Vec<u32>) -> Self {
        assert!(!faces.is_empty(), "script needs at least one face");
        Self {
            faces,
            next: Mutex::new(0),
        }
    }
}

impl DiceRoller for ScriptedDiceRoller {
    fn roll_die(&self, _faces: u32) -> u32 {
        let mut next = self.next.lock().unwrap();
        let face = self.faces[*next % self.faces.len()];
        *next += 1;
        face
    }
}

#[derive(Default)]
pub struct RecordingNotifier {
    messages: Mutex<Vec<(NotificationLevel, String)>>,
}

impl RecordingNotifier {
    pub fn messages(&self) -> Vec<(NotificationLevel, String)> {
        self.messages.lock().unwrap().clone()
    }

    pub fn with_level(&self, level: NotificationLevel) -> Vec<String> {
        self.messages()
            .into_iter()
            .filter(|(l, _)| *l == level)
            .map(|(_, m)| m)
            .collect()
    }
}

impl NotificationPort for RecordingNotifier {
    fn notify(&self, level: NotificationLevel, message: &str) {
        self.messages.lock().unwrap().push((level, message.to_string()));
    }
}

/// Answers every HUD prompt with the same decision and keeps the prompts
pub struct ScriptedHud {
    decision: HudDecision,
    requests: Mutex<Vec<DamageHudRequest>>,
}

impl ScriptedHud {
    pub fn new(decision: HudDecision) -> Self {
        Self {
            decision,
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<DamageHudRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl DamageHudPort for ScriptedHud {
    async fn confirm(&self, request: DamageHudRequest) -> HudDecision {
        self.requests.lock().unwrap().push(request);
        self.decision.clone()
    }
}

pub fn kinetic_weapon(expression: &str, tags: Vec<Tag>) -> Item {
    Item::weapon(
        "Assault Rifle",
        WeaponSource::MechWeapon(MechWeaponProfile {
            damage: vec![Damage::new(DamageType::Kinetic, expression)],
            bonus_damage: Vec::new(),
            tags,
        }),
    )
}

pub fn mech(name: &str) -> Actor {
    Actor::new(name, ActorKind::Mech).with_stats(CombatStats::new(10, 4, 0))
}
