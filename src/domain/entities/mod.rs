//! Domain entities - Core business objects with identity

mod actor;
mod chat_message;
mod item;

pub use actor::{Actor, ActorKind, ActorSnapshot, CombatStats, DamageReport};
pub use chat_message::{ChatFlags, ChatMessage, DamageFlag};
pub use item::{
    Item, ItemKind, MechWeaponProfile, NpcFeatureWeapon, PilotWeapon, ResolvedWeapon,
    WeaponSource,
};
