//! Outbound ports - Interfaces that the application requires from external systems

mod actor_port;
mod chat_port;
mod damage_sink_port;
mod hud_port;
mod notification_port;

pub use actor_port::{ActorRepositoryError, ActorRepositoryPort, SystemUpdate};
pub use chat_port::{ChatLogError, ChatLogPort};
pub use damage_sink_port::{DamageSinkError, DamageSinkPort};
pub use hud_port::{DamageHudPort, DamageHudRequest, HudDecision};
pub use notification_port::{NotificationLevel, NotificationPort};

/// Randomness evaluator used for every damage roll
pub use crate::domain::dice::DiceRoller as DiceRollerPort;
