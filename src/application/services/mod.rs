//! Application services - Use case implementations
//!
//! Each service accepts port dependencies and returns domain entities or DTOs.
//! The damage flow steps live beside the services that start them.

pub mod actor_service;
pub mod damage_application_service;
pub mod damage_flow;
pub mod damage_roll_service;
pub mod effect_service;

pub use actor_service::{ActorService, ActorServiceImpl};
pub use damage_application_service::{
    ApplyDamageError, ApplyDamageRequest, DamageApplication, DamageApplicationService,
    DamageApplicationServiceImpl,
};
pub use damage_flow::{register_damage_steps, DamageFlowDeps, DamageFlowSettings, DamageRollFlow};
pub use damage_roll_service::{
    DamageRollError, DamageRollOutcome, DamageRollRequest, DamageRollService, DamageRollServiceImpl,
};
pub use effect_service::{EffectReport, JsonEffectService};
