use async_trait::async_trait;

use crate::domain::entities::DamageReport;
use crate::domain::value_objects::{ActorId, AppliedDamage, DamageOptions};

#[derive(Debug, thiserror::Error)]
pub enum DamageSinkError {
    #[error("Damage target not found: {0}")]
    TargetNotFound(ActorId),
}

/// Mutates a target's health and heat tracks
#[async_trait]
pub trait DamageSinkPort: Send + Sync {
    async fn apply_damage(
        &self,
        target: ActorId,
        damage: &AppliedDamage,
        options: DamageOptions,
    ) -> Result<DamageReport, DamageSinkError>;
}
