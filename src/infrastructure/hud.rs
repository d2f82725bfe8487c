//! Damage HUD for headless use: every roll is confirmed as shown

use async_trait::async_trait;
use tracing::debug;

use crate::application::ports::outbound::{DamageHudPort, DamageHudRequest, HudDecision};

pub struct AutoConfirmHud;

#[async_trait]
impl DamageHudPort for AutoConfirmHud {
    async fn confirm(&self, request: DamageHudRequest) -> HudDecision {
        debug!(
            title = %request.title,
            damage_entries = request.damage.len(),
            targets = request.target_names.len(),
            "Auto-confirming damage HUD"
        );
        HudDecision::Confirmed
    }
}
