//! Damage Roll Service - starts damage flows for stored actors and items

use async_trait::async_trait;
use std::sync::Arc;
use tracing::{info, instrument};

use super::damage_flow::{DamageRollFlow, PrintDamageCard};
use crate::application::dto::{DamageRollData, DamageRollInput};
use crate::application::flow::{FlowError, FlowState, StepRegistry};
use crate::application::ports::outbound::{ActorRepositoryError, ActorRepositoryPort, ChatLogPort};
use crate::domain::value_objects::{ActorId, ItemId};

/// A damage roll for a stored actor
#[derive(Debug, Clone, Default)]
pub struct DamageRollRequest {
    pub actor_id: ActorId,
    pub item_id: Option<ItemId>,
    pub input: DamageRollInput,
    /// Chat card template for this roll only
    pub card_template: Option<String>,
}

/// Result of one damage flow run
#[derive(Debug, Clone)]
pub struct DamageRollOutcome {
    /// False when a step halted the flow; no card was printed then
    pub success: bool,
    pub completed_steps: Vec<String>,
    pub data: Option<DamageRollData>,
}

#[derive(Debug, thiserror::Error)]
pub enum DamageRollError {
    #[error("Actor not found: {0}")]
    ActorNotFound(ActorId),
    #[error("Item {item_id} not found on actor {actor_id}")]
    ItemNotFound { actor_id: ActorId, item_id: ItemId },
    #[error("Failed to load actor: {0}")]
    Repository(#[from] ActorRepositoryError),
    #[error("Damage flow failed: {0}")]
    Flow(#[from] FlowError),
}

impl DamageRollError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::ActorNotFound(_) | Self::ItemNotFound { .. })
    }
}

#[async_trait]
pub trait DamageRollService: Send + Sync {
    /// Run the damage flow for an actor, optionally from one of its items
    async fn roll_damage(
        &self,
        request: DamageRollRequest,
    ) -> Result<DamageRollOutcome, DamageRollError>;
}

pub struct DamageRollServiceImpl {
    actors: Arc<dyn ActorRepositoryPort>,
    chat: Arc<dyn ChatLogPort>,
    steps: StepRegistry<DamageRollData>,
}

impl DamageRollServiceImpl {
    pub fn new(
        actors: Arc<dyn ActorRepositoryPort>,
        chat: Arc<dyn ChatLogPort>,
        steps: StepRegistry<DamageRollData>,
    ) -> Self {
        Self {
            actors,
            chat,
            steps,
        }
    }
}

#[async_trait]
impl DamageRollService for DamageRollServiceImpl {
    #[instrument(skip_all, fields(actor_id = %request.actor_id))]
    async fn roll_damage(
        &self,
        request: DamageRollRequest,
    ) -> Result<DamageRollOutcome, DamageRollError> {
        let DamageRollRequest {
            actor_id,
            item_id,
            input,
            card_template,
        } = request;
        let actor = self
            .actors
            .get_actor(actor_id)
            .await?
            .ok_or(DamageRollError::ActorNotFound(actor_id))?;
        let item = match item_id {
            Some(item_id) => Some(
                actor
                    .item(item_id)
                    .cloned()
                    .ok_or(DamageRollError::ItemNotFound { actor_id, item_id })?,
            ),
            None => None,
        };

        let mut builder = DamageRollFlow::builder(&self.steps);
        if let Some(template) = card_template {
            builder = builder.with_override(
                "printDamageCard",
                Arc::new(PrintDamageCard::new(Arc::clone(&self.chat), template)),
            );
        }
        let mut flow = builder.build(FlowState::new(actor.snapshot(), item, input.into()))?;
        let success = flow.begin().await?;
        let completed_steps = flow.completed_steps().to_vec();
        let data = flow.into_state().data;

        info!(actor = %actor.name, success, "Damage roll finished");
        Ok(DamageRollOutcome {
            success,
            completed_steps,
            data,
        })
    }
}
