use async_trait::async_trait;

use crate::domain::entities::{Actor, ActorSnapshot};
use crate::domain::value_objects::{ActorId, TokenId};

#[derive(Debug, thiserror::Error)]
pub enum ActorRepositoryError {
    #[error("Actor not found: {0}")]
    ActorNotFound(ActorId),
}

/// In-place edit of an actor's system document
pub type SystemUpdate<'a> = Box<dyn FnOnce(&mut serde_json::Value) + Send + 'a>;

/// Access to actors and their items, always as detached copies
#[async_trait]
pub trait ActorRepositoryPort: Send + Sync {
    async fn save_actor(&self, actor: Actor) -> Result<(), ActorRepositoryError>;

    async fn get_actor(&self, id: ActorId) -> Result<Option<Actor>, ActorRepositoryError>;

    /// Run `update` against the stored system document and return the updated actor.
    ///
    /// Nothing else on the actor is written, so tracks changed by damage in the
    /// meantime are kept.
    async fn update_system<'a>(
        &'a self,
        id: ActorId,
        update: SystemUpdate<'a>,
    ) -> Result<Actor, ActorRepositoryError>;

    /// Place a token for an actor on the map
    async fn place_token(&self, actor_id: ActorId) -> Result<TokenId, ActorRepositoryError>;

    /// Resolve a target reference (an actor id or a token id) to the actor behind it
    async fn resolve_target(
        &self,
        reference: &str,
    ) -> Result<Option<ActorSnapshot>, ActorRepositoryError>;
}
