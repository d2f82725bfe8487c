//! Actor Service - Application service for combatant management

use anyhow::{Context, Result};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info, instrument};

use crate::application::ports::outbound::ActorRepositoryPort;
use crate::domain::entities::Actor;
use crate::domain::value_objects::{ActorId, TokenId};

/// Actor service trait defining the application use cases
#[async_trait]
pub trait ActorService: Send + Sync {
    /// Store a new actor
    async fn create_actor(&self, actor: Actor) -> Result<Actor>;

    /// Get an actor by ID
    async fn get_actor(&self, id: ActorId) -> Result<Option<Actor>>;

    /// Place a token for an existing actor
    async fn place_token(&self, id: ActorId) -> Result<TokenId>;
}

/// Default implementation of ActorService using port abstractions
#[derive(Clone)]
pub struct ActorServiceImpl {
    repository: Arc<dyn ActorRepositoryPort>,
}

impl ActorServiceImpl {
    pub fn new(repository: Arc<dyn ActorRepositoryPort>) -> Self {
        Self { repository }
    }
}

#[async_trait]
impl ActorService for ActorServiceImpl {
    #[instrument(skip(self, actor), fields(actor_name = %actor.name))]
    async fn create_actor(&self, actor: Actor) -> Result<Actor> {
        self.repository
            .save_actor(actor.clone())
            .await
            .context("Failed to save actor")?;

        info!(actor_id = %actor.id, "Created actor: {}", actor.name);
        Ok(actor)
    }

    #[instrument(skip(self))]
    async fn get_actor(&self, id: ActorId) -> Result<Option<Actor>> {
        debug!(actor_id = %id, "Fetching actor");
        self.repository
            .get_actor(id)
            .await
            .context("Failed to get actor from repository")
    }

    #[instrument(skip(self))]
    async fn place_token(&self, id: ActorId) -> Result<TokenId> {
        let token_id = self
            .repository
            .place_token(id)
            .await
            .with_context(|| format!("Failed to place token for actor {}", id))?;

        info!(actor_id = %id, token_id = %token_id, "Placed token");
        Ok(token_id)
    }
}
