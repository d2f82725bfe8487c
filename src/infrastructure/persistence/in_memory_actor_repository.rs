use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

use crate::application::ports::outbound::{
    ActorRepositoryError, ActorRepositoryPort, DamageSinkError, DamageSinkPort, SystemUpdate,
};
use crate::domain::entities::{Actor, ActorSnapshot, DamageReport};
use crate::domain::value_objects::{ActorId, AppliedDamage, DamageOptions, TokenId};

#[derive(Default)]
struct Store {
    actors: HashMap<ActorId, Actor>,
    tokens: HashMap<TokenId, ActorId>,
}

/// Actors and their placed tokens, held in process memory
///
/// Every read hands out a copy; damage and system edits are applied under the write lock.
#[derive(Default)]
pub struct InMemoryActorRepository {
    store: RwLock<Store>,
}

impl InMemoryActorRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ActorRepositoryPort for InMemoryActorRepository {
    async fn save_actor(&self, actor: Actor) -> Result<(), ActorRepositoryError> {
        debug!(actor_id = %actor.id, name = %actor.name, "Saving actor");
        self.store.write().await.actors.insert(actor.id, actor);
        Ok(())
    }

    async fn get_actor(&self, id: ActorId) -> Result<Option<Actor>, ActorRepositoryError> {
        Ok(self.store.read().await.actors.get(&id).cloned())
    }

    async fn update_system<'a>(
        &'a self,
        id: ActorId,
        update: SystemUpdate<'a>,
    ) -> Result<Actor, ActorRepositoryError> {
        let mut store = self.store.write().await;
        let actor = store
            .actors
            .get_mut(&id)
            .ok_or(ActorRepositoryError::ActorNotFound(id))?;
        update(&mut actor.system);
        Ok(actor.clone())
    }

    async fn place_token(&self, actor_id: ActorId) -> Result<TokenId, ActorRepositoryError> {
        let mut store = self.store.write().await;
        if !store.actors.contains_key(&actor_id) {
            return Err(ActorRepositoryError::ActorNotFound(actor_id));
        }
        let token_id = TokenId::new();
        store.tokens.insert(token_id, actor_id);
        Ok(token_id)
    }

    async fn resolve_target(
        &self,
        reference: &str,
    ) -> Result<Option<ActorSnapshot>, ActorRepositoryError> {
        let Ok(uuid) = reference.trim().parse::<uuid::Uuid>() else {
            return Ok(None);
        };
        let store = self.store.read().await;
        let actor_id = if store.actors.contains_key(&ActorId::from(uuid)) {
            Some(ActorId::from(uuid))
        } else {
            store.tokens.get(&TokenId::from(uuid)).copied()
        };
        Ok(actor_id
            .and_then(|id| store.actors.get(&id))
            .map(Actor::snapshot))
    }
}

#[async_trait]
impl DamageSinkPort for InMemoryActorRepository {
    async fn apply_damage(
        &self,
        target: ActorId,
        damage: &AppliedDamage,
        options: DamageOptions,
    ) -> Result<DamageReport, DamageSinkError> {
        let mut store = self.store.write().await;
        let actor = store
            .actors
            .get_mut(&target)
            .ok_or(DamageSinkError::TargetNotFound(target))?;
        Ok(actor.take_damage(damage, options))
    }
}
