//! JSON Effect Service - applies set/append JSON effect changes to an actor's system document
//!
//! Parsed effect values are memoised by their raw text.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;
use tokio::sync::RwLock;
use tracing::{debug, instrument, warn};

use crate::application::ports::outbound::{ActorRepositoryError, ActorRepositoryPort};
use crate::domain::effects::{EffectChange, EffectError};
use crate::domain::entities::Actor;
use crate::domain::value_objects::ActorId;

/// How many changes of a batch took effect
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
pub struct EffectReport {
    pub applied: usize,
    pub skipped: usize,
}

pub struct JsonEffectService {
    actors: Arc<dyn ActorRepositoryPort>,
    cache: RwLock<HashMap<String, Value>>,
}

impl JsonEffectService {
    pub fn new(actors: Arc<dyn ActorRepositoryPort>) -> Self {
        Self {
            actors,
            cache: RwLock::new(HashMap::new()),
        }
    }

    /// Apply `changes` in order to the actor's stored system document.
    ///
    /// Values are parsed first; the document is then edited in one step by the
    /// repository. A change that fails to parse or apply is logged and skipped.
    #[instrument(skip(self, changes), fields(changes = changes.len()))]
    pub async fn apply_effects(
        &self,
        actor_id: ActorId,
        changes: &[EffectChange],
    ) -> Result<(Actor, EffectReport), ActorRepositoryError> {
        let mut parsed = Vec::with_capacity(changes.len());
        for change in changes {
            parsed.push((change, self.parse(&change.value).await));
        }

        let mut report = EffectReport::default();
        let actor = self
            .actors
            .update_system(
                actor_id,
                Box::new(|system: &mut Value| {
                    for (change, value) in parsed {
                        match value.and_then(|value| change.apply_value(system, value)) {
                            Ok(()) => report.applied += 1,
                            Err(e) => {
                                warn!(key = %change.key, error = %e, "JSON effect skipped");
                                report.skipped += 1;
                            }
                        }
                    }
                }),
            )
            .await?;

        debug!(applied = report.applied, skipped = report.skipped, "Effects applied");
        Ok((actor, report))
    }

    async fn parse(&self, raw: &str) -> Result<Value, EffectError> {
        if let Some(value) = self.cache.read().await.get(raw) {
            return Ok(value.clone());
        }
        let value: Value =
            serde_json::from_str(raw).map_err(|_| EffectError::Parse(raw.to_string()))?;
        self.cache
            .write()
            .await
            .insert(raw.to_string(), value.clone());
        Ok(value)
    }

    #[cfg(test)]
    async fn cached_values(&self) -> usize {
        self.cache.read().await.len()
    }
}
