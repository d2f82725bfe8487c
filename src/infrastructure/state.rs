//! Shared application state

use std::sync::Arc;

use anyhow::{Context, Result};
use sqlx::sqlite::SqlitePoolOptions;
use tracing::info;

use crate::application::flow::StepRegistry;
use crate::application::ports::outbound::{
    ActorRepositoryPort, ChatLogPort, DamageHudPort, DamageSinkPort, DiceRollerPort,
    NotificationPort,
};
use crate::application::services::{
    register_damage_steps, ActorServiceImpl, DamageApplicationServiceImpl, DamageFlowDeps,
    DamageRollServiceImpl, JsonEffectService,
};
use crate::infrastructure::config::{AppConfig, ChatBackend};
use crate::infrastructure::dice::RandDiceRoller;
use crate::infrastructure::hud::AutoConfirmHud;
use crate::infrastructure::notifications::TracingNotifier;
use crate::infrastructure::persistence::{InMemoryActorRepository, InMemoryChatLog, SqliteChatLog};

/// Adapters the services are wired from
pub struct Adapters {
    pub actors: Arc<InMemoryActorRepository>,
    pub chat: Arc<dyn ChatLogPort>,
    pub dice: Arc<dyn DiceRollerPort>,
    pub hud: Arc<dyn DamageHudPort>,
    pub notifier: Arc<dyn NotificationPort>,
}

/// Shared application state
pub struct AppState {
    pub chat_log: Arc<dyn ChatLogPort>,
    // Application services
    pub actor_service: ActorServiceImpl,
    pub damage_roll_service: DamageRollServiceImpl,
    pub damage_application_service: DamageApplicationServiceImpl,
    pub effect_service: JsonEffectService,
}

impl AppState {
    pub async fn new(config: AppConfig) -> Result<Self> {
        let chat: Arc<dyn ChatLogPort> = match config.chat_backend {
            ChatBackend::Memory => Arc::new(InMemoryChatLog::new()),
            ChatBackend::Sqlite => {
                let pool = SqlitePoolOptions::new()
                    .max_connections(5)
                    .connect(&config.sqlite_url)
                    .await
                    .with_context(|| format!("Failed to open SQLite at {}", config.sqlite_url))?;
                Arc::new(
                    SqliteChatLog::new(pool)
                        .await
                        .context("Failed to prepare chat_messages table")?,
                )
            }
        };
        info!(backend = ?config.chat_backend, "Chat log ready");

        let adapters = Adapters {
            actors: Arc::new(InMemoryActorRepository::new()),
            chat,
            dice: Arc::new(RandDiceRoller::new(config.dice_seed)),
            hud: Arc::new(AutoConfirmHud),
            notifier: Arc::new(TracingNotifier),
        };
        Ok(Self::from_adapters(&config, adapters))
    }

    pub fn from_adapters(config: &AppConfig, adapters: Adapters) -> Self {
        let actors: Arc<dyn ActorRepositoryPort> = adapters.actors.clone();
        let sink: Arc<dyn DamageSinkPort> = adapters.actors;

        let deps = DamageFlowDeps {
            dice: adapters.dice,
            hud: adapters.hud,
            chat: Arc::clone(&adapters.chat),
            notifier: Arc::clone(&adapters.notifier),
            settings: config.damage_flow_settings(),
        };
        let mut steps = StepRegistry::new();
        register_damage_steps(&mut steps, &deps);

        Self {
            actor_service: ActorServiceImpl::new(Arc::clone(&actors)),
            damage_roll_service: DamageRollServiceImpl::new(
                Arc::clone(&actors),
                Arc::clone(&adapters.chat),
                steps,
            ),
            damage_application_service: DamageApplicationServiceImpl::new(
                Arc::clone(&adapters.chat),
                Arc::clone(&actors),
                sink,
                adapters.notifier,
            ),
            effect_service: JsonEffectService::new(actors),
            chat_log: adapters.chat,
        }
    }
}
