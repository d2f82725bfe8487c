//! Application configuration
//!
//! Layered with the `config` crate: built-in defaults, then an optional
//! `combat.toml` (or any format `config` understands), then `COMBAT_*`
//! environment variables.

use anyhow::{Context, Result};
use config::{builder::DefaultState, Config, ConfigBuilder, Environment, File};
use serde::Deserialize;

use crate::application::services::DamageFlowSettings;

/// Where rendered chat cards are kept
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatBackend {
    Memory,
    Sqlite,
}

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// HTTP server port
    pub server_port: u16,
    pub chat_backend: ChatBackend,
    /// Used when `chat_backend` is `sqlite`
    pub sqlite_url: String,
    /// Template the damage card is rendered with
    pub damage_card_template: String,
    /// Face overkill dice explode on; the die's maximum face when unset
    #[serde(default)]
    pub overkill_explode_face: Option<u32>,
    /// Fixed seed for reproducible dice
    #[serde(default)]
    pub dice_seed: Option<u64>,
}

impl AppConfig {
    /// Load configuration from defaults, `combat.*` and the environment
    pub fn load() -> Result<Self> {
        Self::defaults()?
            .add_source(File::with_name("combat").required(false))
            .add_source(Environment::with_prefix("COMBAT").try_parsing(true))
            .build()
            .context("Failed to read configuration")?
            .try_deserialize()
            .context("Invalid configuration")
    }

    fn defaults() -> Result<ConfigBuilder<DefaultState>> {
        Ok(Config::builder()
            .set_default("server_port", 3000)?
            .set_default("chat_backend", "memory")?
            .set_default("sqlite_url", "sqlite://combat.db?mode=rwc")?
            .set_default("damage_card_template", "templates/chat/damage-card.hbs")?)
    }

    pub fn damage_flow_settings(&self) -> DamageFlowSettings {
        DamageFlowSettings {
            card_template: self.damage_card_template.clone(),
            overkill_explode_face: self.overkill_explode_face,
        }
    }
}
