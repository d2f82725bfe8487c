//! Infrastructure layer - External adapters and implementations
//!
//! This layer contains:
//! - Persistence: in-memory and SQLite stores
//! - HTTP: REST API routes
//! - Dice, HUD and notification adapters
//! - Config: Application configuration
//! - State: Shared application state

pub mod config;
pub mod dice;
pub mod http;
pub mod hud;
pub mod notifications;
pub mod persistence;
pub mod state;
