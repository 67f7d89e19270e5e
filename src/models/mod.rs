// src/models/mod.rs

//! Domain models for the notifier.
//!
//! This module contains the leaderboard snapshot types and the
//! application configuration.

mod config;
mod leaderboard;

// Re-export all public types
pub use config::{
    Config, ENV_PREFIX, LoggingConfig, PollingConfig, ReportConfig, SECRETS_DIR_ENV, SourceConfig,
    TelegramConfig,
};
pub use leaderboard::{DayStars, Leaderboard, Member, StarInfo, Task};
