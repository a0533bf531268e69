//! Core domain logic for the Saruru goal board.
//! This crate is the single source of truth for goal and history invariants.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use config::{AppConfig, BackendKind, ConfigError, ConfigOverrides};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::clock::{Clock, GoalIdAllocator, ManualClock, SystemClock};
pub use model::goal::{Goal, GoalId, GoalValidationError, HistoryEntry};
pub use model::history_panel::HistoryPanel;
pub use repo::goal_store::{GoalStore, StoreError, StoreResult};
pub use repo::kv_store::{FileKeyValueStore, KeyValueStore, MemoryKeyValueStore};
pub use repo::local_store::{LocalGoalStore, GOALS_KEY};
pub use repo::sqlite_store::SqliteGoalStore;
pub use service::dashboard::{Dashboard, DashboardAction, EditSession, Notification};

/// Minimal health-check API for CLI wiring.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
