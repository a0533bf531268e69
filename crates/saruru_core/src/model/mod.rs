//! Domain model for goals and dashboard UI state.
//!
//! # Responsibility
//! - Define canonical data structures used by stores and the dashboard.
//! - Keep identifier and time sources injectable for deterministic tests.
//!
//! # Invariants
//! - Every goal is identified by a unique, strictly positive `GoalId`.
//! - Deletion is a hard delete; nothing records removed goals.

pub mod clock;
pub mod goal;
pub mod history_panel;
