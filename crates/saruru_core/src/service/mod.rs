//! Dashboard use-case layer.
//!
//! # Responsibility
//! - Orchestrate store calls into user-action level APIs.
//! - Keep CLI/UI callers decoupled from persistence details.

pub mod dashboard;
