//! Goal store contracts and their two persistence backends.
//!
//! # Responsibility
//! - Define the backend-agnostic `GoalStore` contract.
//! - Keep blob encoding and SQL details out of the dashboard controller.
//!
//! # Invariants
//! - Exactly one backend backs a dashboard at a time.
//! - Both backends list goals newest-created first.

pub mod goal_store;
pub mod kv_store;
pub mod local_store;
pub mod sqlite_store;
