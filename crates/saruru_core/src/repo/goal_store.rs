//! Goal store contract shared by the local and table backends.
//!
//! # Responsibility
//! - Define the four goal operations plus lookup.
//! - Define the error type every backend reports through.
//!
//! # Invariants
//! - Whitespace-only `create` input is a silent no-op (`Ok(None)`).
//! - `update` applies any text, including ""; only unknown ids are no-ops.
//! - A mutation that returns `Err` leaves visible store state unchanged.
//! - `list` orders goals newest-created first, ties broken by id descending.

use crate::db::DbError;
use crate::model::goal::{Goal, GoalId, GoalValidationError};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type StoreResult<T> = Result<T, StoreError>;

/// Backend failure surfaced by goal store operations.
#[derive(Debug)]
pub enum StoreError {
    Validation(GoalValidationError),
    Db(DbError),
    Io(std::io::Error),
    Serialization(serde_json::Error),
    InvalidData(String),
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    MissingRequiredTable(&'static str),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::Io(err) => write!(f, "goal storage i/o failed: {err}"),
            Self::Serialization(err) => write!(f, "goal serialization failed: {err}"),
            Self::InvalidData(message) => write!(f, "invalid persisted goal data: {message}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "goal database not migrated: expected schema {expected_version}, found {actual_version}"
            ),
            Self::MissingRequiredTable(table) => write!(f, "required table `{table}` is missing"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::Io(err) => Some(err),
            Self::Serialization(err) => Some(err),
            Self::InvalidData(_)
            | Self::UninitializedConnection { .. }
            | Self::MissingRequiredTable(_) => None,
        }
    }
}

impl From<GoalValidationError> for StoreError {
    fn from(value: GoalValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for StoreError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

impl From<std::io::Error> for StoreError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(value: serde_json::Error) -> Self {
        Self::Serialization(value)
    }
}

/// Persistence backend for the goal collection.
pub trait GoalStore {
    /// Short backend label used in log events (`local`, `table`).
    fn backend(&self) -> &'static str;
    /// All goals, newest-created first.
    fn list(&self) -> StoreResult<Vec<Goal>>;
    fn get(&self, id: GoalId) -> StoreResult<Option<Goal>>;
    /// Creates a goal; `Ok(None)` when `text` is blank.
    fn create(&mut self, text: &str) -> StoreResult<Option<Goal>>;
    /// Replaces goal text and records the previous value.
    ///
    /// Any `new_text` is applied, even empty. `Ok(None)` when `id` is unknown.
    fn update(&mut self, id: GoalId, new_text: &str) -> StoreResult<Option<Goal>>;
    /// Hard-deletes a goal; absent ids are a no-op.
    fn delete(&mut self, id: GoalId) -> StoreResult<()>;
}

impl<S: GoalStore + ?Sized> GoalStore for Box<S> {
    fn backend(&self) -> &'static str {
        (**self).backend()
    }

    fn list(&self) -> StoreResult<Vec<Goal>> {
        (**self).list()
    }

    fn get(&self, id: GoalId) -> StoreResult<Option<Goal>> {
        (**self).get(id)
    }

    fn create(&mut self, text: &str) -> StoreResult<Option<Goal>> {
        (**self).create(text)
    }

    fn update(&mut self, id: GoalId, new_text: &str) -> StoreResult<Option<Goal>> {
        (**self).update(id, new_text)
    }

    fn delete(&mut self, id: GoalId) -> StoreResult<()> {
        (**self).delete(id)
    }
}

/// Sorts goals newest-created first, ties broken by id descending.
pub fn sort_newest_first(goals: &mut [Goal]) {
    goals.sort_by(|a, b| {
        b.created_at
            .cmp(&a.created_at)
            .then_with(|| b.id.cmp(&a.id))
    });
}
