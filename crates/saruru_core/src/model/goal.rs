//! Goal domain model.
//!
//! # Responsibility
//! - Define the canonical goal record and its edit history entries.
//! - Provide the single mutation helper that keeps history append-only.
//!
//! # Invariants
//! - `id` is strictly positive and never reassigned.
//! - `created_at` is set once at construction.
//! - `edit_history` only grows; entry order is edit order.
//! - Timestamps are recorded as the clock reported them and may run
//!   backwards after a clock step; readers must not reject such data.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Integer goal identifier, derived from epoch milliseconds at creation.
pub type GoalId = i64;

/// One superseded text value of a goal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    /// Goal text immediately before the edit.
    pub previous_text: String,
    /// When the edit happened.
    pub edited_at: DateTime<Utc>,
}

/// User-authored goal with its edit history.
///
/// Serialized with camelCase names to match the persisted blob format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Goal {
    pub id: GoalId,
    /// Current text, kept exactly as entered.
    pub text: String,
    pub created_at: DateTime<Utc>,
    /// Records written before history tracking carry no such field.
    #[serde(default)]
    pub edit_history: Vec<HistoryEntry>,
}

/// Validation errors for goal invariants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GoalValidationError {
    NonPositiveId(GoalId),
    BlankText,
}

impl Display for GoalValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NonPositiveId(id) => write!(f, "goal id must be positive, got {id}"),
            Self::BlankText => write!(f, "goal text cannot be blank"),
        }
    }
}

impl Error for GoalValidationError {}

impl Goal {
    /// Creates a goal with an empty history.
    ///
    /// # Errors
    /// - `NonPositiveId` when `id <= 0`.
    /// - `BlankText` when `text` is empty after trimming.
    pub fn new(
        id: GoalId,
        text: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> Result<Self, GoalValidationError> {
        let text = text.into();
        if is_blank(&text) {
            return Err(GoalValidationError::BlankText);
        }
        let goal = Self {
            id,
            text,
            created_at,
            edit_history: Vec::new(),
        };
        goal.validate()?;
        Ok(goal)
    }

    /// Replaces `text` and records the previous value.
    ///
    /// Returns the appended history entry.
    pub fn apply_edit(
        &mut self,
        new_text: impl Into<String>,
        edited_at: DateTime<Utc>,
    ) -> &HistoryEntry {
        let previous_text = std::mem::replace(&mut self.text, new_text.into());
        self.edit_history.push(HistoryEntry {
            previous_text,
            edited_at,
        });
        // Just pushed, so the history cannot be empty here.
        &self.edit_history[self.edit_history.len() - 1]
    }

    /// Checks invariants of a persisted or freshly built record.
    ///
    /// Blank text is accepted: edits may set any value, including "".
    pub fn validate(&self) -> Result<(), GoalValidationError> {
        if self.id <= 0 {
            return Err(GoalValidationError::NonPositiveId(self.id));
        }
        Ok(())
    }

    /// Timestamp of the most recent edit, if the goal was ever edited.
    pub fn last_edited_at(&self) -> Option<DateTime<Utc>> {
        self.edit_history.last().map(|entry| entry.edited_at)
    }

    pub fn edit_count(&self) -> usize {
        self.edit_history.len()
    }
}

/// Returns whether user input carries no visible text.
pub fn is_blank(text: &str) -> bool {
    text.trim().is_empty()
}
