//! Dashboard controller owning goal snapshot and UI state.
//!
//! # Responsibility
//! - Drive user actions (add, edit, delete, history toggle) through a store.
//! - Re-fetch the goal list after every successful mutation.
//! - Turn backend failures into user-visible notifications.
//!
//! # Invariants
//! - A failed action leaves snapshot, edit session and history panel as
//!   they were.
//! - Blank new-goal input never reaches the store and never raises a
//!   notification; edit drafts are saved as they are.
//! - The history panel never points at a goal missing from the snapshot.

use crate::model::goal::{is_blank, Goal, GoalId, HistoryEntry};
use crate::model::history_panel::HistoryPanel;
use crate::repo::goal_store::{GoalStore, StoreError};
use log::{error, info};
use std::fmt::{Display, Formatter};

/// User action a notification refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DashboardAction {
    Load,
    Create,
    Update,
    Delete,
}

impl DashboardAction {
    fn as_str(self) -> &'static str {
        match self {
            Self::Load => "load",
            Self::Create => "create",
            Self::Update => "update",
            Self::Delete => "delete",
        }
    }
}

impl Display for DashboardAction {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Blocking user-facing report of a failed action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub action: DashboardAction,
    pub message: String,
}

impl Display for Notification {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} failed: {}", self.action, self.message)
    }
}

/// In-progress edit of one goal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditSession {
    pub goal_id: GoalId,
    pub draft: String,
}

/// Top-level application state for the goal board.
pub struct Dashboard<S: GoalStore> {
    store: S,
    goals: Vec<Goal>,
    history: HistoryPanel,
    editing: Option<EditSession>,
    notifications: Vec<Notification>,
}

impl<S: GoalStore> Dashboard<S> {
    /// Wraps a store with an empty snapshot; call `load` to populate it.
    pub fn new(store: S) -> Self {
        Self {
            store,
            goals: Vec::new(),
            history: HistoryPanel::default(),
            editing: None,
            notifications: Vec::new(),
        }
    }

    /// Fetches the goal list. Returns `false` when the fetch failed.
    pub fn load(&mut self) -> bool {
        match self.store.list() {
            Ok(goals) => {
                self.goals = goals;
                self.history
                    .retain_visible(self.goals.iter().map(|goal| goal.id));
                true
            }
            Err(err) => {
                self.report(DashboardAction::Load, &err);
                false
            }
        }
    }

    pub fn goals(&self) -> &[Goal] {
        &self.goals
    }

    pub fn goal(&self, id: GoalId) -> Option<&Goal> {
        self.goals.iter().find(|goal| goal.id == id)
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Creates a goal from user input and refreshes the list.
    ///
    /// Returns the new id, or `None` for blank input or a failed create.
    pub fn add_goal(&mut self, text: &str) -> Option<GoalId> {
        if is_blank(text) {
            return None;
        }
        match self.store.create(text) {
            Ok(created) => {
                self.load();
                created.map(|goal| goal.id)
            }
            Err(err) => {
                self.report(DashboardAction::Create, &err);
                None
            }
        }
    }

    /// Opens an edit session seeded with the goal's current text.
    ///
    /// Returns `false` when the goal is not in the snapshot.
    pub fn start_edit(&mut self, id: GoalId) -> bool {
        let Some(goal) = self.goal(id) else {
            return false;
        };
        self.editing = Some(EditSession {
            goal_id: id,
            draft: goal.text.clone(),
        });
        true
    }

    pub fn set_draft(&mut self, text: impl Into<String>) {
        if let Some(session) = self.editing.as_mut() {
            session.draft = text.into();
        }
    }

    pub fn editing(&self) -> Option<&EditSession> {
        self.editing.as_ref()
    }

    /// Persists the draft, even an empty one, and closes the session.
    ///
    /// A goal deleted meanwhile closes the session without changes.
    pub fn save_edit(&mut self) -> Option<Goal> {
        let session = self.editing.as_ref()?;
        let goal_id = session.goal_id;
        let draft = session.draft.clone();

        match self.store.update(goal_id, &draft) {
            Ok(updated) => {
                self.editing = None;
                self.load();
                updated
            }
            Err(err) => {
                self.report(DashboardAction::Update, &err);
                None
            }
        }
    }

    pub fn cancel_edit(&mut self) {
        self.editing = None;
    }

    /// Deletes a goal and refreshes the list.
    ///
    /// Returns `false` only when the store reported a failure.
    pub fn delete_goal(&mut self, id: GoalId) -> bool {
        match self.store.delete(id) {
            Ok(()) => {
                if self
                    .editing
                    .as_ref()
                    .is_some_and(|session| session.goal_id == id)
                {
                    self.editing = None;
                }
                if self.history.is_expanded(id) {
                    self.history.collapse();
                }
                self.load();
                true
            }
            Err(err) => {
                self.report(DashboardAction::Delete, &err);
                false
            }
        }
    }

    /// Toggles the history panel for a goal in the snapshot.
    ///
    /// Returns `false` and leaves the panel alone for unknown ids.
    pub fn toggle_history(&mut self, id: GoalId) -> bool {
        if self.goal(id).is_none() {
            return false;
        }
        self.history.toggle(id);
        true
    }

    pub fn history_panel(&self) -> &HistoryPanel {
        &self.history
    }

    /// History of the expanded goal, oldest edit first.
    pub fn expanded_history(&self) -> Option<&[HistoryEntry]> {
        let id = self.history.expanded()?;
        self.goal(id).map(|goal| goal.edit_history.as_slice())
    }

    pub fn notifications(&self) -> &[Notification] {
        &self.notifications
    }

    /// Drains queued notifications for display.
    pub fn take_notifications(&mut self) -> Vec<Notification> {
        std::mem::take(&mut self.notifications)
    }

    fn report(&mut self, action: DashboardAction, err: &StoreError) {
        error!(
            "event=dashboard_action module=dashboard status=error action={} backend={} error={}",
            action,
            self.store.backend(),
            err
        );
        self.notifications.push(Notification {
            action,
            message: err.to_string(),
        });
        info!(
            "event=notification_queued module=dashboard pending={}",
            self.notifications.len()
        );
    }
}
