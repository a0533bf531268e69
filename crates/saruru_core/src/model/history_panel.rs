//! Expanded-history selection for the dashboard.
//!
//! Pure UI state; never persisted.

use crate::model::goal::GoalId;

/// Tracks which goal, if any, has its history panel open.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HistoryPanel {
    expanded: Option<GoalId>,
}

impl HistoryPanel {
    /// Opens `id`, or collapses it when it is already the open one.
    pub fn toggle(&mut self, id: GoalId) {
        self.expanded = if self.expanded == Some(id) {
            None
        } else {
            Some(id)
        };
    }

    pub fn expanded(&self) -> Option<GoalId> {
        self.expanded
    }

    pub fn is_expanded(&self, id: GoalId) -> bool {
        self.expanded == Some(id)
    }

    pub fn collapse(&mut self) {
        self.expanded = None;
    }

    /// Collapses when the open goal is no longer among `visible`.
    pub fn retain_visible(&mut self, mut visible: impl Iterator<Item = GoalId>) {
        if let Some(open) = self.expanded {
            if !visible.any(|id| id == open) {
                self.expanded = None;
            }
        }
    }
}
