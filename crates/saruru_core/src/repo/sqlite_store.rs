//! Table-backed goal store over the `goals` SQLite table.
//!
//! # Responsibility
//! - Map goal operations to row insert/update/delete/select.
//! - Keep the JSON `edit_history` column consistent with row text.
//!
//! # Invariants
//! - Connections must be fully migrated before a store is built.
//! - An update reads and rewrites its row inside one IMMEDIATE transaction.
//! - `created_at` is assigned by the database on insert.
//! - Rows that fail to parse or validate are reported, never skipped.

use crate::db::migrations::{current_user_version, latest_version};
use crate::model::clock::{Clock, GoalIdAllocator, SystemClock};
use crate::model::goal::{is_blank, Goal, GoalId, HistoryEntry};
use crate::repo::goal_store::{GoalStore, StoreError, StoreResult};
use chrono::{DateTime, Utc};
use log::info;
use rusqlite::{params, Connection, OptionalExtension, Row, Transaction, TransactionBehavior};

const GOAL_SELECT_SQL: &str = "SELECT
    id,
    text,
    created_at,
    edit_history
FROM goals";

pub struct SqliteGoalStore<'conn, C: Clock = SystemClock> {
    conn: &'conn Connection,
    clock: C,
    ids: GoalIdAllocator,
}

impl<'conn> SqliteGoalStore<'conn> {
    pub fn try_new(conn: &'conn Connection) -> StoreResult<Self> {
        Self::try_new_with_clock(conn, SystemClock)
    }
}

impl<'conn, C: Clock> SqliteGoalStore<'conn, C> {
    /// Builds a store from a migrated connection.
    ///
    /// # Errors
    /// - `UninitializedConnection` when `user_version` is not the latest.
    /// - `MissingRequiredTable` when the `goals` table is absent.
    pub fn try_new_with_clock(conn: &'conn Connection, clock: C) -> StoreResult<Self> {
        ensure_goal_connection_ready(conn)?;
        let highest: Option<GoalId> =
            conn.query_row("SELECT MAX(id) FROM goals;", [], |row| row.get(0))?;
        Ok(Self {
            conn,
            clock,
            ids: GoalIdAllocator::seeded(highest),
        })
    }
}

impl<C: Clock> GoalStore for SqliteGoalStore<'_, C> {
    fn backend(&self) -> &'static str {
        "table"
    }

    fn list(&self) -> StoreResult<Vec<Goal>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{GOAL_SELECT_SQL} ORDER BY created_at DESC, id DESC;"))?;
        let mut rows = stmt.query([])?;
        let mut goals = Vec::new();
        while let Some(row) = rows.next()? {
            goals.push(parse_goal_row(row)?);
        }
        Ok(goals)
    }

    fn get(&self, id: GoalId) -> StoreResult<Option<Goal>> {
        load_goal(self.conn, id)
    }

    fn create(&mut self, text: &str) -> StoreResult<Option<Goal>> {
        if is_blank(text) {
            return Ok(None);
        }

        let now = self.clock.now();
        let goal = Goal::new(self.ids.next_id(now), text, now)?;
        // `created_at` and `edit_history` come from the column defaults.
        self.conn.execute(
            "INSERT INTO goals (id, text) VALUES (?1, ?2);",
            params![goal.id, goal.text.as_str()],
        )?;

        let stored = load_goal(self.conn, goal.id)?.ok_or_else(|| {
            StoreError::InvalidData(format!("goal {} missing after insert", goal.id))
        })?;
        info!(
            "event=goal_create module=store status=ok backend=table goal_id={}",
            stored.id
        );
        Ok(Some(stored))
    }

    fn update(&mut self, id: GoalId, new_text: &str) -> StoreResult<Option<Goal>> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        let Some(mut goal) = load_goal(&tx, id)? else {
            return Ok(None);
        };

        goal.apply_edit(new_text, self.clock.now());
        let history = serde_json::to_string(&goal.edit_history)?;
        tx.execute(
            "UPDATE goals
             SET text = ?2,
                 edit_history = ?3
             WHERE id = ?1;",
            params![id, goal.text.as_str(), history],
        )?;
        tx.commit()?;

        info!(
            "event=goal_update module=store status=ok backend=table goal_id={} history_len={}",
            id,
            goal.edit_count()
        );
        Ok(Some(goal))
    }

    fn delete(&mut self, id: GoalId) -> StoreResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM goals WHERE id = ?1;", [id])?;
        info!(
            "event=goal_delete module=store status=ok backend=table goal_id={} rows={}",
            id, changed
        );
        Ok(())
    }
}

fn load_goal(conn: &Connection, id: GoalId) -> StoreResult<Option<Goal>> {
    let mut stmt = conn.prepare(&format!("{GOAL_SELECT_SQL} WHERE id = ?1;"))?;
    let row = stmt
        .query_row([id], |row| {
            Ok((
                row.get::<_, GoalId>("id")?,
                row.get::<_, String>("text")?,
                row.get::<_, String>("created_at")?,
                row.get::<_, String>("edit_history")?,
            ))
        })
        .optional()?;

    row.map(|(id, text, created_at, history)| build_goal(id, text, &created_at, &history))
        .transpose()
}

fn parse_goal_row(row: &Row<'_>) -> StoreResult<Goal> {
    let created_at: String = row.get("created_at")?;
    let history: String = row.get("edit_history")?;
    build_goal(row.get("id")?, row.get("text")?, &created_at, &history)
}

fn build_goal(
    id: GoalId,
    text: String,
    created_at: &str,
    history: &str,
) -> StoreResult<Goal> {
    let created_at = parse_timestamp(created_at).ok_or_else(|| {
        StoreError::InvalidData(format!(
            "invalid timestamp `{created_at}` in goals.created_at for goal {id}"
        ))
    })?;
    let edit_history: Vec<HistoryEntry> = serde_json::from_str(history).map_err(|err| {
        StoreError::InvalidData(format!("invalid goals.edit_history for goal {id}: {err}"))
    })?;

    let goal = Goal {
        id,
        text,
        created_at,
        edit_history,
    };
    goal.validate()
        .map_err(|err| StoreError::InvalidData(format!("goal {id}: {err}")))?;
    Ok(goal)
}

fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .ok()
        .map(|parsed| parsed.with_timezone(&Utc))
}

fn ensure_goal_connection_ready(conn: &Connection) -> StoreResult<()> {
    let expected_version = latest_version();
    let actual_version = current_user_version(conn)?;
    if actual_version != expected_version {
        return Err(StoreError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = 'goals'
        );",
        [],
        |row| row.get(0),
    )?;
    if exists != 1 {
        return Err(StoreError::MissingRequiredTable("goals"));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::parse_timestamp;
    use chrono::{TimeZone, Utc};

    #[test]
    fn parses_server_default_timestamp_shape() {
        let expected = Utc.with_ymd_and_hms(2026, 7, 4, 12, 30, 0).unwrap();
        assert_eq!(parse_timestamp("2026-07-04T12:30:00.000Z"), Some(expected));
    }

    #[test]
    fn parse_timestamp_rejects_garbage() {
        assert_eq!(parse_timestamp("yesterday"), None);
    }
}
