//! Local goal store mirrored to a single key-value blob.
//!
//! # Responsibility
//! - Hydrate the goal list from `GOALS_KEY` once at open.
//! - Overwrite the blob with the full goal array on every mutation.
//!
//! # Invariants
//! - The blob keeps insertion order; `list` presents newest-first.
//! - In-memory state changes only after the blob write succeeds.

use crate::model::clock::{Clock, GoalIdAllocator, SystemClock};
use crate::model::goal::{is_blank, Goal, GoalId};
use crate::repo::goal_store::{sort_newest_first, GoalStore, StoreError, StoreResult};
use crate::repo::kv_store::KeyValueStore;
use log::{error, info};

/// Storage key holding the JSON array of all goals.
pub const GOALS_KEY: &str = "saruru-goals";

pub struct LocalGoalStore<K: KeyValueStore, C: Clock = SystemClock> {
    kv: K,
    clock: C,
    goals: Vec<Goal>,
    ids: GoalIdAllocator,
}

impl<K: KeyValueStore> LocalGoalStore<K> {
    pub fn open(kv: K) -> StoreResult<Self> {
        Self::open_with_clock(kv, SystemClock)
    }
}

impl<K: KeyValueStore, C: Clock> LocalGoalStore<K, C> {
    /// Loads persisted goals, treating a missing key as an empty list.
    ///
    /// # Errors
    /// - `InvalidData` when the blob is not a valid goal array, a record
    ///   breaks goal invariants, or two records share an id.
    pub fn open_with_clock(kv: K, clock: C) -> StoreResult<Self> {
        let goals = match kv.get(GOALS_KEY)? {
            Some(raw) => parse_blob(&raw)?,
            None => Vec::new(),
        };
        let ids = GoalIdAllocator::seeded(goals.iter().map(|goal| goal.id).max());
        info!(
            "event=store_open module=store status=ok backend=local goal_count={}",
            goals.len()
        );
        Ok(Self {
            kv,
            clock,
            goals,
            ids,
        })
    }

    /// Goals in persisted (insertion) order.
    pub fn goals_in_insertion_order(&self) -> &[Goal] {
        &self.goals
    }

    /// Writes `candidate` to the blob and adopts it as current state.
    fn commit(&mut self, op: &'static str, candidate: Vec<Goal>) -> StoreResult<()> {
        let encoded = serde_json::to_string(&candidate)?;
        if let Err(err) = self.kv.set(GOALS_KEY, &encoded) {
            error!(
                "event=goal_{op} module=store status=error backend=local error_code=blob_write_failed error={err}"
            );
            return Err(err);
        }
        self.goals = candidate;
        Ok(())
    }

    fn position(&self, id: GoalId) -> Option<usize> {
        self.goals.iter().position(|goal| goal.id == id)
    }
}

impl<K: KeyValueStore, C: Clock> GoalStore for LocalGoalStore<K, C> {
    fn backend(&self) -> &'static str {
        "local"
    }

    fn list(&self) -> StoreResult<Vec<Goal>> {
        let mut goals = self.goals.clone();
        sort_newest_first(&mut goals);
        Ok(goals)
    }

    fn get(&self, id: GoalId) -> StoreResult<Option<Goal>> {
        Ok(self.goals.iter().find(|goal| goal.id == id).cloned())
    }

    fn create(&mut self, text: &str) -> StoreResult<Option<Goal>> {
        if is_blank(text) {
            return Ok(None);
        }

        let now = self.clock.now();
        let goal = Goal::new(self.ids.next_id(now), text, now)?;

        let mut candidate = self.goals.clone();
        candidate.push(goal.clone());
        self.commit("create", candidate)?;

        info!(
            "event=goal_create module=store status=ok backend=local goal_id={}",
            goal.id
        );
        Ok(Some(goal))
    }

    fn update(&mut self, id: GoalId, new_text: &str) -> StoreResult<Option<Goal>> {
        let Some(index) = self.position(id) else {
            return Ok(None);
        };

        let mut candidate = self.goals.clone();
        let edited_at = self.clock.now();
        candidate[index].apply_edit(new_text, edited_at);
        let updated = candidate[index].clone();
        self.commit("update", candidate)?;

        info!(
            "event=goal_update module=store status=ok backend=local goal_id={} history_len={}",
            id,
            updated.edit_count()
        );
        Ok(Some(updated))
    }

    fn delete(&mut self, id: GoalId) -> StoreResult<()> {
        if self.position(id).is_none() {
            return Ok(());
        }

        let candidate = self
            .goals
            .iter()
            .filter(|goal| goal.id != id)
            .cloned()
            .collect();
        self.commit("delete", candidate)?;

        info!("event=goal_delete module=store status=ok backend=local goal_id={id}");
        Ok(())
    }
}

fn parse_blob(raw: &str) -> StoreResult<Vec<Goal>> {
    let goals: Vec<Goal> = serde_json::from_str(raw)
        .map_err(|err| StoreError::InvalidData(format!("malformed `{GOALS_KEY}` blob: {err}")))?;

    let mut seen = std::collections::HashSet::with_capacity(goals.len());
    for goal in &goals {
        goal.validate()
            .map_err(|err| StoreError::InvalidData(format!("goal {}: {err}", goal.id)))?;
        if !seen.insert(goal.id) {
            return Err(StoreError::InvalidData(format!(
                "duplicate goal id {} in `{GOALS_KEY}` blob",
                goal.id
            )));
        }
    }
    Ok(goals)
}
