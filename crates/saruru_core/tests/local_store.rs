use chrono::{Duration, TimeZone, Utc};
use saruru_core::{
    Clock, FileKeyValueStore, GoalStore, KeyValueStore, LocalGoalStore, ManualClock,
    MemoryKeyValueStore, StoreError, StoreResult, GOALS_KEY,
};

fn clock() -> ManualClock {
    ManualClock::new(Utc.with_ymd_and_hms(2026, 6, 1, 9, 0, 0).unwrap())
}

#[test]
fn whitespace_only_create_leaves_list_and_blob_untouched() {
    let kv = MemoryKeyValueStore::new();
    let mut store = LocalGoalStore::open_with_clock(kv.clone(), clock()).unwrap();

    assert_eq!(store.create("   \t").unwrap(), None);
    assert!(store.list().unwrap().is_empty());
    assert_eq!(kv.get(GOALS_KEY).unwrap(), None);
}

#[test]
fn create_then_edit_records_previous_text() {
    let clock = clock();
    let mut store = LocalGoalStore::open_with_clock(MemoryKeyValueStore::new(), clock.clone())
        .unwrap();

    let goal = store.create("Run 5k").unwrap().unwrap();
    assert_eq!(goal.text, "Run 5k");
    assert!(goal.edit_history.is_empty());

    clock.advance(Duration::minutes(3));
    let updated = store.update(goal.id, "Run 10k").unwrap().unwrap();
    assert_eq!(updated.text, "Run 10k");
    assert_eq!(updated.edit_history.len(), 1);
    assert_eq!(updated.edit_history[0].previous_text, "Run 5k");
    assert_eq!(updated.edit_history[0].edited_at, clock.now());
    assert_eq!(store.get(goal.id).unwrap(), Some(updated));
}

#[test]
fn update_unknown_id_is_a_no_op() {
    let mut store = LocalGoalStore::open_with_clock(MemoryKeyValueStore::new(), clock()).unwrap();
    let goal = store.create("Stretch daily").unwrap().unwrap();

    assert_eq!(store.update(goal.id + 1, "other").unwrap(), None);
    assert_eq!(store.get(goal.id).unwrap(), Some(goal));
}

#[test]
fn blank_edits_are_applied_and_survive_reopen() {
    let kv = MemoryKeyValueStore::new();
    let mut store = LocalGoalStore::open_with_clock(kv.clone(), clock()).unwrap();
    let goal = store.create("Stretch daily").unwrap().unwrap();

    let spaced = store.update(goal.id, "  ").unwrap().unwrap();
    assert_eq!(spaced.text, "  ");
    let emptied = store.update(goal.id, "").unwrap().unwrap();
    assert_eq!(emptied.text, "");
    let previous: Vec<_> = emptied
        .edit_history
        .iter()
        .map(|entry| entry.previous_text.as_str())
        .collect();
    assert_eq!(previous, vec!["Stretch daily", "  "]);

    let reopened = LocalGoalStore::open_with_clock(kv, clock()).unwrap();
    assert_eq!(reopened.get(goal.id).unwrap(), Some(emptied));
}

#[test]
fn edits_after_a_backwards_clock_step_still_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let clock = clock();
    let mut store =
        LocalGoalStore::open_with_clock(FileKeyValueStore::new(dir.path()), clock.clone())
            .unwrap();
    let goal = store.create("Run 5k").unwrap().unwrap();

    clock.advance(Duration::minutes(-30));
    let updated = store.update(goal.id, "Run 10k").unwrap().unwrap();
    assert!(updated.edit_history[0].edited_at < updated.created_at);
    drop(store);

    let reopened =
        LocalGoalStore::open_with_clock(FileKeyValueStore::new(dir.path()), clock).unwrap();
    assert_eq!(reopened.list().unwrap(), vec![updated]);
}

#[test]
fn delete_removes_goal_and_is_idempotent() {
    let mut store = LocalGoalStore::open_with_clock(MemoryKeyValueStore::new(), clock()).unwrap();
    let keep = store.create("keep").unwrap().unwrap();
    let drop = store.create("drop").unwrap().unwrap();
    store.update(drop.id, "drop v2").unwrap();

    store.delete(drop.id).unwrap();
    store.delete(drop.id).unwrap();

    let ids: Vec<_> = store.list().unwrap().iter().map(|goal| goal.id).collect();
    assert_eq!(ids, vec![keep.id]);
    assert_eq!(store.get(drop.id).unwrap(), None);
}

#[test]
fn list_is_newest_first_while_blob_keeps_insertion_order() {
    let clock = clock();
    let kv = MemoryKeyValueStore::new();
    let mut store = LocalGoalStore::open_with_clock(kv.clone(), clock.clone()).unwrap();

    let first = store.create("first").unwrap().unwrap();
    clock.advance(Duration::seconds(1));
    let second = store.create("second").unwrap().unwrap();
    // Same instant: ids still increase and break the tie.
    let third = store.create("third").unwrap().unwrap();

    let listed: Vec<_> = store.list().unwrap().iter().map(|goal| goal.id).collect();
    assert_eq!(listed, vec![third.id, second.id, first.id]);

    let stored: Vec<_> = store
        .goals_in_insertion_order()
        .iter()
        .map(|goal| goal.id)
        .collect();
    assert_eq!(stored, vec![first.id, second.id, third.id]);

    let blob = kv.get(GOALS_KEY).unwrap().unwrap();
    let raw: serde_json::Value = serde_json::from_str(&blob).unwrap();
    assert_eq!(raw[0]["text"], "first");
    assert_eq!(raw[2]["text"], "third");
}

#[test]
fn goals_survive_a_simulated_restart() {
    let dir = tempfile::tempdir().unwrap();
    let clock = clock();

    let created = {
        let mut store =
            LocalGoalStore::open_with_clock(FileKeyValueStore::new(dir.path()), clock.clone())
                .unwrap();
        let goal = store.create("Run 5k").unwrap().unwrap();
        clock.advance(Duration::days(1));
        store.update(goal.id, "Run 10k").unwrap().unwrap()
    };

    let reopened =
        LocalGoalStore::open_with_clock(FileKeyValueStore::new(dir.path()), clock.clone()).unwrap();
    assert_eq!(reopened.list().unwrap(), vec![created.clone()]);
    assert!(dir.path().join(format!("{GOALS_KEY}.json")).is_file());

    // Ids issued after a restart never collide with stored ones.
    let mut reopened = reopened;
    clock.set(Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap());
    let later = reopened.create("Swim").unwrap().unwrap();
    assert!(later.id > created.id);
}

#[test]
fn malformed_or_duplicate_blobs_are_rejected_at_open() {
    let kv = MemoryKeyValueStore::new();
    kv.set(GOALS_KEY, "{not json").unwrap();
    assert!(matches!(
        LocalGoalStore::open(kv.clone()),
        Err(StoreError::InvalidData(_))
    ));

    kv.set(
        GOALS_KEY,
        r#"[{"id":1,"text":"a","createdAt":"2026-01-01T00:00:00Z","editHistory":[]},
            {"id":1,"text":"b","createdAt":"2026-01-01T00:00:00Z","editHistory":[]}]"#,
    )
    .unwrap();
    let err = LocalGoalStore::open(kv).err().unwrap();
    assert!(err.to_string().contains("duplicate goal id 1"));
}

/// Key-value store whose writes can be switched off.
#[derive(Clone, Default)]
struct FlakyKv {
    inner: MemoryKeyValueStore,
    fail_writes: std::rc::Rc<std::cell::Cell<bool>>,
}

impl KeyValueStore for FlakyKv {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        self.inner.get(key)
    }

    fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        if self.fail_writes.get() {
            return Err(std::io::Error::new(std::io::ErrorKind::Other, "quota exceeded").into());
        }
        self.inner.set(key, value)
    }
}

#[test]
fn failed_blob_write_leaves_memory_state_unchanged() {
    let kv = FlakyKv::default();
    let mut store = LocalGoalStore::open_with_clock(kv.clone(), clock()).unwrap();
    let goal = store.create("Run 5k").unwrap().unwrap();
    let before = store.list().unwrap();

    kv.fail_writes.set(true);
    assert!(matches!(store.create("more"), Err(StoreError::Io(_))));
    assert!(matches!(store.update(goal.id, "Run 10k"), Err(StoreError::Io(_))));
    assert!(matches!(store.delete(goal.id), Err(StoreError::Io(_))));

    assert_eq!(store.list().unwrap(), before);
}
