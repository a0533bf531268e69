//! Time sources and goal id allocation.
//!
//! # Invariants
//! - `GoalIdAllocator::next_id` is strictly increasing for one allocator,
//!   even when the clock stalls or moves backwards.

use crate::model::goal::GoalId;
use chrono::{DateTime, Duration, Utc};
use std::sync::{Arc, Mutex};

/// Source of "now" for stores and the dashboard.
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock UTC time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Settable clock for tests and replay.
///
/// Clones share the same instant.
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Arc<Mutex<DateTime<Utc>>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Arc::new(Mutex::new(start)),
        }
    }

    pub fn set(&self, instant: DateTime<Utc>) {
        *lock_or_recover(&self.now) = instant;
    }

    pub fn advance(&self, by: Duration) {
        let mut guard = lock_or_recover(&self.now);
        *guard += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *lock_or_recover(&self.now)
    }
}

impl<C: Clock + ?Sized> Clock for Box<C> {
    fn now(&self) -> DateTime<Utc> {
        (**self).now()
    }
}

fn lock_or_recover<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Hands out time-derived, strictly increasing goal ids.
#[derive(Debug, Clone, Default)]
pub struct GoalIdAllocator {
    last: GoalId,
}

impl GoalIdAllocator {
    /// Starts after `highest_existing` so ids never collide with stored goals.
    pub fn seeded(highest_existing: Option<GoalId>) -> Self {
        Self {
            last: highest_existing.unwrap_or(0).max(0),
        }
    }

    /// Returns `max(now_ms, last + 1)` and remembers it.
    pub fn next_id(&mut self, now: DateTime<Utc>) -> GoalId {
        let candidate = now.timestamp_millis().max(self.last + 1);
        self.last = candidate;
        candidate
    }

    pub fn last_issued(&self) -> GoalId {
        self.last
    }
}

#[cfg(test)]
mod tests {
    use super::{Clock, GoalIdAllocator, ManualClock};
    use chrono::{Duration, TimeZone, Utc};

    #[test]
    fn allocator_uses_epoch_millis_when_ahead() {
        let now = Utc.with_ymd_and_hms(2026, 1, 2, 3, 4, 5).unwrap();
        let mut ids = GoalIdAllocator::default();
        assert_eq!(ids.next_id(now), now.timestamp_millis());
    }

    #[test]
    fn allocator_stays_monotonic_under_frozen_and_backwards_clock() {
        let now = Utc.with_ymd_and_hms(2026, 1, 2, 3, 4, 5).unwrap();
        let mut ids = GoalIdAllocator::default();

        let first = ids.next_id(now);
        let second = ids.next_id(now);
        let third = ids.next_id(now - Duration::seconds(30));

        assert!(first < second);
        assert!(second < third);
        assert_eq!(ids.last_issued(), third);
    }

    #[test]
    fn seeded_allocator_skips_past_existing_ids() {
        let now = Utc.with_ymd_and_hms(2026, 1, 2, 3, 4, 5).unwrap();
        let existing = now.timestamp_millis() + 10_000;
        let mut ids = GoalIdAllocator::seeded(Some(existing));
        assert_eq!(ids.next_id(now), existing + 1);
    }

    #[test]
    fn manual_clock_clones_share_time() {
        let start = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        let clock = ManualClock::new(start);
        let shared = clock.clone();

        clock.advance(Duration::minutes(5));
        assert_eq!(shared.now(), start + Duration::minutes(5));

        shared.set(start);
        assert_eq!(clock.now(), start);
    }
}
