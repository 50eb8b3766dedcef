//! # Idempotency Store
//!
//! Keyed, time-windowed records that suppress a second automation for the
//! same logical event.
//!
//! ## Record Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │   mark_idempotent(key, window)                                          │
//! │          │                                                              │
//! │          ▼                                                              │
//! │   ┌──────────────┐   is_idempotent(key) → true while now < expires_at   │
//! │   │   RECORDED   │                                                      │
//! │   └──────┬───────┘                                                      │
//! │          │                                                              │
//! │          ├── clear_idempotent(key)   (success / cancel)  ──► gone        │
//! │          └── window elapses          (lazy, or purge)    ──► gone        │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The store is an explicit object owned by the engine; there is no global
//! map. Tests inject a [`ManualClock`](crate::clock::ManualClock).

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;

use crate::clock::Clock;
use crate::trigger::AutomationKind;

/// Deterministic key for one automation on one subject.
///
/// ## Example
/// ```rust
/// use quill_automation::idempotency::automation_key;
/// use quill_automation::trigger::AutomationKind;
///
/// assert_eq!(automation_key(AutomationKind::Quote, "deal-42"), "quote:deal-42");
/// assert_eq!(automation_key(AutomationKind::Quote, " deal-42 "), "quote:deal-42");
/// ```
pub fn automation_key(kind: AutomationKind, subject_id: &str) -> String {
    format!("{}:{}", kind.as_str(), subject_id.trim())
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdempotencyRecord {
    pub key: String,
    pub marked_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl IdempotencyRecord {
    /// Live iff `now` is before the expiry and inside `window` of the mark.
    fn is_live(&self, now: DateTime<Utc>, window: Duration) -> bool {
        now < self.expires_at && now - self.marked_at < window
    }
}

pub trait IdempotencyStore {
    /// True if `key` was marked and has not expired. Expired records are
    /// dropped on the way.
    fn is_idempotent(&mut self, key: &str, window: Duration) -> bool;

    /// Records `key` until `now + window`, replacing any earlier record.
    fn mark_idempotent(&mut self, key: &str, window: Duration);

    /// Removes `key`. Clearing an unknown key is a no-op.
    fn clear_idempotent(&mut self, key: &str);

    /// Drops every record whose expiry has passed and returns how many went.
    /// Stores that expire records on their own can keep the default.
    fn purge_expired(&mut self) -> usize {
        0
    }
}

/// In-process store backed by a `HashMap`.
#[derive(Debug)]
pub struct InMemoryIdempotencyStore<C: Clock> {
    clock: C,
    records: HashMap<String, IdempotencyRecord>,
}

impl<C: Clock> InMemoryIdempotencyStore<C> {
    pub fn new(clock: C) -> Self {
        InMemoryIdempotencyStore {
            clock,
            records: HashMap::new(),
        }
    }

    pub fn record(&self, key: &str) -> Option<&IdempotencyRecord> {
        self.records.get(key)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl<C: Clock> IdempotencyStore for InMemoryIdempotencyStore<C> {
    fn is_idempotent(&mut self, key: &str, window: Duration) -> bool {
        let now = self.clock.now();
        match self.records.get(key) {
            Some(record) if record.is_live(now, window) => true,
            Some(_) => {
                debug!(key, "Idempotency record expired");
                self.records.remove(key);
                false
            }
            None => false,
        }
    }

    fn mark_idempotent(&mut self, key: &str, window: Duration) {
        let now = self.clock.now();
        self.records.insert(
            key.to_string(),
            IdempotencyRecord {
                key: key.to_string(),
                marked_at: now,
                expires_at: now
                    .checked_add_signed(window)
                    .unwrap_or(DateTime::<Utc>::MAX_UTC),
            },
        );
    }

    fn clear_idempotent(&mut self, key: &str) {
        if self.records.remove(key).is_some() {
            debug!(key, "Idempotency record cleared");
        }
    }

    fn purge_expired(&mut self) -> usize {
        let now = self.clock.now();
        let before = self.records.len();
        self.records.retain(|_, record| now < record.expires_at);
        let purged = before - self.records.len();
        if purged > 0 {
            debug!(purged, "Purged expired idempotency records");
        }
        purged
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use chrono::TimeZone;

    fn store() -> (ManualClock, InMemoryIdempotencyStore<ManualClock>) {
        let clock = ManualClock::new(Utc.with_ymd_and_hms(2026, 5, 4, 10, 0, 0).unwrap());
        (clock.clone(), InMemoryIdempotencyStore::new(clock))
    }

    #[test]
    fn test_mark_then_check() {
        let (_, mut store) = store();
        let window = Duration::seconds(30);
        let key = automation_key(AutomationKind::Order, "deal-1");

        assert!(!store.is_idempotent(&key, window));
        store.mark_idempotent(&key, window);
        assert!(store.is_idempotent(&key, window));
        assert!(!store.is_idempotent("order:deal-2", window));
    }

    #[test]
    fn test_expiry_makes_key_new_again() {
        let (clock, mut store) = store();
        let window = Duration::seconds(30);
        store.mark_idempotent("quote:deal-1", window);

        clock.advance(Duration::milliseconds(29_999));
        assert!(store.is_idempotent("quote:deal-1", window));

        clock.advance(Duration::milliseconds(1));
        assert!(!store.is_idempotent("quote:deal-1", window));
        assert!(store.record("quote:deal-1").is_none());
    }

    #[test]
    fn test_shorter_check_window_wins() {
        let (clock, mut store) = store();
        store.mark_idempotent("quote:deal-1", Duration::seconds(60));
        clock.advance(Duration::seconds(10));
        assert!(!store.is_idempotent("quote:deal-1", Duration::seconds(5)));
    }

    #[test]
    fn test_clear_allows_retry() {
        let (_, mut store) = store();
        let window = Duration::seconds(30);
        store.mark_idempotent("quote:deal-1", window);
        store.clear_idempotent("quote:deal-1");
        assert!(!store.is_idempotent("quote:deal-1", window));

        // unknown keys are fine
        store.clear_idempotent("quote:deal-404");
    }

    #[test]
    fn test_remark_extends_expiry() {
        let (clock, mut store) = store();
        let window = Duration::seconds(30);
        store.mark_idempotent("order:deal-1", window);
        clock.advance(Duration::seconds(20));
        store.mark_idempotent("order:deal-1", window);
        clock.advance(Duration::seconds(20));
        assert!(store.is_idempotent("order:deal-1", window));
    }

    #[test]
    fn test_purge_expired() {
        let (clock, mut store) = store();
        store.mark_idempotent("a", Duration::seconds(5));
        store.mark_idempotent("b", Duration::seconds(50));
        clock.advance(Duration::seconds(10));

        assert_eq!(store.purge_expired(), 1);
        assert_eq!(store.len(), 1);
        assert!(store.record("b").is_some());
    }
}
