//! In-memory record of events this process has already handled.
//!
//! The schedule is rebuilt from scratch on every loop iteration, so without a
//! memory of what already ran the loop would fire a due event again on the next
//! pass. The registry stores one status per [`EventKey`]:
//!
//! - **fired**: the action succeeded; the key is never scheduled again
//! - **failed**: the action was attempted and failed `attempts` times; the key
//!   stays schedulable until the attempts are exhausted
//!
//! Entries whose fire instant is older than the retention horizon are pruned on
//! every query, which keeps memory bounded for a daemon that runs for months.
//! Nothing is persisted; a restarted process starts empty.

use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;

use super::event::EventKey;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FireStatus {
    Fired,
    Failed { attempts: u32 },
}

/// De-duplication ledger owned by the scheduler loop.
#[derive(Debug, Clone)]
pub struct FiredRegistry {
    entries: HashMap<EventKey, FireStatus>,
    retention: Duration,
}

impl FiredRegistry {
    pub fn new(retention: Duration) -> Self {
        Self {
            entries: HashMap::new(),
            retention,
        }
    }

    /// Change the retention horizon (configuration reload).
    pub fn set_retention(&mut self, retention: Duration) {
        self.retention = retention;
    }

    /// Whether `key` has fired successfully. Prunes expired entries first.
    pub fn has_fired(&mut self, key: &EventKey, now: DateTime<Utc>) -> bool {
        self.prune(now);
        matches!(self.entries.get(key), Some(FireStatus::Fired))
    }

    /// Record a successful execution of `key`.
    pub fn mark_fired(&mut self, key: EventKey) {
        self.entries.insert(key, FireStatus::Fired);
    }

    /// Record a failed attempt at `key`; returns the attempt count so far.
    ///
    /// A key that already fired stays fired.
    pub fn record_failure(&mut self, key: EventKey) -> u32 {
        let status = self
            .entries
            .entry(key)
            .or_insert(FireStatus::Failed { attempts: 0 });
        match status {
            FireStatus::Fired => 0,
            FireStatus::Failed { attempts } => {
                *attempts += 1;
                *attempts
            }
        }
    }

    /// Failed attempts recorded for `key`.
    pub fn attempts(&self, key: &EventKey) -> u32 {
        match self.entries.get(key) {
            Some(FireStatus::Failed { attempts }) => *attempts,
            _ => 0,
        }
    }

    /// Whether `key` may still be scheduled: not fired and attempts remain.
    pub fn is_eligible(&mut self, key: &EventKey, now: DateTime<Utc>, max_attempts: u32) -> bool {
        !self.has_fired(key, now) && self.attempts(key) < max_attempts
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn prune(&mut self, now: DateTime<Utc>) {
        let horizon = now - self.retention;
        self.entries.retain(|key, _| key.fire_instant >= horizon);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 6, 1, h, m, 0).unwrap()
    }

    fn key(name: &str, fire_instant: DateTime<Utc>) -> EventKey {
        EventKey {
            fire_instant,
            name: name.to_string(),
        }
    }

    #[test]
    fn test_mark_fired_is_remembered() {
        let mut registry = FiredRegistry::new(Duration::days(2));
        let k = key("morning-off", at(10, 15));

        assert!(!registry.has_fired(&k, at(10, 15)));
        registry.mark_fired(k.clone());
        assert!(registry.has_fired(&k, at(10, 16)));
        assert!(registry.has_fired(&k, at(23, 59)));
    }

    #[test]
    fn test_key_identity_includes_instant_and_name() {
        let mut registry = FiredRegistry::new(Duration::days(2));
        registry.mark_fired(key("morning-off", at(10, 15)));

        assert!(!registry.has_fired(&key("morning-off", at(10, 16)), at(11, 0)));
        assert!(!registry.has_fired(&key("nightlight-on", at(10, 15)), at(11, 0)));
    }

    #[test]
    fn test_entries_past_retention_are_pruned_on_query() {
        let mut registry = FiredRegistry::new(Duration::days(2));
        let old = key("morning-off", at(10, 15));
        registry.mark_fired(old.clone());
        registry.record_failure(key("nightlight-on", at(20, 0)));
        assert_eq!(registry.len(), 2);

        // Exactly at the horizon the entry is kept
        let at_horizon = at(10, 15) + Duration::days(2);
        assert!(registry.has_fired(&old, at_horizon));
        assert_eq!(registry.len(), 2);

        // Past the horizon both the fired and the failed entry go away
        let later = at(20, 1) + Duration::days(2);
        assert!(!registry.has_fired(&old, later));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_failures_count_attempts_separately_from_fired() {
        let mut registry = FiredRegistry::new(Duration::days(2));
        let k = key("morning-off", at(10, 15));

        assert_eq!(registry.record_failure(k.clone()), 1);
        assert_eq!(registry.record_failure(k.clone()), 2);
        assert_eq!(registry.attempts(&k), 2);
        assert!(!registry.has_fired(&k, at(10, 16)));
        assert!(registry.is_eligible(&k, at(10, 16), 3));
        assert!(!registry.is_eligible(&k, at(10, 16), 2));

        registry.mark_fired(k.clone());
        assert_eq!(registry.attempts(&k), 0);
        assert!(!registry.is_eligible(&k, at(10, 16), 3));
        assert_eq!(registry.record_failure(k.clone()), 0);
        assert!(registry.has_fired(&k, at(10, 17)));
    }

    #[test]
    fn test_set_retention_shortens_horizon() {
        let mut registry = FiredRegistry::new(Duration::days(2));
        let k = key("morning-off", at(10, 15));
        registry.mark_fired(k.clone());

        registry.set_retention(Duration::hours(1));
        assert!(!registry.has_fired(&k, at(12, 0)));
        assert!(registry.is_empty());
    }
}
