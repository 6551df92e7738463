//! In-memory response cache with lazy expiry
//!
//! Entries are keyed by caller-defined strings and hold arbitrary JSON
//! payloads. An expired entry is invisible to `get` but stays in place
//! until the key is written again, invalidated or cleared, so `get_stale`
//! can still serve it as a degraded fallback.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde_json::Value;

use super::CacheTtl;
use super::clock::{Clock, SystemClock};

/// Upper bound for TTLs too large for chrono
const MAX_TTL_DAYS: i64 = 365 * 100;

/// A single cached payload with its lifetime
#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub payload: Value,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl CacheEntry {
    /// Fresh means `now <= expires_at`
    pub fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        now <= self.expires_at
    }
}

/// Snapshot counts for diagnostics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub total_entries: usize,
    pub fresh_entries: usize,
    pub stale_entries: usize,
}

/// Key → entry map shared by the endpoint accessor and the aggregator.
///
/// Every operation takes the lock for its whole duration, so each call is
/// atomic for the entry it touches. There is no capacity bound and no
/// background sweep.
pub struct CacheStore {
    entries: Mutex<HashMap<String, CacheEntry>>,
    clock: Arc<dyn Clock>,
    default_ttl: Duration,
}

impl Default for CacheStore {
    fn default() -> Self {
        Self::new(CacheTtl::DEFAULT)
    }
}

impl CacheStore {
    /// Create a store backed by the system clock
    pub fn new(default_ttl: Duration) -> Self {
        Self::with_clock(Arc::new(SystemClock), default_ttl)
    }

    /// Create a store with an injected clock
    pub fn with_clock(clock: Arc<dyn Clock>, default_ttl: Duration) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            clock,
            default_ttl,
        }
    }

    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    // A poisoned lock still holds a consistent map: every mutation is a
    // single insert/remove/clear.
    fn lock(&self) -> MutexGuard<'_, HashMap<String, CacheEntry>> {
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Return the payload if the entry is fresh. An expired entry is
    /// reported as absent and left for [`CacheStore::get_stale`].
    pub fn get(&self, key: &str) -> Option<Value> {
        let now = self.clock.now();
        let entries = self.lock();

        match entries.get(key) {
            Some(entry) if entry.is_fresh(now) => Some(entry.payload.clone()),
            Some(entry) => {
                log::debug!(
                    "Cache entry expired: {} (age {}s)",
                    key,
                    (now - entry.created_at).num_seconds()
                );
                None
            }
            None => None,
        }
    }

    /// Return the payload regardless of expiry
    pub fn get_stale(&self, key: &str) -> Option<Value> {
        self.lock().get(key).map(|entry| entry.payload.clone())
    }

    /// Typed variant of [`CacheStore::get`]. A payload that no longer matches
    /// `T` is treated as a miss.
    pub fn get_as<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.get(key)
            .and_then(|value| serde_json::from_value(value).ok())
    }

    /// Insert or overwrite with the default TTL
    pub fn set(&self, key: &str, payload: Value) {
        self.set_with_ttl(key, payload, self.default_ttl);
    }

    /// Insert or overwrite with an explicit TTL.
    ///
    /// A zero TTL is raised to one millisecond so that
    /// `expires_at > created_at` always holds.
    pub fn set_with_ttl(&self, key: &str, payload: Value, ttl: Duration) {
        let ttl = chrono::Duration::from_std(ttl.max(Duration::from_millis(1)))
            .unwrap_or_else(|_| chrono::Duration::days(MAX_TTL_DAYS));
        let created_at = self.clock.now();
        let entry = CacheEntry {
            payload,
            created_at,
            expires_at: created_at + ttl,
        };
        self.lock().insert(key.to_string(), entry);
    }

    /// Remove one entry. Returns whether it existed.
    pub fn invalidate(&self, key: &str) -> bool {
        self.lock().remove(key).is_some()
    }

    /// Remove every entry. Returns how many were removed.
    pub fn clear(&self) -> usize {
        let mut entries = self.lock();
        let count = entries.len();
        entries.clear();
        count
    }

    /// Count entries by freshness
    pub fn stats(&self) -> CacheStats {
        let now = self.clock.now();
        let entries = self.lock();
        let fresh = entries.values().filter(|e| e.is_fresh(now)).count();

        CacheStats {
            total_entries: entries.len(),
            fresh_entries: fresh,
            stale_entries: entries.len() - fresh,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::clock::ManualClock;
    use serde::{Deserialize, Serialize};
    use serde_json::json;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct TestData {
        name: String,
        value: i32,
    }

    fn create_test_cache() -> (CacheStore, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new());
        let store = CacheStore::with_clock(clock.clone(), Duration::from_secs(300));
        (store, clock)
    }

    #[test]
    fn test_get_returns_none_for_missing_key() {
        let (cache, _clock) = create_test_cache();

        assert!(cache.get("nonexistent_key").is_none());
        assert!(cache.get_stale("nonexistent_key").is_none());
    }

    #[test]
    fn test_set_then_get_returns_payload() {
        let (cache, _clock) = create_test_cache();

        cache.set("fresh_key", json!({"car": 25, "bus": 5}));

        assert_eq!(cache.get("fresh_key"), Some(json!({"car": 25, "bus": 5})));
    }

    #[test]
    fn test_expired_entry_is_absent_but_stale_readable() {
        let (cache, clock) = create_test_cache();

        cache.set_with_ttl("short", json!([1, 2, 3]), Duration::from_secs(10));
        clock.advance(chrono::Duration::seconds(11));

        assert!(cache.get("short").is_none());
        assert_eq!(cache.get_stale("short"), Some(json!([1, 2, 3])));
    }

    #[test]
    fn test_get_keeps_expired_entry_until_next_write() {
        let (cache, clock) = create_test_cache();

        cache.set_with_ttl("short", json!(1), Duration::from_secs(1));
        clock.advance(chrono::Duration::seconds(2));

        assert!(cache.get("short").is_none());
        assert!(cache.get("short").is_none());
        assert_eq!(cache.get_stale("short"), Some(json!(1)));
        assert_eq!(cache.stats().stale_entries, 1);

        cache.set("short", json!(2));
        assert_eq!(cache.get("short"), Some(json!(2)));
        assert_eq!(cache.stats().stale_entries, 0);
    }

    #[test]
    fn test_get_stale_does_not_evict() {
        let (cache, clock) = create_test_cache();

        cache.set_with_ttl("short", json!("v"), Duration::from_secs(1));
        clock.advance(chrono::Duration::seconds(2));

        assert!(cache.get_stale("short").is_some());
        assert!(cache.get_stale("short").is_some());
        assert_eq!(cache.stats().stale_entries, 1);
    }

    #[test]
    fn test_entry_fresh_exactly_at_expiry() {
        let (cache, clock) = create_test_cache();

        cache.set_with_ttl("edge", json!(true), Duration::from_secs(30));
        clock.advance(chrono::Duration::seconds(30));

        assert_eq!(cache.get("edge"), Some(json!(true)));
    }

    #[test]
    fn test_default_ttl_is_applied() {
        let (cache, clock) = create_test_cache();

        cache.set("default", json!(1));
        clock.advance(chrono::Duration::seconds(240));
        assert!(cache.get("default").is_some());

        clock.advance(chrono::Duration::seconds(120));
        assert!(cache.get("default").is_none());
    }

    #[test]
    fn test_non_positive_ttl_keeps_expiry_after_creation() {
        let (cache, _clock) = create_test_cache();

        cache.set_with_ttl("zero", json!(0), Duration::ZERO);

        let entries = cache.lock();
        let entry = entries.get("zero").unwrap();
        assert!(entry.expires_at > entry.created_at);
    }

    #[test]
    fn test_overwrite_replaces_payload_and_expiry() {
        let (cache, clock) = create_test_cache();

        cache.set_with_ttl("k", json!("first"), Duration::from_secs(5));
        clock.advance(chrono::Duration::seconds(4));
        cache.set_with_ttl("k", json!("second"), Duration::from_secs(5));
        clock.advance(chrono::Duration::seconds(4));

        assert_eq!(cache.get("k"), Some(json!("second")));
    }

    #[test]
    fn test_invalidate_removes_fresh_and_stale_views() {
        let (cache, _clock) = create_test_cache();

        cache.set("k", json!(42));
        assert!(cache.invalidate("k"));

        assert!(cache.get("k").is_none());
        assert!(cache.get_stale("k").is_none());
        assert!(!cache.invalidate("k"));
    }

    #[test]
    fn test_clear_removes_everything() {
        let (cache, _clock) = create_test_cache();

        cache.set("a", json!(1));
        cache.set("b", json!(2));

        assert_eq!(cache.clear(), 2);
        assert!(cache.get_stale("a").is_none());
        assert_eq!(cache.stats(), CacheStats::default());
    }

    #[test]
    fn test_typed_roundtrip() {
        let (cache, _clock) = create_test_cache();
        let data = TestData {
            name: "lane_1".to_string(),
            value: 85,
        };

        cache.set("typed", serde_json::to_value(&data).unwrap());

        assert_eq!(cache.get_as::<TestData>("typed"), Some(data));
    }

    #[test]
    fn test_typed_get_with_wrong_shape_is_miss() {
        let (cache, _clock) = create_test_cache();

        cache.set("typed", json!([1, 2, 3]));

        assert!(cache.get_as::<TestData>("typed").is_none());
        assert!(cache.get_stale("typed").is_some());
    }

    #[test]
    fn test_stats_counts_fresh_and_stale() {
        let (cache, clock) = create_test_cache();

        cache.set_with_ttl("old", json!(1), Duration::from_secs(1));
        cache.set_with_ttl("new", json!(2), Duration::from_secs(600));
        clock.advance(chrono::Duration::seconds(5));

        let stats = cache.stats();
        assert_eq!(stats.total_entries, 2);
        assert_eq!(stats.fresh_entries, 1);
        assert_eq!(stats.stale_entries, 1);
    }
}
