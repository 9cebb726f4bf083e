use crate::types::EventRecord;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};
use tracing::debug;

/// Immutable snapshot of one source's events, shared between requests.
pub type EventCollection = Arc<Vec<EventRecord>>;

struct CacheEntry {
    events: EventCollection,
    expires_at: Instant,
    updated_at: DateTime<Utc>,
}

impl CacheEntry {
    fn is_valid(&self, now: Instant) -> bool {
        now < self.expires_at
    }
}

/// Per-source TTL cache of event collections.
pub struct EventCache {
    entries: Mutex<HashMap<String, CacheEntry>>,
    default_ttl: Duration,
}

#[derive(Debug, Clone, Serialize)]
pub struct CacheEntryInfo {
    pub source: String,
    pub is_valid: bool,
    pub events: usize,
    pub last_update: DateTime<Utc>,
    pub cache_age_seconds: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct CacheInfo {
    pub total_items: usize,
    pub valid_items: usize,
    pub expired_items: usize,
    pub entries: Vec<CacheEntryInfo>,
}

impl EventCache {
    pub fn new(default_ttl: Duration) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            default_ttl,
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, CacheEntry>> {
        // A panic while holding the lock cannot leave an entry half-written.
        self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Fresh collection for `source`. Expired entries miss here but stay
    /// available to [`EventCache::get_stale`] until replaced or cleared.
    pub fn get(&self, source: &str) -> Option<EventCollection> {
        let entries = self.lock();
        let now = Instant::now();
        match entries.get(source) {
            Some(entry) if entry.is_valid(now) => Some(entry.events.clone()),
            Some(_) => {
                debug!(source, "cache entry expired");
                None
            }
            None => None,
        }
    }

    /// Last stored collection regardless of expiry.
    pub fn get_stale(&self, source: &str) -> Option<EventCollection> {
        self.lock().get(source).map(|entry| entry.events.clone())
    }

    pub fn put(&self, source: &str, events: EventCollection, ttl: Option<Duration>) {
        let ttl = ttl.unwrap_or(self.default_ttl);
        let entry = CacheEntry {
            events,
            expires_at: Instant::now() + ttl,
            updated_at: Utc::now(),
        };
        self.lock().insert(source.to_string(), entry);
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    /// Number of events across all valid entries.
    pub fn cached_event_count(&self) -> usize {
        let now = Instant::now();
        self.lock()
            .values()
            .filter(|entry| entry.is_valid(now))
            .map(|entry| entry.events.len())
            .sum()
    }

    pub fn info(&self) -> CacheInfo {
        let now = Instant::now();
        let wall_now = Utc::now();
        let entries = self.lock();

        let mut infos: Vec<CacheEntryInfo> = entries
            .iter()
            .map(|(source, entry)| CacheEntryInfo {
                source: source.clone(),
                is_valid: entry.is_valid(now),
                events: entry.events.len(),
                last_update: entry.updated_at,
                cache_age_seconds: (wall_now - entry.updated_at).num_seconds(),
            })
            .collect();
        infos.sort_by(|a, b| a.source.cmp(&b.source));

        let valid_items = infos.iter().filter(|i| i.is_valid).count();
        CacheInfo {
            total_items: infos.len(),
            valid_items,
            expired_items: infos.len() - valid_items,
            entries: infos,
        }
    }
}
