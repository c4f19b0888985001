//! Response cache for outbound LLM calls.
//!
//! Entries are keyed by `(endpoint, payload)` and expire lazily: an expired
//! entry is dropped the next time it is read or swept, and is never served.
//! Entries are immutable once written; the map only ever sees inserts and
//! removals, and the lock is never held across an `.await`.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::Duration;

use serde::Serialize;
use serde_json::Value;
use tokio::time::Instant;
use tracing::debug;

/// Default time-to-live for cached responses.
pub const DEFAULT_TTL: Duration = Duration::from_secs(5 * 60);

#[derive(Debug, Clone)]
struct CacheEntry {
    data: Arc<Value>,
    timestamp: Instant,
    ttl: Duration,
}

impl CacheEntry {
    fn is_expired(&self, now: Instant) -> bool {
        now > self.timestamp + self.ttl
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub size: usize,
    pub entries: usize,
}

#[derive(Debug, Clone)]
pub struct ResponseCache {
    entries: Arc<RwLock<HashMap<String, CacheEntry>>>,
    default_ttl: Duration,
}

impl Default for ResponseCache {
    fn default() -> Self {
        Self::new(DEFAULT_TTL)
    }
}

impl ResponseCache {
    pub fn new(default_ttl: Duration) -> Self {
        Self {
            entries: Arc::new(RwLock::new(HashMap::new())),
            default_ttl,
        }
    }

    /// Builds the cache key for a request. serde_json keeps object keys
    /// sorted, so equal payloads always serialize to the same string.
    pub fn key_for(endpoint: &str, payload: &Value) -> String {
        format!("{endpoint}:{payload}")
    }

    pub fn get(&self, key: &str) -> Option<Arc<Value>> {
        let now = Instant::now();
        {
            let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
            match entries.get(key) {
                None => return None,
                Some(entry) if !entry.is_expired(now) => return Some(entry.data.clone()),
                Some(_) => {}
            }
        }

        // Expired: drop it, unless a fresh value was written in the meantime.
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        if let Some(entry) = entries.get(key) {
            if entry.is_expired(now) {
                entries.remove(key);
                debug!("Evicted expired cache entry");
            } else {
                return Some(entry.data.clone());
            }
        }
        None
    }

    pub fn set(&self, key: String, data: Value) {
        self.set_with_ttl(key, data, self.default_ttl);
    }

    pub fn set_with_ttl(&self, key: String, data: Value, ttl: Duration) {
        let entry = CacheEntry {
            data: Arc::new(data),
            timestamp: Instant::now(),
            ttl,
        };
        self.entries
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .insert(key, entry);
    }

    pub fn clear(&self) {
        self.entries
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .clear();
    }

    /// Removes every expired entry and returns how many were dropped.
    pub fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        let before = entries.len();
        entries.retain(|_, entry| !entry.is_expired(now));
        before - entries.len()
    }

    /// Sweeps expired entries first, so the reported size never counts stale data.
    pub fn stats(&self) -> CacheStats {
        self.purge_expired();
        let size = self.entries.read().unwrap_or_else(|e| e.into_inner()).len();
        CacheStats {
            size,
            entries: size,
        }
    }
}
