//! In-memory TTL cache for upstream response payloads.
//!
//! One entry per bus stop code, holding the raw upstream payload and the
//! instant it was fetched. Entries are never evicted; a stale entry is
//! simply overwritten the next time its key misses. The map therefore grows
//! with the number of distinct keys ever requested, which is acceptable for
//! a short-lived gateway process but worth knowing about before deploying it
//! anywhere long-running.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use bytes::Bytes;
use tokio::time::Instant;

struct Entry {
    fetched_at: Instant,
    payload: Bytes,
}

/// A mutex-guarded map of stop code → (fetch instant, payload).
///
/// Shared across connection tasks behind an `Arc`. The lock is only held
/// for the duration of a map lookup or insert, never across an await, so a
/// plain `std::sync::Mutex` is sufficient. Concurrent misses on the same
/// key may each trigger an upstream fetch; the last write wins, which is
/// fine for idempotent GET payloads.
pub struct TtlCache {
    ttl: Duration,
    entries: Mutex<HashMap<String, Entry>>,
}

impl TtlCache {
    /// Creates an empty cache whose entries stay fresh for `ttl`.
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Returns the configured time-to-live.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Returns the payload for `key` if a fresh entry exists.
    ///
    /// Stale entries are left in place; they are replaced by the next
    /// [`insert`](Self::insert) for the same key.
    pub fn get(&self, key: &str) -> Option<Bytes> {
        let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        let entry = entries.get(key)?;
        if entry.fetched_at.elapsed() < self.ttl {
            Some(entry.payload.clone())
        } else {
            None
        }
    }

    /// Stores `payload` under `key`, stamped with the current instant.
    pub fn insert(&self, key: impl Into<String>, payload: Bytes) {
        let entry = Entry {
            fetched_at: Instant::now(),
            payload,
        };
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.into(), entry);
    }

    /// Returns the number of entries currently held, fresh or stale.
    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Returns `true` if the cache holds no entries.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::advance;

    #[tokio::test(start_paused = true)]
    async fn fresh_entry_is_returned() {
        let cache = TtlCache::new(Duration::from_secs(10));
        cache.insert("83139", Bytes::from_static(b"{\"Services\":[]}"));

        advance(Duration::from_secs(9)).await;
        assert_eq!(
            cache.get("83139"),
            Some(Bytes::from_static(b"{\"Services\":[]}"))
        );
    }

    #[tokio::test(start_paused = true)]
    async fn expired_entry_is_not_returned() {
        let cache = TtlCache::new(Duration::from_secs(10));
        cache.insert("83139", Bytes::from_static(b"old"));

        advance(Duration::from_secs(11)).await;
        assert_eq!(cache.get("83139"), None);
        // The stale entry is retained until overwritten.
        assert_eq!(cache.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn insert_overwrites_stale_entry() {
        let cache = TtlCache::new(Duration::from_secs(10));
        cache.insert("83139", Bytes::from_static(b"old"));
        advance(Duration::from_secs(11)).await;

        cache.insert("83139", Bytes::from_static(b"new"));
        assert_eq!(cache.get("83139"), Some(Bytes::from_static(b"new")));
        assert_eq!(cache.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn unknown_key_misses() {
        let cache = TtlCache::new(Duration::from_secs(10));
        assert_eq!(cache.get("09047"), None);
        assert!(cache.is_empty());
    }
}
