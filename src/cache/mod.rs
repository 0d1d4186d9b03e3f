//! Transcript cache
//!
//! In-memory key-value store with per-entry TTL. Completed transcripts are
//! kept here after their session is destroyed so late readers (the coaching
//! UI, the notes editor) can still fetch them.

use std::collections::HashMap;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::debug;

/// Cache key a completed meeting transcript is stored under
pub fn transcript_key(meeting_id: i64) -> String {
    format!("transcript:meeting:{}", meeting_id)
}

struct CacheEntry {
    value: String,
    expires_at: Instant,
}

/// TTL key-value store for completed transcripts
pub struct TranscriptCache {
    entries: Mutex<HashMap<String, CacheEntry>>,
    default_ttl: Duration,
}

impl TranscriptCache {
    pub fn new(default_ttl: Duration) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            default_ttl,
        }
    }

    /// Store a value under the default TTL
    pub async fn set(&self, key: &str, value: String) {
        self.set_with_ttl(key, value, self.default_ttl).await;
    }

    pub async fn set_with_ttl(&self, key: &str, value: String, ttl: Duration) {
        let mut entries = self.entries.lock().await;
        entries.insert(
            key.to_string(),
            CacheEntry {
                value,
                expires_at: Instant::now() + ttl,
            },
        );
        debug!(key, ttl_secs = ttl.as_secs(), "Cached value");
    }

    /// Fetch a value; expired entries are removed and never returned
    pub async fn get(&self, key: &str) -> Option<String> {
        let mut entries = self.entries.lock().await;
        match entries.get(key) {
            Some(entry) if entry.expires_at > Instant::now() => Some(entry.value.clone()),
            Some(_) => {
                entries.remove(key);
                None
            }
            None => None,
        }
    }

    /// Remaining lifetime of a live entry
    pub async fn ttl(&self, key: &str) -> Option<Duration> {
        let entries = self.entries.lock().await;
        entries
            .get(key)
            .and_then(|e| e.expires_at.checked_duration_since(Instant::now()))
    }

    /// Remove every entry matching the pattern: a literal key, or a prefix
    /// followed by a trailing `*`. Returns the number of entries removed.
    pub async fn clear_pattern(&self, pattern: &str) -> usize {
        let mut entries = self.entries.lock().await;
        let before = entries.len();
        match pattern.strip_suffix('*') {
            Some(prefix) => entries.retain(|key, _| !key.starts_with(prefix)),
            None => {
                entries.remove(pattern);
            }
        }
        let removed = before - entries.len();
        debug!(pattern, removed, "Cleared cache entries");
        removed
    }

    /// Drop expired entries, returning how many were removed
    pub async fn purge_expired(&self) -> usize {
        let mut entries = self.entries.lock().await;
        let before = entries.len();
        let now = Instant::now();
        entries.retain(|_, entry| entry.expires_at > now);
        before - entries.len()
    }

    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.lock().await.is_empty()
    }
}
