use core_types::Tenant;
use dashmap::DashMap;
use serde_json::Value;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Short-lived memoization of GET responses, shared by clones of a client.
#[derive(Debug, Clone)]
pub struct ResponseCache {
    entries: Arc<DashMap<String, (Instant, Value)>>,
    // Bumped by every invalidation. A response fetched under an older
    // generation predates a write and must not be stored.
    generation: Arc<AtomicU64>,
    ttl: Duration,
}

impl ResponseCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: Arc::new(DashMap::new()),
            generation: Arc::new(AtomicU64::new(0)),
            ttl,
        }
    }

    /// Entries are scoped by tenant so two trucks never share a response.
    pub fn key(tenant: Tenant, endpoint: &str) -> String {
        format!("{tenant}:GET:{endpoint}")
    }

    pub fn get(&self, key: &str) -> Option<Value> {
        let expired = {
            let entry = self.entries.get(key)?;
            let (stored_at, value) = entry.value();
            if stored_at.elapsed() < self.ttl {
                return Some(value.clone());
            }
            true
        };
        if expired {
            self.entries.remove(key);
        }
        None
    }

    /// The current invalidation generation, captured before a GET is sent.
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }

    pub fn insert(&self, key: String, value: Value) {
        self.entries.insert(key, (Instant::now(), value));
    }

    /// Stores `value` only if no invalidation happened since `generation`.
    /// Returns whether the entry was kept.
    pub fn insert_if_current(&self, key: String, value: Value, generation: u64) -> bool {
        if self.generation() != generation {
            return false;
        }
        self.entries.insert(key.clone(), (Instant::now(), value));
        // An invalidation may have run between the check and the insert.
        if self.generation() != generation {
            self.entries.remove(&key);
            return false;
        }
        true
    }

    /// Drops everything; called after any successful write.
    pub fn invalidate_all(&self) {
        self.generation.fetch_add(1, Ordering::AcqRel);
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
