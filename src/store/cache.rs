//! Per-person query cache.
//!
//! The cache maps a subject name to its precomputed, sorted event list. One
//! store-wide build timestamp gates every entry collectively: a lookup hits
//! only when an entry exists for the requested name AND the time since the
//! last build is inside the freshness window. Mutations invalidate
//! wholesale, clearing all entries and the stamp.
//!
//! Refreshing the shared stamp on a miss revives entries computed earlier;
//! that is safe because entries only survive in the map while no mutation
//! has occurred, so a revived entry is time-stale but never content-stale.

use dashmap::DashMap;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

use crate::model::MemoryEvent;

pub(crate) struct QueryCache {
    /// Precomputed sorted lists keyed by subject name
    entries: DashMap<String, Vec<MemoryEvent>>,

    /// Shared build stamp gating all entries collectively
    built_at: RwLock<Option<Instant>>,

    /// How long after a build the entries remain servable.
    /// Zero disables the cache.
    freshness: Duration,
}

impl QueryCache {
    pub fn new(freshness: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            built_at: RwLock::new(None),
            freshness,
        }
    }

    /// Return the cached list for a subject, if one exists and the shared
    /// stamp is still fresh
    pub async fn lookup(&self, subject: &str) -> Option<Vec<MemoryEvent>> {
        if self.freshness.is_zero() {
            return None;
        }

        let built_at = *self.built_at.read().await;
        let fresh = built_at.is_some_and(|at| at.elapsed() < self.freshness);
        if !fresh {
            return None;
        }

        self.entries.get(subject).map(|entry| entry.value().clone())
    }

    /// Record a freshly computed list and refresh the shared stamp
    pub async fn store(&self, subject: &str, events: Vec<MemoryEvent>) {
        if self.freshness.is_zero() {
            return;
        }

        self.entries.insert(subject.to_string(), events);
        *self.built_at.write().await = Some(Instant::now());
    }

    /// Drop every entry and clear the stamp
    pub async fn invalidate(&self) {
        self.entries.clear();
        *self.built_at.write().await = None;
    }

    #[cfg(test)]
    pub fn entry_count(&self) -> usize {
        self.entries.len()
    }
}
