//! Memory record store.
//!
//! [`MemoryStore`] owns the authoritative in-memory collection of
//! [`MemoryEvent`]s and is the only component that mutates it. Every public
//! mutation updates the collection synchronously, invalidates the query
//! cache wholesale, requests one background save, and publishes
//! [`StoreEvent::MemoriesChanged`]; a query issued right after a mutation on
//! the same logical thread therefore always reflects it, regardless of any
//! pending save.
//!
//! # Persistence discipline
//!
//! Saves never run on the caller's path. The collection is snapshotted at
//! scheduling time and written by a spawned task; while one save is in
//! flight, further save requests are dropped (coalesced) rather than
//! queued, so durable state converges to memory once a save runs after the
//! last mutation. Decode and write failures are absorbed: the store falls
//! back to the seed dataset or simply skips the write, reports the failure
//! on the diagnostics channel, and never raises an error to the mutation
//! caller. Callers that need durability at a known point, such as app
//! shutdown, call [`MemoryStore::flush`].

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, trace, warn};

use crate::config::{BackendConfig, StoreConfig};
use crate::error::{Error, Result};
use crate::event::{DiagnosticEvent, DiagnosticReceiver, EventBus, EventReceiver, StoreEvent};
use crate::model::MemoryEvent;
use crate::storage::{InMemoryBackend, LocalFileSystemBackend, StorageBackend};

mod cache;
pub mod seed;

use cache::QueryCache;

/// Current archive schema version, written into every payload
const ARCHIVE_VERSION: u32 = 1;

/// Field-tagged persistence envelope for the full collection
///
/// All fields default on decode, so older payloads and future additions
/// both deserialize.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct MemoryArchive {
    #[serde(default)]
    version: u32,

    #[serde(default)]
    events: Vec<MemoryEvent>,
}

/// Observable, durably backed collection of memory records
///
/// Construct one per backing namespace at application start and pass it by
/// reference through the call graph; the store is not a global.
pub struct MemoryStore {
    config: StoreConfig,

    /// Injected durable adapter; background tasks take their own handle
    backend: Box<dyn StorageBackend>,

    /// Authoritative collection, in insertion order
    events: Arc<RwLock<Vec<MemoryEvent>>>,

    /// Per-subject query cache
    cache: QueryCache,

    /// Set while a background save is in flight; requests arriving in that
    /// window are coalesced away
    save_in_flight: Arc<AtomicBool>,

    /// Serializes actual writes so `flush` can wait out an in-flight save
    save_gate: Arc<Mutex<()>>,

    event_bus: Arc<EventBus>,
}

impl MemoryStore {
    /// Create a store over the backend selected by the configuration
    ///
    /// Loading completes before this returns: the store is populated either
    /// from the durable payload or, when none exists or it fails to decode,
    /// from the seed dataset (which is persisted immediately).
    pub async fn new(config: StoreConfig, event_bus: Arc<EventBus>) -> Self {
        let backend = build_backend(&config.backend);
        Self::with_backend(config, backend, event_bus).await
    }

    /// Create a store over an externally constructed backend
    pub async fn with_backend(
        config: StoreConfig,
        backend: Box<dyn StorageBackend>,
        event_bus: Arc<EventBus>,
    ) -> Self {
        let cache = QueryCache::new(config.cache_freshness);
        let store = Self {
            config,
            backend,
            events: Arc::new(RwLock::new(Vec::new())),
            cache,
            save_in_flight: Arc::new(AtomicBool::new(false)),
            save_gate: Arc::new(Mutex::new(())),
            event_bus,
        };
        store.load_or_seed().await;
        store
    }

    /// Append a record unconditionally
    ///
    /// No dedup by id is performed: adding the same record twice stores two
    /// copies, and a later delete removes both.
    pub async fn add_event(&self, event: MemoryEvent) {
        {
            let mut events = self.events.write().await;
            events.push(event);
        }
        self.after_mutation().await;
    }

    /// Append a batch of records with one cache invalidation, one save
    /// request, and one notification
    pub async fn add_events(&self, new_events: Vec<MemoryEvent>) {
        {
            let mut events = self.events.write().await;
            events.extend(new_events);
        }
        self.after_mutation().await;
    }

    /// Replace the stored record with the same id, preserving its position
    /// and its stored creation timestamp
    ///
    /// A record whose id is unknown is ignored: no insertion, no save, no
    /// notification.
    pub async fn update_event(&self, event: MemoryEvent) {
        let matched = {
            let mut events = self.events.write().await;
            match events.iter_mut().find(|e| e.id == event.id) {
                Some(slot) => {
                    let created_at = slot.created_at;
                    *slot = event;
                    slot.created_at = created_at;
                    true
                }
                None => false,
            }
        };

        if matched {
            self.after_mutation().await;
        } else {
            debug!("update_event: no stored record matches id; ignoring");
        }
    }

    /// Remove every stored record whose id equals the given record's id
    ///
    /// Invalidation, save, and notification happen whether or not anything
    /// was removed; deleting an unknown id is a harmless no-op.
    pub async fn delete_event(&self, event: &MemoryEvent) {
        {
            let mut events = self.events.write().await;
            events.retain(|e| e.id != event.id);
        }
        self.after_mutation().await;
    }

    /// All records attributed to the given subject, most recent date first,
    /// ties in insertion order
    ///
    /// Served from the cache when a fresh entry exists; otherwise computed
    /// from the authoritative collection and cached.
    pub async fn events_for(&self, subject: &str) -> Vec<MemoryEvent> {
        if let Some(hit) = self.cache.lookup(subject).await {
            trace!("events_for: cache hit for {}", subject);
            return hit;
        }

        let mut result: Vec<MemoryEvent> = {
            let events = self.events.read().await;
            events
                .iter()
                .filter(|e| e.subject == subject)
                .cloned()
                .collect()
        };
        sort_by_date_desc(&mut result);

        self.cache.store(subject, result.clone()).await;
        result
    }

    /// All records, most recent date first. Bypasses the cache.
    pub async fn all_events(&self) -> Vec<MemoryEvent> {
        let mut result = self.events.read().await.clone();
        sort_by_date_desc(&mut result);
        result
    }

    /// Number of stored records
    pub async fn count(&self) -> usize {
        self.events.read().await.len()
    }

    /// Empty the collection and remove the persisted payload
    pub async fn clear_all(&self) {
        {
            let mut events = self.events.write().await;
            events.clear();
        }
        self.cache.invalidate().await;
        self.request_erase();
        let _ = self.event_bus.sync_publish(StoreEvent::MemoriesChanged);
    }

    /// Persist the current collection before returning
    ///
    /// Waits for any in-flight background save, then writes the present
    /// snapshot. This is the drain operation for shutdown paths; routine
    /// mutations must not call it.
    pub async fn flush(&self) -> Result<()> {
        let _guard = self.save_gate.lock().await;
        let snapshot = self.events.read().await.clone();
        persist(self.backend.as_ref(), &self.config.namespace, &snapshot).await
    }

    /// Subscribe to store notifications and diagnostics
    pub fn subscribe(&self) -> (EventReceiver, DiagnosticReceiver) {
        self.event_bus.subscribe()
    }

    pub fn event_bus(&self) -> &Arc<EventBus> {
        &self.event_bus
    }

    async fn after_mutation(&self) {
        self.cache.invalidate().await;
        self.request_save().await;
        let _ = self.event_bus.sync_publish(StoreEvent::MemoriesChanged);
    }

    /// Schedule a background save of the current collection
    ///
    /// Coalescing: while a save is in flight the request is dropped, not
    /// queued. Durable state then converges through whichever mutation next
    /// schedules a save, or through `flush`.
    async fn request_save(&self) {
        if self.save_in_flight.swap(true, Ordering::AcqRel) {
            trace!("Save already in flight; coalescing");
            return;
        }

        // Snapshot at scheduling time; the caller's view of the collection
        // is never tied to the write.
        let snapshot = self.events.read().await.clone();
        let backend = self.backend.clone_backend();
        let namespace = self.config.namespace.clone();
        let gate = Arc::clone(&self.save_gate);
        let in_flight = Arc::clone(&self.save_in_flight);
        let bus = Arc::clone(&self.event_bus);

        tokio::spawn(async move {
            let _guard = gate.lock().await;
            match persist(backend.as_ref(), &namespace, &snapshot).await {
                Ok(()) => {
                    let _ = bus.sync_publish(StoreEvent::SaveCompleted);
                }
                Err(e) => {
                    warn!("Background save failed: {}", e);
                    let _ = bus.sync_publish_diagnostic(DiagnosticEvent::SaveFailed {
                        reason: e.to_string(),
                    });
                }
            }
            in_flight.store(false, Ordering::Release);
        });
    }

    fn request_erase(&self) {
        let backend = self.backend.clone_backend();
        let namespace = self.config.namespace.clone();
        let gate = Arc::clone(&self.save_gate);
        let bus = Arc::clone(&self.event_bus);

        tokio::spawn(async move {
            let _guard = gate.lock().await;
            match backend.erase(&namespace).await {
                Ok(()) => {
                    let _ = bus.sync_publish(StoreEvent::EraseCompleted);
                }
                Err(e) => {
                    warn!("Failed to erase persisted memories: {}", e);
                    let _ = bus.sync_publish_diagnostic(DiagnosticEvent::EraseFailed {
                        reason: e.to_string(),
                    });
                }
            }
        });
    }

    /// Populate the collection from the durable payload, or install and
    /// persist the seed dataset when no usable payload exists
    async fn load_or_seed(&self) {
        match self.backend.load(&self.config.namespace).await {
            Ok(Some(bytes)) => match serde_json::from_slice::<MemoryArchive>(&bytes) {
                Ok(archive) => {
                    let count = archive.events.len();
                    *self.events.write().await = archive.events;
                    debug!("Loaded {} memory events", count);
                    let _ = self
                        .event_bus
                        .sync_publish(StoreEvent::LoadCompleted { count });
                    return;
                }
                Err(e) => {
                    warn!("Persisted memory payload failed to decode: {}", e);
                    let _ = self
                        .event_bus
                        .sync_publish_diagnostic(DiagnosticEvent::DecodeFailed {
                            reason: e.to_string(),
                        });
                }
            },
            Ok(None) => {
                debug!("No persisted memory payload; installing seed data");
            }
            Err(e) => {
                warn!("Failed to load persisted memories: {}", e);
                let _ = self
                    .event_bus
                    .sync_publish_diagnostic(DiagnosticEvent::LoadFailed {
                        reason: e.to_string(),
                    });
            }
        }

        let seeded = seed::example_events();
        let count = seeded.len();
        *self.events.write().await = seeded.clone();
        let _ = self.event_bus.sync_publish(StoreEvent::Seeded { count });

        // Persist the seed right away so the next start loads it back.
        if let Err(e) = persist(self.backend.as_ref(), &self.config.namespace, &seeded).await {
            warn!("Failed to persist seed data: {}", e);
            let _ = self
                .event_bus
                .sync_publish_diagnostic(DiagnosticEvent::SaveFailed {
                    reason: e.to_string(),
                });
        }
    }
}

fn build_backend(config: &BackendConfig) -> Box<dyn StorageBackend> {
    match config {
        BackendConfig::Local(local) => Box::new(LocalFileSystemBackend::new(local.clone())),
        BackendConfig::InMemory => Box::new(InMemoryBackend::new()),
    }
}

/// Date-descending, insertion-stable ordering used by every query result
fn sort_by_date_desc(events: &mut [MemoryEvent]) {
    events.sort_by(|a, b| b.date.cmp(&a.date));
}

async fn persist(
    backend: &dyn StorageBackend,
    namespace: &str,
    events: &[MemoryEvent],
) -> Result<()> {
    let archive = MemoryArchive {
        version: ARCHIVE_VERSION,
        events: events.to_vec(),
    };
    let bytes =
        serde_json::to_vec(&archive).map_err(|e| Error::Serialization(e.to_string()))?;
    backend.save(namespace, &bytes).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use proptest::prelude::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_archive_decodes_with_missing_fields() {
        let archive: MemoryArchive = serde_json::from_str("{}").unwrap();
        assert_eq!(archive.version, 0);
        assert!(archive.events.is_empty());

        // Unknown fields are ignored rather than rejected.
        let archive: MemoryArchive =
            serde_json::from_str(r#"{"version": 2, "events": [], "future_field": true}"#).unwrap();
        assert_eq!(archive.version, 2);
    }

    #[test]
    fn test_sort_is_descending_and_stable() {
        let mut events = vec![
            MemoryEvent::new("Mom", date(2024, 1, 10), "first", "").with_id("1"),
            MemoryEvent::new("Mom", date(2024, 3, 1), "second", "").with_id("2"),
            MemoryEvent::new("Mom", date(2024, 1, 10), "third", "").with_id("3"),
        ];
        sort_by_date_desc(&mut events);

        let ids: Vec<_> = events.iter().map(|e| e.id.as_str()).collect();
        // Equal dates keep their insertion order.
        assert_eq!(ids, vec!["2", "1", "3"]);
    }

    proptest! {
        #[test]
        fn prop_sort_by_date_desc_holds(offsets in proptest::collection::vec(0u64..30, 0..40)) {
            let base = date(2024, 1, 1);
            let mut events: Vec<MemoryEvent> = offsets
                .iter()
                .enumerate()
                .map(|(index, offset)| {
                    let event_date = base + chrono::Days::new(*offset);
                    MemoryEvent::new("Mom", event_date, "t", "")
                        .with_id(&format!("evt-{}", index))
                })
                .collect();

            sort_by_date_desc(&mut events);

            for pair in events.windows(2) {
                // Descending dates throughout.
                prop_assert!(pair[0].date >= pair[1].date);
                // Stability: within a date, insertion order survives.
                if pair[0].date == pair[1].date {
                    let left: usize = pair[0].id[4..].parse().unwrap();
                    let right: usize = pair[1].id[4..].parse().unwrap();
                    prop_assert!(left < right);
                }
            }
        }
    }
}
