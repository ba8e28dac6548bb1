//! # Keepsake: Family Memory Record Store
//!
//! Keepsake is the data core of a family-memories application: a
//! process-wide, observable collection of timestamped memory records, each
//! attributed to a person in a family relationship graph, backed by durable
//! storage and accelerated by a short-lived per-person query cache.
//!
//! ## Architecture
//!
//! The crate is organized in dependency order, leaves first:
//!
//! - Entity model ([`model`]): `Person` and `MemoryEvent` value types
//! - Relationship graph ([`graph`]): keyed `Person` collection with
//!   spouse/children/parents queries
//! - Durable store adapter ([`storage`]): the `StorageBackend` trait and its
//!   file-system and in-memory implementations
//! - Memory record store ([`store`]): the authoritative event collection,
//!   its query cache, and its persistence discipline
//! - Notification surface ([`event`]): a broadcast `EventBus` the store
//!   publishes on for every mutation and persistence outcome
//!
//! ## Consistency model
//!
//! All mutations update the in-memory collection synchronously, so a query
//! issued immediately after a mutation always reflects it. Durable saves run
//! on background tasks and are coalesced: at most one save is in flight, and
//! additional requests are dropped rather than queued. Persistence failures
//! degrade to diagnostics; they are never surfaced as errors on the mutation
//! or query surface. Callers that need durability at a known point use
//! [`store::MemoryStore::flush`].
//!
//! ## Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use keepsake::config::StoreConfig;
//! use keepsake::event::EventBus;
//! use keepsake::model::MemoryEvent;
//! use keepsake::store::MemoryStore;
//!
//! # async fn example() {
//! let event_bus = Arc::new(EventBus::new(100));
//! let store = MemoryStore::new(StoreConfig::default(), event_bus).await;
//!
//! let date = chrono::NaiveDate::from_ymd_opt(2024, 3, 1).expect("valid date");
//! store
//!     .add_event(MemoryEvent::new("Mom", date, "Picnic", "We went to the lake."))
//!     .await;
//!
//! for event in store.events_for("Mom").await {
//!     println!("{}: {}", event.date, event.title);
//! }
//! # }
//! ```

pub mod config;
pub mod error;
pub mod event;
pub mod graph;
pub mod model;
pub mod storage;
pub mod store;

// Re-exports
pub use error::{Error, Result};
pub use event::{DiagnosticEvent, EventBus, StoreEvent};
pub use graph::FamilyGraph;
pub use model::{Gender, MemoryEvent, Person};
pub use storage::{StorageBackend, StorageError};
pub use store::MemoryStore;
