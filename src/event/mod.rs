//! Store notification surface.
//!
//! The store publishes typed events on a broadcast [`EventBus`] rather than
//! calling listeners directly: any successful mutation produces a
//! [`StoreEvent::MemoriesChanged`] with no payload (subscribers re-read
//! through the query API), and persistence outcomes that matter to an
//! observer but never to the mutation caller go out as [`DiagnosticEvent`]s
//! on a separate channel.

mod event_bus;

pub use event_bus::{DiagnosticReceiver, EventBus, EventError, EventReceiver, EventResult};

/// Notifications published on the regular channel
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreEvent {
    /// The authoritative collection changed; re-read via the query API
    MemoriesChanged,

    /// A durable payload was decoded at construction
    LoadCompleted { count: usize },

    /// No usable payload existed; the example dataset was installed
    Seeded { count: usize },

    /// A background save finished successfully
    SaveCompleted,

    /// The persisted payload was removed
    EraseCompleted,
}

impl std::fmt::Display for StoreEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MemoriesChanged => write!(f, "memory_store.changed"),
            Self::LoadCompleted { .. } => write!(f, "memory_store.load.completed"),
            Self::Seeded { .. } => write!(f, "memory_store.seeded"),
            Self::SaveCompleted => write!(f, "memory_store.save.completed"),
            Self::EraseCompleted => write!(f, "memory_store.erase.completed"),
        }
    }
}

/// Failures absorbed at the persistence boundary and reported for
/// observability only
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiagnosticEvent {
    /// The durable payload existed but could not be decoded
    DecodeFailed { reason: String },

    /// The backend failed to produce a payload
    LoadFailed { reason: String },

    /// A background save was rejected by the backend
    SaveFailed { reason: String },

    /// Removing the persisted payload failed
    EraseFailed { reason: String },
}

impl std::fmt::Display for DiagnosticEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DecodeFailed { .. } => write!(f, "memory_store.decode.failed"),
            Self::LoadFailed { .. } => write!(f, "memory_store.load.failed"),
            Self::SaveFailed { .. } => write!(f, "memory_store.save.failed"),
            Self::EraseFailed { .. } => write!(f, "memory_store.erase.failed"),
        }
    }
}
