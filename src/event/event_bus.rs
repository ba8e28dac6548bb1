//! # Event Bus Implementation
//!
//! The EventBus is the messaging hub between the store and its observers.
//! It provides a broadcast-based publish-subscribe mechanism so the store
//! can announce mutations and persistence outcomes without knowing who, if
//! anyone, is listening.
//!
//! ## Design Decisions
//!
//! The implementation uses Tokio's broadcast channel rather than MPSC
//! channels to:
//!
//! 1. Allow multiple subscribers to receive the same event
//! 2. Handle backpressure through the channel capacity
//! 3. Support non-blocking publish operations
//!
//! Two separate channels are maintained: a regular channel for store
//! notifications and a diagnostics channel for absorbed persistence
//! failures. Subscribers that only care about data changes never see
//! diagnostics traffic, and vice versa.

use thiserror::Error;
use tokio::sync::broadcast;
use tracing::trace;

use super::{DiagnosticEvent, StoreEvent};

/// Errors that can occur when publishing or receiving events
#[derive(Debug, Error, Clone)]
pub enum EventError {
    #[error("Failed to send event: {message}")]
    SendFailed { message: String },

    #[error("Failed to receive event: {message}")]
    ReceiveFailed { message: String },

    #[error("Receiver lagged behind, skipped {count} events")]
    Lagged { count: u64 },
}

pub type EventResult<T> = Result<T, EventError>;

/// Broadcast hub for store notifications and diagnostics
///
/// The capacity bounds how many unprocessed events each channel buffers;
/// slow subscribers past that point observe a `Lagged` error and are
/// resubscribed at the current head of the stream.
pub struct EventBus {
    /// Broadcast sender for store notifications
    event_sender: broadcast::Sender<StoreEvent>,
    /// Broadcast sender for diagnostics
    diagnostic_sender: broadcast::Sender<DiagnosticEvent>,
    /// Maximum number of events that can be buffered
    capacity: usize,
    /// Internal receiver to keep the notification channel active
    _internal_receiver: broadcast::Receiver<StoreEvent>,
    /// Internal receiver to keep the diagnostics channel active
    _internal_diagnostic_receiver: broadcast::Receiver<DiagnosticEvent>,
}

impl EventBus {
    /// Creates a new EventBus with the specified buffer capacity
    pub fn new(capacity: usize) -> Self {
        let (event_sender, event_receiver) = broadcast::channel(capacity);
        let (diagnostic_sender, diagnostic_receiver) = broadcast::channel(capacity);
        Self {
            event_sender,
            diagnostic_sender,
            capacity,
            _internal_receiver: event_receiver,
            _internal_diagnostic_receiver: diagnostic_receiver,
        }
    }

    /// Subscribes to both notification and diagnostics events
    pub fn subscribe(&self) -> (EventReceiver, DiagnosticReceiver) {
        let event_rx = self.event_sender.subscribe();
        let diagnostic_rx = self.diagnostic_sender.subscribe();
        (
            EventReceiver::new(event_rx),
            DiagnosticReceiver::new(diagnostic_rx),
        )
    }

    /// Publishes a store notification to all subscribers
    pub async fn publish(&self, event: StoreEvent) -> EventResult<()> {
        self.sync_publish(event)
    }

    /// Publishes a store notification from a synchronous context
    ///
    /// Broadcast sends never block, so the async and sync forms behave
    /// identically; this one exists for callers without an `.await` point.
    pub fn sync_publish(&self, event: StoreEvent) -> EventResult<()> {
        trace!("Publishing event: {}", event);
        self.event_sender
            .send(event)
            .map_err(|e| EventError::SendFailed {
                message: e.to_string(),
            })?;
        Ok(())
    }

    /// Publishes a diagnostic to all diagnostics subscribers
    pub async fn publish_diagnostic(&self, diagnostic: DiagnosticEvent) -> EventResult<()> {
        self.sync_publish_diagnostic(diagnostic)
    }

    /// Publishes a diagnostic from a synchronous context
    pub fn sync_publish_diagnostic(&self, diagnostic: DiagnosticEvent) -> EventResult<()> {
        trace!("Publishing diagnostic: {}", diagnostic);
        self.diagnostic_sender
            .send(diagnostic)
            .map_err(|e| EventError::SendFailed {
                message: e.to_string(),
            })?;
        Ok(())
    }

    pub fn queue_size(&self) -> usize {
        self.event_sender.len()
    }

    pub fn subscribers_size(&self) -> usize {
        self.event_sender.receiver_count()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

/// Receiver for store notifications
pub struct EventReceiver {
    receiver: broadcast::Receiver<StoreEvent>,
}

impl EventReceiver {
    pub fn new(receiver: broadcast::Receiver<StoreEvent>) -> Self {
        Self { receiver }
    }

    /// Receive the next notification. On lag the receiver is resubscribed
    /// at the head of the stream and the number of skipped events is
    /// reported; call `recv` again to continue.
    pub async fn recv(&mut self) -> EventResult<StoreEvent> {
        match self.receiver.recv().await {
            Ok(event) => Ok(event),
            Err(broadcast::error::RecvError::Lagged(n)) => {
                self.receiver = self.receiver.resubscribe();
                Err(EventError::Lagged { count: n })
            }
            Err(e) => Err(EventError::ReceiveFailed {
                message: e.to_string(),
            }),
        }
    }
}

/// Receiver for diagnostics
pub struct DiagnosticReceiver {
    receiver: broadcast::Receiver<DiagnosticEvent>,
}

impl DiagnosticReceiver {
    pub fn new(receiver: broadcast::Receiver<DiagnosticEvent>) -> Self {
        Self { receiver }
    }

    /// Receive the next diagnostic, with the same lag behavior as
    /// [`EventReceiver::recv`]
    pub async fn recv(&mut self) -> EventResult<DiagnosticEvent> {
        match self.receiver.recv().await {
            Ok(diagnostic) => Ok(diagnostic),
            Err(broadcast::error::RecvError::Lagged(n)) => {
                self.receiver = self.receiver.resubscribe();
                Err(EventError::Lagged { count: n })
            }
            Err(e) => Err(EventError::ReceiveFailed {
                message: e.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_publish_and_receive() {
        let bus = EventBus::new(16);
        let (mut events, _diagnostics) = bus.subscribe();

        bus.sync_publish(StoreEvent::MemoriesChanged).unwrap();
        assert_eq!(events.recv().await.unwrap(), StoreEvent::MemoriesChanged);
    }

    #[tokio::test]
    async fn test_diagnostics_channel_is_separate() {
        let bus = EventBus::new(16);
        let (_events, mut diagnostics) = bus.subscribe();

        bus.sync_publish(StoreEvent::MemoriesChanged).unwrap();
        bus.sync_publish_diagnostic(DiagnosticEvent::SaveFailed {
            reason: "disk full".to_string(),
        })
        .unwrap();

        // Only the diagnostic arrives on this receiver.
        let received = diagnostics.recv().await.unwrap();
        assert_eq!(
            received,
            DiagnosticEvent::SaveFailed {
                reason: "disk full".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_publish_without_subscribers_succeeds() {
        // The internal receiver keeps the channel open even with no
        // external subscribers.
        let bus = EventBus::new(16);
        assert!(bus.sync_publish(StoreEvent::SaveCompleted).is_ok());
    }

    #[tokio::test]
    async fn test_multiple_subscribers_receive_same_event() {
        let bus = EventBus::new(16);
        let (mut first, _) = bus.subscribe();
        let (mut second, _) = bus.subscribe();

        bus.sync_publish(StoreEvent::MemoriesChanged).unwrap();

        assert_eq!(first.recv().await.unwrap(), StoreEvent::MemoriesChanged);
        assert_eq!(second.recv().await.unwrap(), StoreEvent::MemoriesChanged);
    }

    #[tokio::test]
    async fn test_lagged_receiver_reports_and_recovers() {
        let bus = EventBus::new(2);
        let (mut events, _) = bus.subscribe();

        for _ in 0..5 {
            bus.sync_publish(StoreEvent::MemoriesChanged).unwrap();
        }

        match events.recv().await {
            Err(EventError::Lagged { count }) => assert!(count > 0),
            other => panic!("expected lag, got {:?}", other.map(|e| e.to_string())),
        }

        // After resubscribing, newly published events flow again.
        bus.sync_publish(StoreEvent::SaveCompleted).unwrap();
        assert_eq!(events.recv().await.unwrap(), StoreEvent::SaveCompleted);
    }
}
