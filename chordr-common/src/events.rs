//! Event types and event bus for the Chordr job lifecycle
//!
//! Events are broadcast via the EventBus and can be serialized for SSE
//! transmission to any connected delivery layer.

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use uuid::Uuid;

/// Job lifecycle events emitted by the analysis service
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ChordrEvent {
    /// New job record created from an upload
    JobCreated {
        job_id: Uuid,
        original_name: String,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Job accepted by a worker, analysis run started
    JobProcessing {
        job_id: Uuid,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Analysis run finished successfully, result document persisted
    JobCompleted {
        job_id: Uuid,
        /// Wall-clock duration of the analysis run in seconds
        processing_time_seconds: f64,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Analysis run terminated with a classified failure
    JobFailed {
        job_id: Uuid,
        /// Human-readable, classified error message
        error: String,
        timestamp: chrono::DateTime<chrono::Utc>,
    },
}

/// Central event distribution bus for job lifecycle events
///
/// Uses tokio::broadcast internally, providing:
/// - Non-blocking publish (slow subscribers don't block producers)
/// - Multiple concurrent subscribers
/// - Automatic cleanup when subscribers drop
#[derive(Clone)]
pub struct EventBus {
    tx: broadcast::Sender<ChordrEvent>,
    capacity: usize,
}

impl EventBus {
    /// Creates a new EventBus with the specified channel capacity
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx, capacity }
    }

    /// Subscribe to all future events
    ///
    /// Events emitted before subscription are not received.
    pub fn subscribe(&self) -> broadcast::Receiver<ChordrEvent> {
        self.tx.subscribe()
    }

    /// Emit an event to all subscribers
    ///
    /// Returns `Ok(subscriber_count)` if at least one subscriber exists.
    pub fn emit(
        &self,
        event: ChordrEvent,
    ) -> std::result::Result<usize, broadcast::error::SendError<ChordrEvent>> {
        self.tx.send(event)
    }

    /// Emit an event, ignoring if no subscribers are listening
    ///
    /// Job lifecycle notifications are advisory; it is acceptable if no
    /// component is currently listening.
    pub fn emit_lossy(&self, event: ChordrEvent) {
        let _ = self.tx.send(event);
    }

    /// Get the current number of active subscribers
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }

    /// Get the configured channel capacity
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
