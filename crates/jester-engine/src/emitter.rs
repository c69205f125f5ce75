//! Notification fan-out.
//!
//! The primary channel is a broadcast stream any number of UI components can
//! subscribe to. A [`NotificationSink`] is an optional secondary channel the
//! orchestrator falls back to when nobody is listening.

use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use jester_core::delivery::Notification;
use tokio::sync::broadcast;

use crate::errors::SinkError;

/// Default broadcast channel capacity.
pub const DEFAULT_CAPACITY: usize = 64;

/// Broadcast-based notification emitter.
///
/// Non-blocking: `emit` never awaits. Slow receivers lag rather than block
/// the sender.
pub struct NotificationEmitter {
    tx: broadcast::Sender<Notification>,
    emit_count: AtomicU64,
}

impl NotificationEmitter {
    /// Create an emitter with the default capacity.
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Create an emitter with a custom capacity (at least one).
    pub fn with_capacity(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self {
            tx,
            emit_count: AtomicU64::new(0),
        }
    }

    /// Send to all subscribers. Returns how many received it.
    pub fn emit(&self, notification: Notification) -> usize {
        let _ = self.emit_count.fetch_add(1, Ordering::Relaxed);
        self.tx.send(notification).unwrap_or(0)
    }

    /// Receive every notification emitted after this call.
    pub fn subscribe(&self) -> broadcast::Receiver<Notification> {
        self.tx.subscribe()
    }

    /// Number of live subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }

    /// Total notifications emitted.
    pub fn emit_count(&self) -> u64 {
        self.emit_count.load(Ordering::Relaxed)
    }
}

impl Default for NotificationEmitter {
    fn default() -> Self {
        Self::new()
    }
}

/// Secondary delivery channel, e.g. a system notification bridge.
#[async_trait]
pub trait NotificationSink: Send + Sync {
    /// Name used in logs.
    fn name(&self) -> &str;

    /// Show the notification.
    async fn dispatch(&self, notification: &Notification) -> Result<(), SinkError>;
}
