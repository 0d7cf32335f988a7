//! Hub status notifications
//!
//! One-way, human-readable status events for dashboards and monitoring.
//! Delivery is best-effort: a notification nobody consumes is logged and
//! discarded, and no hub operation ever fails because of it.

use tokio::sync::broadcast;
use tracing::debug;

/// One-way status event channel
pub struct StatusNotifier {
    tx: broadcast::Sender<String>,
}

impl StatusNotifier {
    /// Create a notifier buffering up to `buffer` events per subscriber
    pub fn new(buffer: usize) -> Self {
        let (tx, _) = broadcast::channel(buffer);
        Self { tx }
    }

    /// Emit a status message to all subscribers
    pub fn emit(&self, message: impl Into<String>) {
        let message = message.into();
        debug!("Status notification: {}", message);
        if self.tx.send(message).is_err() {
            // No subscribers; hub correctness does not depend on
            // notifications being consumed
            debug!("Status notification dropped, no subscribers");
        }
    }

    /// Subscribe to status events
    pub fn subscribe(&self) -> broadcast::Receiver<String> {
        self.tx.subscribe()
    }
}
