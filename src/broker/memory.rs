//! In-process broker
//!
//! Per-topic broadcast channels created lazily on first subscription.
//! Messages published to a topic nobody subscribes to are dropped, which
//! matches the fire-and-forget contract.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tokio::sync::{broadcast, RwLock};
use tracing::debug;

use super::PublishTransport;
use crate::error::TransportError;
use crate::types::Payload;

/// Channel-backed publish transport for single-process deployments and tests
pub struct MemoryBroker {
    topics: RwLock<HashMap<String, broadcast::Sender<Payload>>>,
    shut_down: AtomicBool,
    capacity: usize,
}

impl MemoryBroker {
    /// Create a broker with the default per-topic buffer
    pub fn new() -> Self {
        Self::with_capacity(1024)
    }

    /// Create a broker buffering up to `capacity` messages per topic
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            topics: RwLock::new(HashMap::new()),
            shut_down: AtomicBool::new(false),
            capacity,
        }
    }

    /// Subscribe to a topic, creating it if needed
    pub async fn subscribe(&self, topic: &str) -> broadcast::Receiver<Payload> {
        let mut topics = self.topics.write().await;
        topics
            .entry(topic.to_string())
            .or_insert_with(|| broadcast::channel(self.capacity).0)
            .subscribe()
    }

    /// Stop accepting publishes; subsequent calls fail with
    /// [`TransportError::Closed`]
    pub fn shutdown(&self) {
        self.shut_down.store(true, Ordering::Relaxed);
    }
}

impl Default for MemoryBroker {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PublishTransport for MemoryBroker {
    async fn publish(&self, topic: &str, payload: &Payload) -> Result<(), TransportError> {
        if self.shut_down.load(Ordering::Relaxed) {
            return Err(TransportError::Closed);
        }

        let topics = self.topics.read().await;
        match topics.get(topic) {
            Some(sender) => {
                if sender.send(payload.clone()).is_err() {
                    // All receivers gone; fire-and-forget, so not an error
                    debug!("No subscribers on topic {}, message dropped", topic);
                }
            }
            None => {
                debug!("No subscribers on topic {}, message dropped", topic);
            }
        }

        Ok(())
    }
}
