//! Outbound publish transport
//!
//! Fire-and-forget topic publishing for modules that register without an
//! API endpoint. The hub publishes and moves on; there is no consumer
//! acknowledgment and no delivery guarantee beyond what the transport
//! itself provides.

mod memory;

pub use memory::MemoryBroker;

use async_trait::async_trait;

use crate::error::TransportError;
use crate::types::Payload;

/// Topic a module's asynchronous deliveries are published on
pub fn data_topic(module_id: &str) -> String {
    format!("{module_id}_data")
}

/// Fire-and-forget publish primitive
#[async_trait]
pub trait PublishTransport: Send + Sync {
    /// Publish `payload` on `topic`.
    ///
    /// Returns `Err` only when the transport rejects the publish
    /// synchronously (e.g. broker unreachable); absence of subscribers is
    /// not an error.
    async fn publish(&self, topic: &str, payload: &Payload) -> Result<(), TransportError>;
}
