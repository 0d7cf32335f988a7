//! Cross-module integration hub
//!
//! Registers independent AI modules, validates their configuration against
//! a shared schema store, routes data between module pairs according to
//! declared integration rules, and transforms data en route.
//!
//! ## Architecture
//!
//! - [`registry`] — concurrency-safe table of registered modules, their
//!   configuration, status, and delivery counters
//! - [`knowledge`] — typed interface to the external schema/rule store
//! - [`transform`] — pure field-mapping engine
//! - [`delivery`] — routes transformed payloads to the target module,
//!   synchronously (API call) or asynchronously (topic publish)
//! - [`broker`] — fire-and-forget publish transport
//! - [`notify`] — one-way status notifications for dashboards
//! - [`hub`] — the orchestrator tying the above together
//!
//! ## Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use acdeh_hub::broker::MemoryBroker;
//! use acdeh_hub::knowledge::MemoryKnowledgeBase;
//! use acdeh_hub::{IntegrationHub, ModuleConfig, Payload};
//!
//! # async fn run() -> anyhow::Result<()> {
//! let knowledge = Arc::new(MemoryKnowledgeBase::new());
//! let broker = Arc::new(MemoryBroker::new());
//! let hub = IntegrationHub::new(knowledge, broker)?;
//!
//! hub.register_module("vision", ModuleConfig::default()).await?;
//! hub.integrate("vision", "planner", Payload::new()).await?;
//! # Ok(())
//! # }
//! ```

pub mod broker;
pub mod config;
pub mod delivery;
pub mod error;
pub mod hub;
pub mod knowledge;
pub mod notify;
pub mod registry;
pub mod transform;
pub mod types;

pub use config::HubConfig;
pub use error::HubError;
pub use hub::IntegrationHub;
pub use types::{
    MetricsSnapshot, ModuleConfig, ModuleRecord, ModuleSchema, ModuleStatus, Payload,
    TransformRule,
};
