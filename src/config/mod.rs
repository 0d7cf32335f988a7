//! Configuration for the integration hub
//!
//! TOML-backed, with every field defaulted so an empty file yields a
//! working configuration.

use std::collections::HashMap;
use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::types::{ModuleSchema, TransformRule};

/// Top-level hub configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HubConfig {
    /// Delivery router settings
    #[serde(default)]
    pub delivery: DeliveryConfig,

    /// Status notification settings
    #[serde(default)]
    pub notifications: NotificationConfig,

    /// Static knowledge-base content (for deployments without an external
    /// store)
    #[serde(default)]
    pub knowledge: KnowledgeConfig,
}

/// Delivery router configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeliveryConfig {
    /// Timeout for synchronous module API calls, in seconds
    #[serde(default = "default_delivery_timeout")]
    pub timeout_seconds: u64,
}

fn default_delivery_timeout() -> u64 {
    30
}

impl Default for DeliveryConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: default_delivery_timeout(),
        }
    }
}

/// Status notification configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationConfig {
    /// Buffered status events per subscriber
    #[serde(default = "default_notification_buffer")]
    pub buffer: usize,
}

fn default_notification_buffer() -> usize {
    1024
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            buffer: default_notification_buffer(),
        }
    }
}

/// Static knowledge-base content
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct KnowledgeConfig {
    /// Module configuration schemas keyed by module id
    #[serde(default)]
    pub schemas: HashMap<String, ModuleSchema>,

    /// Allowed integrations with their transformation rules
    #[serde(default)]
    pub integrations: Vec<IntegrationConfig>,
}

/// One allowed (source, target) integration and its rules
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IntegrationConfig {
    /// Source module id
    pub source: String,
    /// Target module id
    pub target: String,
    /// Ordered transformation rules; empty still marks the pair as allowed
    #[serde(default)]
    pub rules: Vec<TransformRule>,
}

impl HubConfig {
    /// Load configuration from a TOML file
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        Ok(config)
    }
}
