//! Core data model for the integration hub
//!
//! Payloads, module configuration and status, registry snapshots,
//! transformation rules, and configuration schemas.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Untyped payload exchanged between modules.
///
/// A JSON object keyed by field name. `serde_json::Map` keeps the
/// absent-vs-null distinction the transform engine depends on: a missing
/// key and an explicit `null` value are different things.
pub type Payload = serde_json::Map<String, Value>;

/// Module lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModuleStatus {
    /// Module is registered and operational
    Active,
    /// Module is registered but not participating
    Inactive,
    /// Module has been administratively suspended
    Suspended,
}

/// Module configuration
///
/// Opaque key-value configuration supplied at registration. `endpoint` and
/// `api_key` are the only fields the hub itself interprets (they select and
/// authenticate the synchronous delivery path); everything else rides along
/// in `extra` untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModuleConfig {
    /// Base URL of the module's own API; presence selects synchronous delivery
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    /// Bearer token for calls to the module's API
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// Remaining configuration fields, uninterpreted by the hub
    #[serde(flatten)]
    pub extra: Payload,
}

impl ModuleConfig {
    /// Check whether a named configuration field is present
    pub fn has_field(&self, name: &str) -> bool {
        match name {
            "endpoint" => self.endpoint.is_some(),
            "api_key" => self.api_key.is_some(),
            _ => self.extra.contains_key(name),
        }
    }
}

/// Per-module delivery counters at a point in time
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    /// Successful integration attempts originating from this module
    pub success_count: u64,
    /// Failed integration attempts originating from this module
    pub failure_count: u64,
}

/// Point-in-time snapshot of a registered module
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModuleRecord {
    /// Unique module identifier, immutable after registration
    pub module_id: String,
    /// Module configuration as last updated
    pub config: ModuleConfig,
    /// Current lifecycle status
    pub status: ModuleStatus,
    /// Delivery counters
    pub metrics: MetricsSnapshot,
}

/// Field-mapping rule scoped to an ordered (source, target) module pair
///
/// Rules come from the knowledge store. A rule missing either descriptor
/// matches no field and is skipped by the transform engine.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TransformRule {
    /// Field to read from the source payload
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_field: Option<String>,
    /// Field to write in the target payload
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_field: Option<String>,
}

impl TransformRule {
    /// Create a well-formed rule mapping `source_field` to `target_field`
    pub fn new(source_field: impl Into<String>, target_field: impl Into<String>) -> Self {
        Self {
            source_field: Some(source_field.into()),
            target_field: Some(target_field.into()),
        }
    }

    /// Both descriptors, if the rule is well-formed
    pub(crate) fn fields(&self) -> Option<(&str, &str)> {
        match (self.source_field.as_deref(), self.target_field.as_deref()) {
            (Some(source), Some(target)) => Some((source, target)),
            _ => None,
        }
    }
}

/// Configuration schema for a module
///
/// A configuration satisfies the schema when every required field name is
/// present (typed or extra).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModuleSchema {
    /// Field names the module's configuration must carry
    #[serde(default)]
    pub required: Vec<String>,
}
