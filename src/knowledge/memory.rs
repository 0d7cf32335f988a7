//! In-memory knowledge base
//!
//! Backs tests and single-process deployments. Production deployments point
//! the hub at an external graph store through the same [`KnowledgeStore`]
//! trait.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

use super::KnowledgeStore;
use crate::config::KnowledgeConfig;
use crate::error::KnowledgeError;
use crate::types::{ModuleSchema, TransformRule};

/// In-memory schema and integration-rule tables
#[derive(Default)]
pub struct MemoryKnowledgeBase {
    /// Module configuration schemas keyed by module id
    schemas: RwLock<HashMap<String, ModuleSchema>>,
    /// Pair presence means integration is allowed; the rule list may be empty
    integrations: RwLock<HashMap<(String, String), Vec<TransformRule>>>,
}

impl MemoryKnowledgeBase {
    /// Create an empty knowledge base
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a knowledge base from static configuration
    pub fn from_config(config: &KnowledgeConfig) -> Self {
        let schemas = config
            .schemas
            .iter()
            .map(|(id, schema)| (id.clone(), schema.clone()))
            .collect();
        let integrations = config
            .integrations
            .iter()
            .map(|i| ((i.source.clone(), i.target.clone()), i.rules.clone()))
            .collect();

        debug!(
            "Loaded knowledge base: {} schemas, {} integrations",
            config.schemas.len(),
            config.integrations.len()
        );

        Self {
            schemas: RwLock::new(schemas),
            integrations: RwLock::new(integrations),
        }
    }

    /// Register or replace the schema for a module
    pub async fn put_schema(&self, module_id: impl Into<String>, schema: ModuleSchema) {
        self.schemas.write().await.insert(module_id.into(), schema);
    }

    /// Allow integration from `source` to `target` with the given rules.
    ///
    /// An empty rule list still marks the pair as allowed.
    pub async fn allow_integration(
        &self,
        source: impl Into<String>,
        target: impl Into<String>,
        rules: Vec<TransformRule>,
    ) {
        self.integrations
            .write()
            .await
            .insert((source.into(), target.into()), rules);
    }
}

#[async_trait]
impl KnowledgeStore for MemoryKnowledgeBase {
    async fn lookup_schema(
        &self,
        module_id: &str,
    ) -> Result<Option<ModuleSchema>, KnowledgeError> {
        Ok(self.schemas.read().await.get(module_id).cloned())
    }

    async fn is_integration_allowed(
        &self,
        source: &str,
        target: &str,
    ) -> Result<bool, KnowledgeError> {
        let key = (source.to_string(), target.to_string());
        Ok(self.integrations.read().await.contains_key(&key))
    }

    async fn transformation_rules(
        &self,
        source: &str,
        target: &str,
    ) -> Result<Vec<TransformRule>, KnowledgeError> {
        let key = (source.to_string(), target.to_string());
        Ok(self
            .integrations
            .read()
            .await
            .get(&key)
            .cloned()
            .unwrap_or_default())
    }
}
