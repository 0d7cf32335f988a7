//! Knowledge store interface
//!
//! Typed window onto the external graph store holding module schemas,
//! integration permissions, and transformation rules. The store's query
//! language and persistence belong to the collaborator; the hub consumes
//! only this surface.

mod memory;

pub use memory::MemoryKnowledgeBase;

use async_trait::async_trait;

use crate::error::{HubError, KnowledgeError, SchemaError};
use crate::types::{ModuleConfig, ModuleSchema, TransformRule};

/// Query surface the hub consumes from the knowledge store
#[async_trait]
pub trait KnowledgeStore: Send + Sync {
    /// Look up the configuration schema registered for a module
    async fn lookup_schema(
        &self,
        module_id: &str,
    ) -> Result<Option<ModuleSchema>, KnowledgeError>;

    /// Whether data may flow from `source` to `target`.
    ///
    /// Unknown pairs answer `false`; `Err` is reserved for store
    /// unavailability.
    async fn is_integration_allowed(
        &self,
        source: &str,
        target: &str,
    ) -> Result<bool, KnowledgeError>;

    /// Ordered transformation rules for a (source, target) pair.
    ///
    /// An allowed pair with no rules yields an empty list, not an error.
    async fn transformation_rules(
        &self,
        source: &str,
        target: &str,
    ) -> Result<Vec<TransformRule>, KnowledgeError>;

    /// Validate a module configuration against its registered schema.
    ///
    /// Fails with [`SchemaError::NotFound`] when the store has no schema
    /// entry for the module, and [`SchemaError::MissingField`] when the
    /// configuration does not satisfy the schema's required shape.
    async fn validate_schema(
        &self,
        module_id: &str,
        config: &ModuleConfig,
    ) -> Result<(), HubError> {
        let schema = self
            .lookup_schema(module_id)
            .await?
            .ok_or_else(|| SchemaError::NotFound(module_id.to_string()))?;

        for field in &schema.required {
            if !config.has_field(field) {
                return Err(SchemaError::MissingField {
                    module_id: module_id.to_string(),
                    field: field.clone(),
                }
                .into());
            }
        }

        Ok(())
    }
}
