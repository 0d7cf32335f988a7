//! Integration hub orchestrator
//!
//! Composes the registry, knowledge store, transform engine, and delivery
//! router into the hub's two public operations: module registration and
//! cross-module integration. The hub owns the observable side effects —
//! status notifications and per-module delivery counters.

use std::sync::Arc;

use tokio::sync::broadcast;
use tracing::{error, info};

use crate::broker::PublishTransport;
use crate::config::HubConfig;
use crate::delivery::DeliveryRouter;
use crate::error::HubError;
use crate::knowledge::KnowledgeStore;
use crate::notify::StatusNotifier;
use crate::registry::ModuleRegistry;
use crate::transform::transform;
use crate::types::{ModuleConfig, Payload};

/// Cross-module integration hub
pub struct IntegrationHub {
    registry: Arc<ModuleRegistry>,
    knowledge: Arc<dyn KnowledgeStore>,
    router: DeliveryRouter,
    notifier: Arc<StatusNotifier>,
}

impl IntegrationHub {
    /// Create a hub with default configuration
    pub fn new(
        knowledge: Arc<dyn KnowledgeStore>,
        broker: Arc<dyn PublishTransport>,
    ) -> anyhow::Result<Self> {
        Self::with_config(&HubConfig::default(), knowledge, broker)
    }

    /// Create a hub from configuration
    pub fn with_config(
        config: &HubConfig,
        knowledge: Arc<dyn KnowledgeStore>,
        broker: Arc<dyn PublishTransport>,
    ) -> anyhow::Result<Self> {
        let notifier = Arc::new(StatusNotifier::new(config.notifications.buffer));
        let registry = Arc::new(ModuleRegistry::new(Arc::clone(&notifier)));
        let router = DeliveryRouter::new(&config.delivery, broker)?;

        Ok(Self {
            registry,
            knowledge,
            router,
            notifier,
        })
    }

    /// Register a new module with the hub.
    ///
    /// Validates the configuration against the module's schema before
    /// inserting; a validation failure leaves no trace in the registry.
    pub async fn register_module(
        &self,
        module_id: &str,
        config: ModuleConfig,
    ) -> Result<(), HubError> {
        if self.registry.contains(module_id).await {
            error!("Failed to register module {}: already registered", module_id);
            return Err(HubError::DuplicateModule(module_id.to_string()));
        }

        if let Err(e) = self.knowledge.validate_schema(module_id, &config).await {
            error!("Failed to register module {}: {}", module_id, e);
            return Err(e);
        }

        // The registry insert is insert-if-absent, so a duplicate that
        // raced past the pre-check still loses here.
        self.registry.register(module_id, config).await
    }

    /// Integrate data from `source` to `target`.
    ///
    /// Returns the target endpoint's response payload on the synchronous
    /// delivery path, `None` on the publish path. Outcomes are recorded on
    /// the source module's counters: success on delivery, failure on any
    /// error except an unknown module (which never reaches delivery and
    /// leaves metrics untouched).
    pub async fn integrate(
        &self,
        source: &str,
        target: &str,
        payload: Payload,
    ) -> Result<Option<Payload>, HubError> {
        match self.integrate_inner(source, target, payload).await {
            Ok(result) => {
                self.registry.record_outcome(source, true).await;
                info!("Integrated data from {} to {}", source, target);
                Ok(result)
            }
            Err(e) => {
                if !matches!(e, HubError::UnknownModule(_)) {
                    self.registry.record_outcome(source, false).await;
                }
                error!("Integration from {} to {} failed: {}", source, target, e);
                Err(e)
            }
        }
    }

    async fn integrate_inner(
        &self,
        source: &str,
        target: &str,
        payload: Payload,
    ) -> Result<Option<Payload>, HubError> {
        // Permission precedes existence: an unknown pair answers
        // NoIntegrationRule even when neither module is registered.
        if !self.knowledge.is_integration_allowed(source, target).await? {
            return Err(HubError::NoIntegrationRule {
                source: source.to_string(),
                target: target.to_string(),
            });
        }

        if !self.registry.contains(source).await {
            return Err(HubError::UnknownModule(source.to_string()));
        }
        let target_record = self
            .registry
            .get(target)
            .await
            .ok_or_else(|| HubError::UnknownModule(target.to_string()))?;

        let rules = self.knowledge.transformation_rules(source, target).await?;
        let transformed = transform(&payload, &rules);

        let result = self.router.deliver(&target_record, transformed).await?;
        Ok(result)
    }

    /// The hub's module registry
    pub fn registry(&self) -> &Arc<ModuleRegistry> {
        &self.registry
    }

    /// Subscribe to hub status notifications
    pub fn subscribe_status(&self) -> broadcast::Receiver<String> {
        self.notifier.subscribe()
    }
}
