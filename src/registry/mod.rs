//! Module registry
//!
//! In-memory table of registered modules, their configuration, lifecycle
//! status, and delivery counters. The outer map lock covers only lookup and
//! insert; each entry is `Arc`-shared with its own lock and atomic counters,
//! so operations on unrelated modules never serialize behind each other and
//! no lock is ever held across a network call.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::error::HubError;
use crate::notify::StatusNotifier;
use crate::types::{MetricsSnapshot, ModuleConfig, ModuleRecord, ModuleStatus};

/// Live registry entry for one module
struct ModuleEntry {
    module_id: String,
    /// Config and status, mutated in place under the entry lock
    state: RwLock<ModuleState>,
    success_count: AtomicU64,
    failure_count: AtomicU64,
}

struct ModuleState {
    config: ModuleConfig,
    status: ModuleStatus,
}

impl ModuleEntry {
    async fn snapshot(&self) -> ModuleRecord {
        let state = self.state.read().await;
        ModuleRecord {
            module_id: self.module_id.clone(),
            config: state.config.clone(),
            status: state.status,
            metrics: MetricsSnapshot {
                success_count: self.success_count.load(Ordering::Relaxed),
                failure_count: self.failure_count.load(Ordering::Relaxed),
            },
        }
    }
}

/// Concurrency-safe table of registered modules
pub struct ModuleRegistry {
    modules: RwLock<HashMap<String, Arc<ModuleEntry>>>,
    notifier: Arc<StatusNotifier>,
}

impl ModuleRegistry {
    /// Create an empty registry emitting status events on `notifier`
    pub fn new(notifier: Arc<StatusNotifier>) -> Self {
        Self {
            modules: RwLock::new(HashMap::new()),
            notifier,
        }
    }

    /// Register a new module.
    ///
    /// Insert-if-absent: fails with [`HubError::DuplicateModule`] when the
    /// id is taken, leaving the existing record untouched. New modules start
    /// `Active` with zero counters. Emits a registration notification.
    pub async fn register(&self, module_id: &str, config: ModuleConfig) -> Result<(), HubError> {
        {
            let mut modules = self.modules.write().await;
            if modules.contains_key(module_id) {
                return Err(HubError::DuplicateModule(module_id.to_string()));
            }
            modules.insert(
                module_id.to_string(),
                Arc::new(ModuleEntry {
                    module_id: module_id.to_string(),
                    state: RwLock::new(ModuleState {
                        config,
                        status: ModuleStatus::Active,
                    }),
                    success_count: AtomicU64::new(0),
                    failure_count: AtomicU64::new(0),
                }),
            );
        }

        info!("Registered module {}", module_id);
        self.notifier.emit(format!("Module {module_id} registered."));
        Ok(())
    }

    /// Snapshot a module's record; absence is a normal result
    pub async fn get(&self, module_id: &str) -> Option<ModuleRecord> {
        let entry = self.modules.read().await.get(module_id).cloned()?;
        Some(entry.snapshot().await)
    }

    /// Whether a module is registered
    pub async fn contains(&self, module_id: &str) -> bool {
        self.modules.read().await.contains_key(module_id)
    }

    /// Atomically bump one outcome counter for a module.
    ///
    /// Returns `false` when the module is not registered; the outcome is
    /// dropped rather than treated as an error.
    pub async fn record_outcome(&self, module_id: &str, success: bool) -> bool {
        let entry = match self.modules.read().await.get(module_id).cloned() {
            Some(entry) => entry,
            None => {
                debug!("Outcome for unregistered module {} dropped", module_id);
                return false;
            }
        };

        if success {
            entry.success_count.fetch_add(1, Ordering::Relaxed);
        } else {
            entry.failure_count.fetch_add(1, Ordering::Relaxed);
        }
        true
    }

    /// Update a module's lifecycle status in place
    pub async fn set_status(&self, module_id: &str, status: ModuleStatus) -> Result<(), HubError> {
        let entry = self.entry(module_id).await?;
        entry.state.write().await.status = status;
        debug!("Module {} status set to {:?}", module_id, status);
        Ok(())
    }

    /// Replace a module's configuration in place
    pub async fn update_config(
        &self,
        module_id: &str,
        config: ModuleConfig,
    ) -> Result<(), HubError> {
        let entry = self.entry(module_id).await?;
        entry.state.write().await.config = config;
        debug!("Module {} config updated", module_id);
        Ok(())
    }

    /// Current counters for a module
    pub async fn metrics(&self, module_id: &str) -> Option<MetricsSnapshot> {
        let entry = self.modules.read().await.get(module_id).cloned()?;
        Some(MetricsSnapshot {
            success_count: entry.success_count.load(Ordering::Relaxed),
            failure_count: entry.failure_count.load(Ordering::Relaxed),
        })
    }

    /// Ids of all registered modules
    pub async fn list_modules(&self) -> Vec<String> {
        self.modules.read().await.keys().cloned().collect()
    }

    async fn entry(&self, module_id: &str) -> Result<Arc<ModuleEntry>, HubError> {
        self.modules
            .read()
            .await
            .get(module_id)
            .cloned()
            .ok_or_else(|| HubError::UnknownModule(module_id.to_string()))
    }
}
