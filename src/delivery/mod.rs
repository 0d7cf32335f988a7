//! Delivery routing
//!
//! Chooses between a synchronous call to the target module's own API and an
//! asynchronous topic publish, based on the target's registration config.
//! The choice is a static property of the target: a failed path is never
//! retried on the other.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tracing::debug;

use crate::broker::{data_topic, PublishTransport};
use crate::config::DeliveryConfig;
use crate::error::DeliveryError;
use crate::types::{ModuleRecord, Payload};

/// Routes transformed payloads to their target module
pub struct DeliveryRouter {
    http: reqwest::Client,
    broker: Arc<dyn PublishTransport>,
}

impl DeliveryRouter {
    /// Create a router with the configured API-call timeout
    pub fn new(config: &DeliveryConfig, broker: Arc<dyn PublishTransport>) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { http, broker })
    }

    /// Deliver `payload` to `target`.
    ///
    /// Returns the endpoint's response payload on the synchronous path and
    /// `None` on the publish path. Publish is fire-and-forget: `None` only
    /// means the transport accepted the message, not that the module
    /// consumed it.
    pub async fn deliver(
        &self,
        target: &ModuleRecord,
        payload: Payload,
    ) -> Result<Option<Payload>, DeliveryError> {
        match target.config.endpoint.as_deref() {
            Some(endpoint) => self
                .call_module_api(target, endpoint, payload)
                .await
                .map(Some),
            None => {
                let topic = data_topic(&target.module_id);
                debug!("Publishing payload for module {} to {}", target.module_id, topic);
                self.broker.publish(&topic, &payload).await?;
                Ok(None)
            }
        }
    }

    /// Authenticated `POST {endpoint}/integrate` with the payload as body
    async fn call_module_api(
        &self,
        target: &ModuleRecord,
        endpoint: &str,
        payload: Payload,
    ) -> Result<Payload, DeliveryError> {
        let url = format!("{}/integrate", endpoint.trim_end_matches('/'));
        debug!("Calling module {} API at {}", target.module_id, url);

        let mut request = self.http.post(&url).json(&payload);
        if let Some(api_key) = target.config.api_key.as_deref() {
            request = request.bearer_auth(api_key);
        }

        let response = request.send().await.map_err(|e| DeliveryError::Request {
            module_id: target.module_id.clone(),
            source: e,
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DeliveryError::Endpoint {
                module_id: target.module_id.clone(),
                status: status.as_u16(),
                body,
            });
        }

        response
            .json::<Payload>()
            .await
            .map_err(|e| DeliveryError::InvalidResponse {
                module_id: target.module_id.clone(),
                reason: e.to_string(),
            })
    }
}
