//! Error types for the integration hub
//!
//! Every failure carries the module id(s) involved so callers can diagnose
//! without inspecting hub state. Configuration errors (duplicate module,
//! schema mismatch, missing permission, unknown module) are distinct from
//! delivery failures so callers never have to string-match.

use thiserror::Error;

/// Schema validation failures
#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("Schema for module {0} not found")]
    NotFound(String),

    #[error("Config for module {module_id} is missing required field '{field}'")]
    MissingField { module_id: String, field: String },
}

/// Knowledge store access failures
///
/// Reserved for store unavailability; "no relationship" and "no rules"
/// are ordinary non-error answers from the store.
#[derive(Debug, Error)]
pub enum KnowledgeError {
    #[error("Knowledge store unavailable: {0}")]
    Unavailable(String),
}

/// Publish transport failures
///
/// Publish is fire-and-forget; only a synchronous rejection by the
/// transport itself surfaces here.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("Publish transport is shut down")]
    Closed,

    #[error("Publish to topic {topic} rejected: {reason}")]
    Rejected { topic: String, reason: String },
}

/// Delivery failures on either routing path
#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("API call to module {module_id} failed with status {status}: {body}")]
    Endpoint {
        module_id: String,
        status: u16,
        body: String,
    },

    #[error("API request to module {module_id} failed: {source}")]
    Request {
        module_id: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Module {module_id} returned an unusable response body: {reason}")]
    InvalidResponse { module_id: String, reason: String },

    #[error(transparent)]
    Transport(#[from] TransportError),
}

/// Top-level hub errors
///
/// `Display`/`Error`/`From` are implemented by hand rather than via
/// `#[derive(Error)]` because the `NoIntegrationRule` variant carries a
/// field named `source` that holds a module id (a `String`), not an error
/// cause. `thiserror` unconditionally treats a field named `source` as the
/// error source (requiring it to implement `std::error::Error`), so the
/// derive cannot express this variant. The impls below reproduce exactly
/// what the derive would have generated for the other variants.
#[derive(Debug)]
pub enum HubError {
    DuplicateModule(String),

    Schema(SchemaError),

    NoIntegrationRule { source: String, target: String },

    UnknownModule(String),

    Delivery(DeliveryError),

    Knowledge(KnowledgeError),
}

impl std::fmt::Display for HubError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HubError::DuplicateModule(id) => write!(f, "Module {} already registered", id),
            HubError::Schema(e) => std::fmt::Display::fmt(e, f),
            HubError::NoIntegrationRule { source, target } => {
                write!(f, "No integration rule between {} and {}", source, target)
            }
            HubError::UnknownModule(id) => write!(f, "Module not found: {}", id),
            HubError::Delivery(e) => std::fmt::Display::fmt(e, f),
            HubError::Knowledge(e) => std::fmt::Display::fmt(e, f),
        }
    }
}

impl std::error::Error for HubError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            // `#[error(transparent)]` delegates `source()` to the inner error.
            HubError::Schema(e) => e.source(),
            HubError::Delivery(e) => e.source(),
            HubError::Knowledge(e) => e.source(),
            HubError::DuplicateModule(_)
            | HubError::NoIntegrationRule { .. }
            | HubError::UnknownModule(_) => None,
        }
    }
}

impl From<SchemaError> for HubError {
    fn from(e: SchemaError) -> Self {
        HubError::Schema(e)
    }
}

impl From<DeliveryError> for HubError {
    fn from(e: DeliveryError) -> Self {
        HubError::Delivery(e)
    }
}

impl From<KnowledgeError> for HubError {
    fn from(e: KnowledgeError) -> Self {
        HubError::Knowledge(e)
    }
}
