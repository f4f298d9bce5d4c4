//! Push provider seam.
//!
//! The dispatcher talks to the platform push service through this trait.
//! Provider errors are classified at this edge into transient (worth a
//! retry) and permanent (abandon the recipient), so the retry loop never
//! needs provider-specific knowledge.

use async_trait::async_trait;
use thiserror::Error;

use super::compose::PushMessage;

/// Provider error codes treated as permanent. Anything else the provider
/// reports is assumed transient and retried with backoff.
///
/// - `EndpointDisabled`: the device unregistered or the token was rejected
/// - `InvalidParameter: Token`: malformed or revoked device token
/// - `NotFound`: the endpoint was deleted out from under us
const PERMANENT_CODES: &[&str] = &["EndpointDisabled", "InvalidParameter: Token", "NotFound"];

/// A push delivery failure, classified for the retry loop.
#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    /// Retryable: throttling, timeouts, 5xx-style provider trouble
    #[error("transient provider error: {0}")]
    Transient(String),

    /// Not retryable: the recipient endpoint is permanently invalid
    #[error("permanent provider error: {0}")]
    Permanent(String),
}

impl ProviderError {
    /// Classify a provider-reported error code into transient or permanent.
    pub fn classify(code: &str, detail: impl Into<String>) -> Self {
        if PERMANENT_CODES.contains(&code) {
            Self::Permanent(detail.into())
        } else {
            Self::Transient(detail.into())
        }
    }

    pub fn is_permanent(&self) -> bool {
        matches!(self, Self::Permanent(_))
    }
}

/// Platform push service: endpoint provisioning plus publish.
#[async_trait]
pub trait PushProvider: Send + Sync {
    /// Resolve-or-create a delivery endpoint for a device token.
    ///
    /// Must be idempotent on the provider side: the same token yields the
    /// same endpoint. Returns the opaque endpoint handle.
    async fn create_endpoint(&self, device_token: &str) -> Result<String, ProviderError>;

    /// Publish a message to an endpoint.
    async fn publish(&self, endpoint: &str, message: &PushMessage) -> Result<(), ProviderError>;
}
