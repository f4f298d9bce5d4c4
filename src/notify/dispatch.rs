//! Delivery dispatch: bounded-concurrency push fan-out with retry.
//!
//! Each recipient is handled by its own tokio task gated by a semaphore, so
//! a slow or failing recipient never blocks the rest of the batch. Backoff
//! sleeps suspend only that recipient's task. Endpoint provisioning is
//! cached per device token so repeated dispatches reuse endpoints instead
//! of re-creating them.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use serde::Serialize;
use tokio::sync::{watch, Semaphore};
use tracing::{debug, info, warn};

use super::compose::PushMessage;
use super::provider::{ProviderError, PushProvider};
use crate::model::Recipient;
use crate::types::{RelayError, Result};

/// Terminal state of one recipient's delivery.
///
/// Per recipient the machine runs `PENDING -> SENDING -> terminal`, where
/// `SENDING` loops back to itself through a backoff sleep before a retry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DeliveryStatus {
    /// The provider acknowledged the publish
    Delivered,
    /// The provider reported the endpoint permanently invalid; no retries
    PermanentlyFailed,
    /// All retries spent on transient errors; logged and abandoned
    RetryExhausted,
    /// No endpoint could be provisioned for the device token
    ProvisioningFailed,
    /// Cancellation arrived before this recipient's next attempt
    Cancelled,
}

/// Per-recipient result of a batch dispatch.
#[derive(Debug, Clone, Serialize)]
pub struct DeliveryOutcome {
    pub user_id: String,
    pub status: DeliveryStatus,
    /// Publish attempts made (zero when provisioning failed or cancelled
    /// before the first attempt)
    pub attempts: u32,
    /// Last error seen, for non-delivered outcomes
    pub error: Option<String>,
}

/// Running counters across batches.
#[derive(Debug, Default)]
pub struct DispatcherStats {
    pub delivered: AtomicU64,
    pub permanently_failed: AtomicU64,
    pub retry_exhausted: AtomicU64,
    pub provisioning_failed: AtomicU64,
}

/// A provisioned delivery endpoint for one recipient.
#[derive(Debug, Clone)]
struct DeliveryTarget {
    recipient_id: String,
    endpoint: String,
}

/// Fans one message out to many recipients with per-recipient resilience.
pub struct DeliveryDispatcher {
    provider: Arc<dyn PushProvider>,
    /// device token -> provisioned endpoint handle
    endpoints: Arc<DashMap<String, String>>,
    max_retries: u32,
    max_concurrency: usize,
    stats: Arc<DispatcherStats>,
}

impl DeliveryDispatcher {
    pub fn new(provider: Arc<dyn PushProvider>, max_retries: u32, max_concurrency: usize) -> Self {
        Self {
            provider,
            endpoints: Arc::new(DashMap::new()),
            max_retries,
            max_concurrency: max_concurrency.max(1),
            stats: Arc::new(DispatcherStats::default()),
        }
    }

    pub fn stats(&self) -> &DispatcherStats {
        &self.stats
    }

    /// Resolve-or-create the delivery endpoint for a device token.
    ///
    /// Cached per token; concurrent first calls for the same token may both
    /// reach the provider, which is safe because provider-side creation is
    /// idempotent and the cache converges on one handle.
    pub async fn resolve_target(&self, device_token: &str) -> Result<String> {
        resolve_cached(&self.provider, &self.endpoints, device_token)
            .await
            .map_err(|e| RelayError::Provisioning(e.to_string()))
    }

    /// Deliver `message` to every recipient, independently and unordered.
    ///
    /// Always returns the full per-recipient outcome list; partial failure
    /// never fails the batch. When `cancel` flips to true, in-flight
    /// attempts complete but no new attempts or retries start.
    pub async fn send_all(
        &self,
        recipients: Vec<Recipient>,
        message: PushMessage,
        cancel: Option<watch::Receiver<bool>>,
    ) -> Vec<DeliveryOutcome> {
        if recipients.is_empty() {
            return Vec::new();
        }
        info!(recipients = recipients.len(), "Dispatching notification batch");

        let semaphore = Arc::new(Semaphore::new(self.max_concurrency));
        let message = Arc::new(message);
        let mut handles = Vec::with_capacity(recipients.len());

        for recipient in recipients {
            let semaphore = Arc::clone(&semaphore);
            let message = Arc::clone(&message);
            let provider = Arc::clone(&self.provider);
            let endpoints = Arc::clone(&self.endpoints);
            let stats = Arc::clone(&self.stats);
            let cancel = cancel.clone();
            let max_retries = self.max_retries;
            let user_id = recipient.user_id.clone();

            let handle = tokio::spawn(async move {
                // Semaphore closed cannot happen; it lives as long as the batch
                let _permit = match semaphore.acquire_owned().await {
                    Ok(p) => p,
                    Err(_) => {
                        return DeliveryOutcome {
                            user_id: recipient.user_id,
                            status: DeliveryStatus::Cancelled,
                            attempts: 0,
                            error: Some("dispatch pool closed".to_string()),
                        }
                    }
                };
                let outcome = deliver_one(
                    provider,
                    endpoints,
                    &recipient,
                    &message,
                    max_retries,
                    cancel,
                )
                .await;
                record(&stats, &outcome);
                outcome
            });
            handles.push((user_id, handle));
        }

        let mut outcomes = Vec::with_capacity(handles.len());
        for (user_id, handle) in handles {
            match handle.await {
                Ok(outcome) => outcomes.push(outcome),
                // A panicked delivery task must not drop its recipient
                // from the outcome list
                Err(e) => {
                    warn!(user_id = %user_id, error = %e, "Delivery task failed");
                    outcomes.push(DeliveryOutcome {
                        user_id,
                        status: DeliveryStatus::PermanentlyFailed,
                        attempts: 0,
                        error: Some(format!("delivery task failed: {e}")),
                    });
                }
            }
        }

        let delivered = outcomes
            .iter()
            .filter(|o| o.status == DeliveryStatus::Delivered)
            .count();
        info!(
            delivered,
            failed = outcomes.len() - delivered,
            "Notification batch complete"
        );
        outcomes
    }
}

fn record(stats: &DispatcherStats, outcome: &DeliveryOutcome) {
    let counter = match outcome.status {
        DeliveryStatus::Delivered => &stats.delivered,
        DeliveryStatus::PermanentlyFailed => &stats.permanently_failed,
        DeliveryStatus::RetryExhausted => &stats.retry_exhausted,
        DeliveryStatus::ProvisioningFailed => &stats.provisioning_failed,
        DeliveryStatus::Cancelled => return,
    };
    counter.fetch_add(1, Ordering::Relaxed);
}

fn is_cancelled(cancel: &Option<watch::Receiver<bool>>) -> bool {
    cancel.as_ref().is_some_and(|rx| *rx.borrow())
}

/// Deliver to a single recipient: provision, then publish with an explicit
/// retry loop and exponential backoff (1s, 2s, 4s, ...).
async fn deliver_one(
    provider: Arc<dyn PushProvider>,
    endpoints: Arc<DashMap<String, String>>,
    recipient: &Recipient,
    message: &PushMessage,
    max_retries: u32,
    cancel: Option<watch::Receiver<bool>>,
) -> DeliveryOutcome {
    let user_id = recipient.user_id.clone();

    if is_cancelled(&cancel) {
        return DeliveryOutcome {
            user_id,
            status: DeliveryStatus::Cancelled,
            attempts: 0,
            error: None,
        };
    }

    let Some(token) = recipient.device_token.as_deref().filter(|t| !t.is_empty()) else {
        return DeliveryOutcome {
            user_id,
            status: DeliveryStatus::ProvisioningFailed,
            attempts: 0,
            error: Some("recipient has no device token".to_string()),
        };
    };

    // Provisioning failure is terminal for this recipient, never retried
    let target = match resolve_cached(&provider, &endpoints, token).await {
        Ok(endpoint) => DeliveryTarget {
            recipient_id: user_id.clone(),
            endpoint,
        },
        Err(e) => {
            warn!(user_id = %user_id, error = %e, "Endpoint provisioning failed");
            return DeliveryOutcome {
                user_id,
                status: DeliveryStatus::ProvisioningFailed,
                attempts: 0,
                error: Some(e.to_string()),
            };
        }
    };

    let mut attempts = 0u32;
    loop {
        attempts += 1;
        debug!(user_id = %target.recipient_id, attempt = attempts, "Publishing notification");

        match provider.publish(&target.endpoint, message).await {
            Ok(()) => {
                debug!(user_id = %target.recipient_id, attempts, "Notification delivered");
                return DeliveryOutcome {
                    user_id,
                    status: DeliveryStatus::Delivered,
                    attempts,
                    error: None,
                };
            }
            Err(e @ ProviderError::Permanent(_)) => {
                // Endpoint disabled or token invalid: retrying wastes quota
                info!(user_id = %target.recipient_id, error = %e, "Recipient permanently invalid");
                return DeliveryOutcome {
                    user_id,
                    status: DeliveryStatus::PermanentlyFailed,
                    attempts,
                    error: Some(e.to_string()),
                };
            }
            Err(e @ ProviderError::Transient(_)) => {
                let retries_done = attempts - 1;
                if retries_done >= max_retries {
                    warn!(
                        user_id = %target.recipient_id,
                        attempts,
                        error = %e,
                        "Retries exhausted, abandoning recipient"
                    );
                    return DeliveryOutcome {
                        user_id,
                        status: DeliveryStatus::RetryExhausted,
                        attempts,
                        error: Some(e.to_string()),
                    };
                }

                if is_cancelled(&cancel) {
                    return cancelled_outcome(user_id, attempts, &e);
                }
                let delay = Duration::from_secs(2u64.pow(attempts - 1));
                debug!(
                    user_id = %target.recipient_id,
                    delay_secs = delay.as_secs(),
                    "Transient failure, backing off"
                );
                tokio::time::sleep(delay).await;
                if is_cancelled(&cancel) {
                    return cancelled_outcome(user_id, attempts, &e);
                }
            }
        }
    }
}

fn cancelled_outcome(user_id: String, attempts: u32, last: &ProviderError) -> DeliveryOutcome {
    DeliveryOutcome {
        user_id,
        status: DeliveryStatus::Cancelled,
        attempts,
        error: Some(last.to_string()),
    }
}

async fn resolve_cached(
    provider: &Arc<dyn PushProvider>,
    endpoints: &DashMap<String, String>,
    token: &str,
) -> std::result::Result<String, ProviderError> {
    if let Some(endpoint) = endpoints.get(token) {
        return Ok(endpoint.value().clone());
    }
    let endpoint = provider.create_endpoint(token).await?;
    endpoints.insert(token.to_string(), endpoint.clone());
    debug!(endpoint = %endpoint, "Provisioned delivery endpoint");
    Ok(endpoint)
}
