//! Notification composition and push delivery.
//!
//! - [`compose`]: builds the provider wire payload for a landmark event
//! - [`provider`]: the push-provider seam and its error classification
//! - [`dispatch`]: bounded-concurrency fan-out with retry and backoff

pub mod compose;
pub mod dispatch;
pub mod provider;

pub use compose::{compose, PushMessage};
pub use dispatch::{DeliveryDispatcher, DeliveryOutcome, DeliveryStatus, DispatcherStats};
pub use provider::{ProviderError, PushProvider};
