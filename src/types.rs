//! Error taxonomy and crate-wide result alias.

use thiserror::Error;

/// Crate-wide result alias
pub type Result<T> = std::result::Result<T, RelayError>;

/// Errors surfaced synchronously by indexing, querying, and provisioning.
///
/// Per-recipient delivery errors are deliberately absent: the dispatcher
/// captures those in [`crate::notify::DeliveryOutcome`] so one bad recipient
/// never fails a batch.
#[derive(Debug, Error)]
pub enum RelayError {
    /// Bad input at a boundary (invalid coordinate, precision, radius).
    /// Rejected immediately, never retried.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Backing record store I/O failure. Propagated to the caller; this
    /// layer does not retry storage writes.
    #[error("record store unavailable: {0}")]
    StoreUnavailable(String),

    /// Lookup for a key that is not present in the store.
    #[error("not found: {0}")]
    NotFound(String),

    /// Could not provision a delivery endpoint for a device token.
    /// Terminal for that recipient only.
    #[error("endpoint provisioning failed: {0}")]
    Provisioning(String),
}
