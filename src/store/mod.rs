//! Record store seam.
//!
//! The proximity index persists through this trait; production deployments
//! back it with whatever document store the host service uses, tests and
//! single-node embeddings use [`memory::MemoryStore`]. The only capability
//! the index needs beyond point reads/writes is an attribute-prefix scan
//! with no ordering guarantee.

pub mod memory;

use async_trait::async_trait;
use serde_json::Value;

use crate::types::Result;

pub use memory::MemoryStore;

/// Key-value document store with attribute-prefix range scans.
///
/// All methods fail with [`crate::RelayError::StoreUnavailable`] on I/O
/// failure; retry policy is the caller's concern.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Write (or overwrite) the document stored under `key`.
    async fn put(&self, key: &str, attributes: Value) -> Result<()>;

    /// Read the document stored under `key`, `None` if absent.
    async fn get(&self, key: &str) -> Result<Option<Value>>;

    /// All documents whose string attribute `attribute` begins with
    /// `prefix`. Grouping by prefix is the only ordering guarantee.
    async fn scan_prefix(&self, attribute: &str, prefix: &str) -> Result<Vec<Value>>;

    /// Remove the document stored under `key`, a no-op if absent.
    async fn delete(&self, key: &str) -> Result<()>;
}
