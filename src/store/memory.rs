//! In-memory record store.
//!
//! DashMap-backed implementation of [`RecordStore`] for tests and
//! single-node embedding. Scans are full-table; fine at the scale the
//! prefix index is designed for.

use async_trait::async_trait;
use dashmap::DashMap;
use serde_json::Value;
use std::sync::Arc;

use super::RecordStore;
use crate::types::Result;

/// Concurrent in-memory document store
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    documents: Arc<DashMap<String, Value>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored documents
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn put(&self, key: &str, attributes: Value) -> Result<()> {
        self.documents.insert(key.to_string(), attributes);
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<Value>> {
        Ok(self.documents.get(key).map(|entry| entry.value().clone()))
    }

    async fn scan_prefix(&self, attribute: &str, prefix: &str) -> Result<Vec<Value>> {
        let matches = self
            .documents
            .iter()
            .filter(|entry| {
                entry
                    .value()
                    .get(attribute)
                    .and_then(Value::as_str)
                    .is_some_and(|s| s.starts_with(prefix))
            })
            .map(|entry| entry.value().clone())
            .collect();
        Ok(matches)
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.documents.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_put_get_delete() {
        let store = MemoryStore::new();
        store
            .put("landmark:1", json!({"name": "Tent City"}))
            .await
            .unwrap();

        let doc = store.get("landmark:1").await.unwrap().unwrap();
        assert_eq!(doc["name"], "Tent City");

        store.delete("landmark:1").await.unwrap();
        assert!(store.get("landmark:1").await.unwrap().is_none());
        // Deleting again is a no-op
        store.delete("landmark:1").await.unwrap();
    }

    #[tokio::test]
    async fn test_scan_prefix_matches_attribute() {
        let store = MemoryStore::new();
        store
            .put("landmark:1", json!({"geohash": "sxk97ch2bxyz"}))
            .await
            .unwrap();
        store
            .put("landmark:2", json!({"geohash": "sxk97dq01234"}))
            .await
            .unwrap();
        store
            .put("landmark:3", json!({"geohash": "u4pruydqqvj0"}))
            .await
            .unwrap();
        // Document without the attribute is never matched
        store.put("report:1", json!({"text": "hi"})).await.unwrap();

        let hits = store.scan_prefix("geohash", "sxk97").await.unwrap();
        assert_eq!(hits.len(), 2);

        let hits = store.scan_prefix("geohash", "sxk97c").await.unwrap();
        assert_eq!(hits.len(), 1);

        let hits = store.scan_prefix("geohash", "zzz").await.unwrap();
        assert!(hits.is_empty());
    }
}
