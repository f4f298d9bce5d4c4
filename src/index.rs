//! Proximity index: geohash-prefixed landmark persistence.
//!
//! Each landmark is stored with its full-precision geohash as an indexed
//! attribute, so radius queries become attribute-prefix scans at a coarser
//! precision. The monotonic-prefix property of geohashes (every prefix of a
//! code is the code of the containing cell) is what makes the prefix scan
//! sound.

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, warn};

use crate::geo::{encode, precision_for, Coordinate};
use crate::model::{Landmark, LandmarkCategory};
use crate::store::RecordStore;
use crate::types::{RelayError, Result};

/// Geohash character precision stored on each record.
const INDEX_PRECISION: usize = 12;

/// Store key namespace for landmarks.
const KEY_PREFIX: &str = "landmark:";

/// Name of the indexed geohash attribute.
const GEOHASH_ATTR: &str = "geohash";

/// Landmark store with geohash prefix queries
#[derive(Clone)]
pub struct ProximityIndex {
    store: Arc<dyn RecordStore>,
}

impl ProximityIndex {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    /// Persist a landmark with its full-precision geohash attribute.
    ///
    /// Also the relocation path: re-inserting an existing id re-encodes the
    /// geohash and overwrites the stored record. Store failures propagate as
    /// [`RelayError::StoreUnavailable`]; retrying is the caller's policy.
    pub async fn insert(&self, landmark: &Landmark) -> Result<()> {
        let geohash = encode(landmark.coordinate, INDEX_PRECISION)?;

        let mut doc = serde_json::to_value(landmark)
            .map_err(|e| RelayError::StoreUnavailable(format!("serialize landmark: {e}")))?;
        doc[GEOHASH_ATTR] = Value::String(geohash.clone());

        self.store
            .put(&format!("{KEY_PREFIX}{}", landmark.landmark_id), doc)
            .await?;

        debug!(
            landmark_id = %landmark.landmark_id,
            geohash = %geohash,
            "Indexed landmark"
        );
        Ok(())
    }

    /// Look up a landmark by id.
    pub async fn get(&self, landmark_id: &str) -> Result<Landmark> {
        let doc = self
            .store
            .get(&format!("{KEY_PREFIX}{landmark_id}"))
            .await?
            .ok_or_else(|| RelayError::NotFound(format!("landmark {landmark_id}")))?;
        deserialize_landmark(&doc)
            .ok_or_else(|| RelayError::StoreUnavailable(format!("corrupt landmark {landmark_id}")))
    }

    /// Remove a landmark by id. Removing an absent id is a no-op.
    pub async fn remove(&self, landmark_id: &str) -> Result<()> {
        self.store
            .delete(&format!("{KEY_PREFIX}{landmark_id}"))
            .await
    }

    /// All landmarks in a category, via the category attribute scan.
    pub async fn find_by_category(&self, category: LandmarkCategory) -> Result<Vec<Landmark>> {
        let docs = self.store.scan_prefix("category", category.as_str()).await?;
        Ok(docs.iter().filter_map(deserialize_landmark).collect())
    }

    /// All landmarks created from a given report.
    ///
    /// The scan is prefix-based, so ids that only share a prefix with
    /// `report_id` are filtered out after deserialization.
    pub async fn find_by_report(&self, report_id: &str) -> Result<Vec<Landmark>> {
        let docs = self.store.scan_prefix("reportId", report_id).await?;
        Ok(docs
            .iter()
            .filter_map(deserialize_landmark)
            .filter(|l| l.report_id.as_deref() == Some(report_id))
            .collect())
    }

    /// Coarse candidate set for a radius query around `coord`.
    ///
    /// Scans the geohash prefix at the precision matching `radius_km` plus
    /// the one-character-coarser prefix, so points just across a cell
    /// boundary from the query point are not missed. The two scans are
    /// read-only and issued concurrently; results are deduplicated by id.
    /// Every call performs fresh scans.
    pub async fn query_prefix(&self, coord: Coordinate, radius_km: f64) -> Result<Vec<Landmark>> {
        let precision = precision_for(radius_km)?;
        let code = encode(coord, precision)?;
        let coarser = &code[..precision - 1];

        let (exact, widened) = futures::future::try_join(
            self.store.scan_prefix(GEOHASH_ATTR, &code),
            self.store.scan_prefix(GEOHASH_ATTR, coarser),
        )
        .await?;

        let mut seen = std::collections::HashSet::new();
        let mut candidates = Vec::new();
        for doc in exact.iter().chain(widened.iter()) {
            let Some(landmark) = deserialize_landmark(doc) else {
                warn!("Skipping corrupt landmark document in prefix scan");
                continue;
            };
            if seen.insert(landmark.landmark_id.clone()) {
                candidates.push(landmark);
            }
        }

        debug!(
            prefix = %code,
            radius_km,
            candidates = candidates.len(),
            "Prefix scan complete"
        );
        Ok(candidates)
    }
}

fn deserialize_landmark(doc: &Value) -> Option<Landmark> {
    serde_json::from_value(doc.clone()).ok()
}
