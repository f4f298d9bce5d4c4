//! Radius queries: coarse prefix candidates refined by exact distance.

use tracing::debug;

use crate::geo::{distance_km, Coordinate};
use crate::index::ProximityIndex;
use crate::model::Landmark;
use crate::types::Result;

/// Answers "all landmarks within R km of a point".
///
/// The prefix scan in [`ProximityIndex`] guarantees no false negatives
/// through its one-cell-coarser widening; the exact Haversine filter here
/// removes the false positives the coarse cells admit.
#[derive(Clone)]
pub struct RadiusQueryEngine {
    index: ProximityIndex,
}

impl RadiusQueryEngine {
    pub fn new(index: ProximityIndex) -> Self {
        Self { index }
    }

    /// Exactly the stored landmarks whose great-circle distance to `coord`
    /// is at most `radius_km`. An empty result is a valid result.
    pub async fn find_within(&self, coord: Coordinate, radius_km: f64) -> Result<Vec<Landmark>> {
        let candidates = self.index.query_prefix(coord, radius_km).await?;
        let total = candidates.len();

        let matches: Vec<Landmark> = candidates
            .into_iter()
            .filter(|landmark| distance_km(coord, landmark.coordinate) <= radius_km)
            .collect();

        debug!(
            radius_km,
            candidates = total,
            matches = matches.len(),
            "Radius query complete"
        );
        Ok(matches)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::LandmarkCategory;
    use crate::store::MemoryStore;
    use std::sync::Arc;

    fn landmark_at(name: &str, lat: f64, lon: f64) -> Landmark {
        Landmark::new(
            name,
            None,
            LandmarkCategory::WaterSource,
            Coordinate::new(lat, lon).unwrap(),
            "test",
        )
    }

    async fn engine_with(landmarks: &[Landmark]) -> RadiusQueryEngine {
        let index = ProximityIndex::new(Arc::new(MemoryStore::new()));
        for landmark in landmarks {
            index.insert(landmark).await.unwrap();
        }
        RadiusQueryEngine::new(index)
    }

    #[tokio::test]
    async fn test_no_false_negatives_across_cell_boundary() {
        // (0, 0) and (0, 0.01 deg) are ~1.11 km apart but land in different
        // geohash cells; the coarser widening must still find both.
        let engine = engine_with(&[
            landmark_at("origin", 0.0, 0.0),
            landmark_at("east", 0.0, 0.01),
        ])
        .await;

        let hits = engine
            .find_within(Coordinate::new(0.0, 0.0).unwrap(), 2.0)
            .await
            .unwrap();
        assert_eq!(hits.len(), 2);
    }

    #[tokio::test]
    async fn test_no_false_positives() {
        // (0, 1 deg) is ~111 km from the origin; a 5 km query must not
        // return it even if a coarse cell admits it as a candidate.
        let engine = engine_with(&[landmark_at("far", 0.0, 1.0)]).await;

        let hits = engine
            .find_within(Coordinate::new(0.0, 0.0).unwrap(), 5.0)
            .await
            .unwrap();
        assert!(hits.is_empty());
    }

    #[tokio::test]
    async fn test_empty_index_is_valid() {
        let engine = engine_with(&[]).await;
        let hits = engine
            .find_within(Coordinate::new(41.0, 29.0).unwrap(), 10.0)
            .await
            .unwrap();
        assert!(hits.is_empty());
    }

    #[tokio::test]
    async fn test_exact_boundary_included() {
        // One degree of latitude is ~111.19 km; query with that radius
        // should include the point sitting right on it.
        let engine = engine_with(&[landmark_at("north", 1.0, 0.0)]).await;
        let origin = Coordinate::new(0.0, 0.0).unwrap();
        let radius = distance_km(origin, Coordinate::new(1.0, 0.0).unwrap());

        let hits = engine.find_within(origin, radius).await.unwrap();
        assert_eq!(hits.len(), 1);
    }
}
