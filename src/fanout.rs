//! The landmark-created pipeline.
//!
//! Wires the index, resolver, composer, and dispatcher into the single
//! entry point the routing layer calls when a landmark is created:
//! index the location, resolve nearby recipients, compose the push
//! message, and fan it out.

use std::sync::Arc;

use serde_json::Value;
use tokio::sync::watch;
use tracing::{info, warn};

use crate::config::RelayConfig;
use crate::geo::Coordinate;
use crate::index::ProximityIndex;
use crate::model::{Landmark, Recipient, Report};
use crate::notify::{compose, DeliveryDispatcher, DeliveryOutcome, PushProvider};
use crate::query::RadiusQueryEngine;
use crate::resolver::RecipientResolver;
use crate::store::RecordStore;
use crate::types::Result;

/// Store key namespace for reports.
const REPORT_KEY_PREFIX: &str = "report:";

/// Outcome of one landmark-created fan-out.
#[derive(Debug)]
pub struct FanoutReport {
    pub landmark_id: String,
    /// Recipients that passed resolution and were dispatched to
    pub resolved: usize,
    pub outcomes: Vec<DeliveryOutcome>,
}

/// End-to-end pipeline: index -> resolve -> compose -> dispatch.
pub struct FanoutPipeline {
    store: Arc<dyn RecordStore>,
    index: ProximityIndex,
    query: RadiusQueryEngine,
    resolver: RecipientResolver,
    dispatcher: DeliveryDispatcher,
    config: RelayConfig,
}

impl FanoutPipeline {
    pub fn new(
        store: Arc<dyn RecordStore>,
        provider: Arc<dyn PushProvider>,
        config: RelayConfig,
    ) -> Result<Self> {
        config.validate()?;
        let index = ProximityIndex::new(Arc::clone(&store));
        Ok(Self {
            query: RadiusQueryEngine::new(index.clone()),
            resolver: RecipientResolver::new(config.notification_radius_km),
            dispatcher: DeliveryDispatcher::new(
                provider,
                config.max_retries,
                config.max_concurrency,
            ),
            index,
            store,
            config,
        })
    }

    pub fn index(&self) -> &ProximityIndex {
        &self.index
    }

    pub fn dispatcher(&self) -> &DeliveryDispatcher {
        &self.dispatcher
    }

    /// Index a new landmark and notify every recipient near it.
    ///
    /// Index failures surface synchronously; per-recipient delivery
    /// failures are captured in the returned outcome list.
    pub async fn landmark_created(
        &self,
        landmark: &Landmark,
        recipient_pool: &[Recipient],
        cancel: Option<watch::Receiver<bool>>,
    ) -> Result<FanoutReport> {
        self.index.insert(landmark).await?;

        let nearby: Vec<Recipient> = self
            .resolver
            .find_nearby(landmark.coordinate, recipient_pool)
            .into_iter()
            .cloned()
            .collect();

        if nearby.is_empty() {
            info!(landmark_id = %landmark.landmark_id, "No nearby recipients to notify");
            return Ok(FanoutReport {
                landmark_id: landmark.landmark_id.clone(),
                resolved: 0,
                outcomes: Vec::new(),
            });
        }

        let report = self.lookup_report(landmark).await;
        let message = compose(landmark, report.as_ref(), &self.config.channel_id);

        let resolved = nearby.len();
        let outcomes = self.dispatcher.send_all(nearby, message, cancel).await;

        Ok(FanoutReport {
            landmark_id: landmark.landmark_id.clone(),
            resolved,
            outcomes,
        })
    }

    /// Read query: all landmarks within `radius_km` of a point.
    pub async fn find_landmarks_near(
        &self,
        coord: Coordinate,
        radius_km: f64,
    ) -> Result<Vec<Landmark>> {
        self.query.find_within(coord, radius_km).await
    }

    /// Persist a report so later landmark notifications can reference it.
    pub async fn save_report(&self, report: &Report) -> Result<()> {
        let doc: Value = serde_json::to_value(report)
            .map_err(|e| crate::RelayError::StoreUnavailable(format!("serialize report: {e}")))?;
        self.store
            .put(&format!("{REPORT_KEY_PREFIX}{}", report.report_id), doc)
            .await
    }

    /// Resolve the landmark's associated report by id.
    ///
    /// Best-effort: the report only enriches the message body, so a failed
    /// or empty lookup degrades to a notification without the extra text
    /// rather than failing the fan-out.
    async fn lookup_report(&self, landmark: &Landmark) -> Option<Report> {
        let report_id = landmark.report_id.as_deref()?;
        match self
            .store
            .get(&format!("{REPORT_KEY_PREFIX}{report_id}"))
            .await
        {
            Ok(Some(doc)) => serde_json::from_value(doc).ok(),
            Ok(None) => None,
            Err(e) => {
                warn!(report_id, error = %e, "Report lookup failed, composing without it");
                None
            }
        }
    }
}
