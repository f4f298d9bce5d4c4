//! Domain model: landmarks, recipients, and their associated reports.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::geo::Coordinate;

/// What kind of point of interest a landmark marks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LandmarkCategory {
    Hospital,
    Shelter,
    FoodDistribution,
    WaterSource,
    MedicalStation,
    RescueCenter,
    SupplyDepot,
    EmergencyGatheringPoint,
    Other,
}

impl LandmarkCategory {
    /// Wire name, matching the serde representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Hospital => "HOSPITAL",
            Self::Shelter => "SHELTER",
            Self::FoodDistribution => "FOOD_DISTRIBUTION",
            Self::WaterSource => "WATER_SOURCE",
            Self::MedicalStation => "MEDICAL_STATION",
            Self::RescueCenter => "RESCUE_CENTER",
            Self::SupplyDepot => "SUPPLY_DEPOT",
            Self::EmergencyGatheringPoint => "EMERGENCY_GATHERING_POINT",
            Self::Other => "OTHER",
        }
    }

    /// Parse a wire name, falling back to `Other` for anything unrecognized.
    pub fn parse_or_other(s: &str) -> Self {
        match s {
            "HOSPITAL" => Self::Hospital,
            "SHELTER" => Self::Shelter,
            "FOOD_DISTRIBUTION" => Self::FoodDistribution,
            "WATER_SOURCE" => Self::WaterSource,
            "MEDICAL_STATION" => Self::MedicalStation,
            "RESCUE_CENTER" => Self::RescueCenter,
            "SUPPLY_DEPOT" => Self::SupplyDepot,
            "EMERGENCY_GATHERING_POINT" => Self::EmergencyGatheringPoint,
            _ => Self::Other,
        }
    }
}

/// A geo-tagged point of interest.
///
/// The full-precision geohash is computed by the index on insert and stored
/// alongside the record; it is not part of the caller-facing constructor.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Landmark {
    pub landmark_id: String,
    pub name: String,
    /// Human-readable place description shown in notifications
    pub location: String,
    pub category: LandmarkCategory,
    #[serde(default)]
    pub description: Option<String>,
    /// Weak relation to the report this landmark was created from,
    /// resolved by id through the record store
    #[serde(default)]
    pub report_id: Option<String>,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
    pub last_updated: DateTime<Utc>,
    pub active: bool,
    pub coordinate: Coordinate,
}

impl Landmark {
    /// Create a landmark at a coordinate. Generates the id and timestamps;
    /// synthesizes the display location from the coordinate when none is
    /// given.
    pub fn new(
        name: impl Into<String>,
        location: Option<String>,
        category: LandmarkCategory,
        coordinate: Coordinate,
        created_by: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        let location = location.unwrap_or_else(|| {
            format!(
                "Location at {}, {}",
                coordinate.latitude, coordinate.longitude
            )
        });
        Self {
            landmark_id: Uuid::new_v4().to_string(),
            name: name.into(),
            location,
            category,
            description: None,
            report_id: None,
            created_by: created_by.into(),
            created_at: now,
            last_updated: now,
            active: true,
            coordinate,
        }
    }
}

/// A registered recipient of proximity notifications.
///
/// Location and device token are both optional: recipients missing either
/// are skipped during resolution, never treated as errors.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recipient {
    pub user_id: String,
    /// Last known location, if the client has reported one
    #[serde(default)]
    pub coordinate: Option<Coordinate>,
    /// Opaque push token registered by the client device
    #[serde(default)]
    pub device_token: Option<String>,
}

/// Free-text report a landmark may have been created from.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub report_id: String,
    #[serde(default)]
    pub additional_info: Option<String>,
}
