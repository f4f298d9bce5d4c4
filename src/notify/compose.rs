//! Push message composition.
//!
//! Builds the FCM-over-push-provider wrapper the client devices expect: an
//! outer object with a `default` string and a `GCM` field holding the FCM
//! payload serialized as a JSON string. The shape is load-bearing for
//! deployed clients; change it only together with them.

use serde::Serialize;
use serde_json::json;

use crate::model::{Landmark, Report};

/// Seconds a queued notification stays deliverable.
const TIME_TO_LIVE_SECS: u32 = 86_400;

/// A composed push message, ready for the provider.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PushMessage {
    /// Fallback text for platforms without a specific format
    pub default: String,
    /// FCM payload, pre-serialized as the provider requires
    #[serde(rename = "GCM")]
    pub gcm: String,
}

impl PushMessage {
    /// The full wire form sent to the provider.
    pub fn to_wire(&self) -> String {
        // Serialization of two plain strings cannot fail
        serde_json::to_string(self).unwrap_or_default()
    }
}

/// Build the push message for a newly created landmark.
///
/// `report` is the landmark's associated report, already resolved by id;
/// its free-text info is appended to the body and carried in the data
/// payload. Missing optional fields just omit their message parts.
pub fn compose(landmark: &Landmark, report: Option<&Report>, channel_id: &str) -> PushMessage {
    let info = report
        .and_then(|r| r.additional_info.as_deref())
        .map(str::trim)
        .filter(|s| !s.is_empty());

    let body_suffix = info.map(|s| format!(": {s}")).unwrap_or_default();

    let mut data = json!({
        "landmarkId": landmark.landmark_id,
        "name": landmark.name,
        "location": landmark.location,
        "category": landmark.category.as_str(),
        "latitude": landmark.coordinate.latitude.to_string(),
        "longitude": landmark.coordinate.longitude.to_string(),
    });
    if let Some(info) = info {
        data["additionalInfo"] = json!(info);
    }

    let payload = json!({
        "notification": {
            "title": "New Landmark Alert",
            "body": format!(
                "New {} landmark created: {}{}",
                landmark.category.as_str(),
                landmark.name,
                body_suffix
            ),
            "android_channel_id": channel_id,
            "icon": "ic_notification",
            "sound": "default",
        },
        "data": data,
        "priority": "high",
        "time_to_live": TIME_TO_LIVE_SECS,
    });

    PushMessage {
        default: format!("New landmark alert: {}", landmark.name),
        // Plain JSON value, serialization cannot fail
        gcm: serde_json::to_string(&payload).unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::Coordinate;
    use crate::model::LandmarkCategory;

    fn landmark() -> Landmark {
        Landmark::new(
            "Central Field Hospital",
            Some("Gate 3, stadium grounds".to_string()),
            LandmarkCategory::Hospital,
            Coordinate::new(37.02, 37.36).unwrap(),
            "ops",
        )
    }

    #[test]
    fn test_wire_shape() {
        let message = compose(&landmark(), None, "landmark_alerts");
        assert_eq!(
            message.default,
            "New landmark alert: Central Field Hospital"
        );

        let payload: serde_json::Value = serde_json::from_str(&message.gcm).unwrap();
        assert_eq!(payload["notification"]["title"], "New Landmark Alert");
        assert_eq!(
            payload["notification"]["body"],
            "New HOSPITAL landmark created: Central Field Hospital"
        );
        assert_eq!(payload["notification"]["android_channel_id"], "landmark_alerts");
        assert_eq!(payload["notification"]["icon"], "ic_notification");
        assert_eq!(payload["notification"]["sound"], "default");
        assert_eq!(payload["priority"], "high");
        assert_eq!(payload["time_to_live"], 86400);
        assert_eq!(payload["data"]["category"], "HOSPITAL");
        assert_eq!(payload["data"]["latitude"], "37.02");
        assert!(payload["data"].get("additionalInfo").is_none());
    }

    #[test]
    fn test_report_info_in_body_and_data() {
        let report = Report {
            report_id: "r-1".to_string(),
            additional_info: Some("200 beds available".to_string()),
        };
        let message = compose(&landmark(), Some(&report), "landmark_alerts");

        let payload: serde_json::Value = serde_json::from_str(&message.gcm).unwrap();
        assert_eq!(
            payload["notification"]["body"],
            "New HOSPITAL landmark created: Central Field Hospital: 200 beds available"
        );
        // Data carries the info without the body's ": " prefix
        assert_eq!(payload["data"]["additionalInfo"], "200 beds available");
    }

    #[test]
    fn test_blank_report_info_is_omitted() {
        let report = Report {
            report_id: "r-2".to_string(),
            additional_info: Some("   ".to_string()),
        };
        let message = compose(&landmark(), Some(&report), "landmark_alerts");
        let payload: serde_json::Value = serde_json::from_str(&message.gcm).unwrap();
        assert_eq!(
            payload["notification"]["body"],
            "New HOSPITAL landmark created: Central Field Hospital"
        );
        assert!(payload["data"].get("additionalInfo").is_none());
    }

    #[test]
    fn test_outer_wrapper_keys() {
        let message = compose(&landmark(), None, "landmark_alerts");
        let wire: serde_json::Value = serde_json::from_str(&message.to_wire()).unwrap();
        assert!(wire.get("default").is_some());
        // GCM field is a JSON *string*, as the provider requires
        assert!(wire["GCM"].is_string());
    }
}
