//! Recipient resolution: who is close enough to an event to be notified.

use tracing::debug;

use crate::geo::{distance_km, Coordinate};
use crate::model::Recipient;

/// Filters a recipient pool down to those within the notification radius.
///
/// Recipients missing a last-known location or a device token are skipped
/// silently; that is a data-quality gap on the recipient, not a failure of
/// the resolution.
pub struct RecipientResolver {
    radius_km: f64,
}

impl RecipientResolver {
    pub fn new(radius_km: f64) -> Self {
        Self { radius_km }
    }

    /// Recipients with both a coordinate and a device token, within the
    /// configured radius of `event`.
    pub fn find_nearby<'a>(
        &self,
        event: Coordinate,
        recipients: &'a [Recipient],
    ) -> Vec<&'a Recipient> {
        let nearby: Vec<&Recipient> = recipients
            .iter()
            .filter(|r| {
                let (Some(coord), Some(token)) = (&r.coordinate, &r.device_token) else {
                    debug!(user_id = %r.user_id, "Skipping recipient without location or token");
                    return false;
                };
                !token.is_empty() && distance_km(event, *coord) <= self.radius_km
            })
            .collect();

        debug!(
            pool = recipients.len(),
            nearby = nearby.len(),
            radius_km = self.radius_km,
            "Resolved nearby recipients"
        );
        nearby
    }
}
