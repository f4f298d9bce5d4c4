//! Configuration for the relay pipeline.
//!
//! Explicit structs passed into constructors, no environment lookups.

use crate::types::{RelayError, Result};

/// Configuration for recipient resolution and delivery dispatch
#[derive(Debug, Clone)]
pub struct RelayConfig {
    /// Radius around a new landmark within which recipients are notified, km
    pub notification_radius_km: f64,
    /// Additional delivery attempts after the first failure
    pub max_retries: u32,
    /// Maximum concurrent outbound deliveries
    pub max_concurrency: usize,
    /// Android notification channel id carried in the push payload
    pub channel_id: String,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            notification_radius_km: 1.5,
            max_retries: 3,
            max_concurrency: 8,
            channel_id: "landmark_alerts".to_string(),
        }
    }
}

impl RelayConfig {
    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if !self.notification_radius_km.is_finite() || self.notification_radius_km <= 0.0 {
            return Err(RelayError::Configuration(format!(
                "notification_radius_km must be positive, got {}",
                self.notification_radius_km
            )));
        }
        if self.max_concurrency == 0 {
            return Err(RelayError::Configuration(
                "max_concurrency must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = RelayConfig::default();
        assert_eq!(config.notification_radius_km, 1.5);
        assert_eq!(config.max_retries, 3);
        assert_eq!(config.max_concurrency, 8);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_rejects_bad_radius() {
        let config = RelayConfig {
            notification_radius_km: 0.0,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = RelayConfig {
            notification_radius_km: f64::NAN,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_zero_concurrency() {
        let config = RelayConfig {
            max_concurrency: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
