//! Radius-to-precision mapping for prefix scans.

use crate::types::{RelayError, Result};

/// Geohash character precision to scan at for a given search radius.
///
/// Smaller radius, longer prefix, narrower cell, fewer false positives for
/// the exact-distance filter to discard. Tuning constants; the mapping must
/// stay monotonically non-increasing in the radius.
///
/// | radius     | precision | cell height |
/// |------------|-----------|-------------|
/// | <= 0.5 km  | 7         | ~150 m      |
/// | <= 2 km    | 6         | ~1.2 km     |
/// | <= 7 km    | 5         | ~4.9 km     |
/// | <= 30 km   | 4         | ~39 km      |
/// | larger     | 3         | ~156 km     |
pub fn precision_for(radius_km: f64) -> Result<usize> {
    if !radius_km.is_finite() || radius_km <= 0.0 {
        return Err(RelayError::Configuration(format!(
            "search radius must be positive, got {radius_km}"
        )));
    }

    Ok(if radius_km <= 0.5 {
        7
    } else if radius_km <= 2.0 {
        6
    } else if radius_km <= 7.0 {
        5
    } else if radius_km <= 30.0 {
        4
    } else {
        3
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_breakpoints() {
        assert_eq!(precision_for(0.1).unwrap(), 7);
        assert_eq!(precision_for(0.5).unwrap(), 7);
        assert_eq!(precision_for(1.5).unwrap(), 6);
        assert_eq!(precision_for(2.0).unwrap(), 6);
        assert_eq!(precision_for(5.0).unwrap(), 5);
        assert_eq!(precision_for(25.0).unwrap(), 4);
        assert_eq!(precision_for(100.0).unwrap(), 3);
    }

    #[test]
    fn test_monotonically_non_increasing() {
        let radii = [0.1, 0.5, 0.6, 2.0, 2.1, 7.0, 7.1, 30.0, 31.0, 500.0];
        let mut last = usize::MAX;
        for r in radii {
            let p = precision_for(r).unwrap();
            assert!(p <= last, "precision increased at radius {r}");
            last = p;
        }
    }

    #[test]
    fn test_rejects_bad_radius() {
        assert!(precision_for(0.0).is_err());
        assert!(precision_for(-1.0).is_err());
        assert!(precision_for(f64::NAN).is_err());
    }
}
