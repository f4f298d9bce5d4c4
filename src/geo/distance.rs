//! Great-circle distance via the Haversine formula.

use super::Coordinate;

/// Mean Earth radius in kilometers.
const EARTH_RADIUS_KM: f64 = 6371.0;

/// Great-circle distance between two coordinates in kilometers.
pub fn distance_km(a: Coordinate, b: Coordinate) -> f64 {
    let d_lat = (b.latitude - a.latitude).to_radians();
    let d_lon = (b.longitude - a.longitude).to_radians();

    let h = (d_lat / 2.0).sin().powi(2)
        + a.latitude.to_radians().cos() * b.latitude.to_radians().cos() * (d_lon / 2.0).sin().powi(2);

    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());
    EARTH_RADIUS_KM * c
}

#[cfg(test)]
mod tests {
    use super::*;

    fn coord(lat: f64, lon: f64) -> Coordinate {
        Coordinate::new(lat, lon).unwrap()
    }

    #[test]
    fn test_identity() {
        let c = coord(41.0, 29.0);
        assert_eq!(distance_km(c, c), 0.0);
    }

    #[test]
    fn test_symmetry() {
        let pairs = [
            (coord(41.01, 28.97), coord(39.93, 32.86)),
            (coord(0.0, 0.0), coord(-33.87, 151.21)),
            (coord(90.0, 0.0), coord(-90.0, 0.0)),
        ];
        for (a, b) in pairs {
            assert!((distance_km(a, b) - distance_km(b, a)).abs() < 1e-9);
        }
    }

    #[test]
    fn test_known_distances() {
        // One degree of longitude at the equator is ~111.19 km
        let d = distance_km(coord(0.0, 0.0), coord(0.0, 1.0));
        assert!((d - 111.19).abs() < 0.5, "got {d}");

        // Istanbul to Ankara is roughly 350 km
        let d = distance_km(coord(41.01, 28.97), coord(39.93, 32.86));
        assert!((d - 350.0).abs() < 10.0, "got {d}");
    }

    #[test]
    fn test_triangle_inequality() {
        let a = coord(10.0, 10.0);
        let b = coord(20.0, 20.0);
        let c = coord(15.0, 30.0);
        assert!(distance_km(a, c) <= distance_km(a, b) + distance_km(b, c) + 1e-9);
    }
}
