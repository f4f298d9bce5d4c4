//! Geohash encoding and decoding.
//!
//! A geohash is a base-32 string where each character narrows a
//! latitude/longitude bounding box by five interleaved binary subdivisions
//! (longitude bit first). Shared leading characters denote grid-cell
//! containment: any prefix of a code is the code of the containing coarser
//! cell, which is the property the proximity index's prefix scans rely on.

use super::Coordinate;
use crate::types::{RelayError, Result};

/// Standard geohash base-32 alphabet (no a, i, l, o).
const BASE32: &[u8; 32] = b"0123456789bcdefghjkmnpqrstuvwxyz";

/// Maximum supported code length.
pub const MAX_PRECISION: usize = 12;

/// A decoded geohash cell: its center plus half-width error bounds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Decoded {
    pub center: Coordinate,
    /// Half the latitude span of the cell, degrees
    pub lat_error: f64,
    /// Half the longitude span of the cell, degrees
    pub lon_error: f64,
}

/// Encode a coordinate to a geohash of the given character precision.
pub fn encode(coord: Coordinate, precision: usize) -> Result<String> {
    if precision == 0 || precision > MAX_PRECISION {
        return Err(RelayError::Configuration(format!(
            "geohash precision must be in 1..={MAX_PRECISION}, got {precision}"
        )));
    }

    let mut lat_range = (-90.0_f64, 90.0_f64);
    let mut lon_range = (-180.0_f64, 180.0_f64);
    let mut code = String::with_capacity(precision);
    let mut bits = 0u8;
    let mut bit_count = 0u8;
    let mut even_bit = true; // longitude first

    while code.len() < precision {
        if even_bit {
            let mid = (lon_range.0 + lon_range.1) / 2.0;
            if coord.longitude >= mid {
                bits = (bits << 1) | 1;
                lon_range.0 = mid;
            } else {
                bits <<= 1;
                lon_range.1 = mid;
            }
        } else {
            let mid = (lat_range.0 + lat_range.1) / 2.0;
            if coord.latitude >= mid {
                bits = (bits << 1) | 1;
                lat_range.0 = mid;
            } else {
                bits <<= 1;
                lat_range.1 = mid;
            }
        }
        even_bit = !even_bit;
        bit_count += 1;

        if bit_count == 5 {
            code.push(BASE32[bits as usize] as char);
            bits = 0;
            bit_count = 0;
        }
    }

    Ok(code)
}

/// Decode a geohash back to its cell center and error bounds.
pub fn decode(code: &str) -> Result<Decoded> {
    if code.is_empty() || code.len() > MAX_PRECISION {
        return Err(RelayError::Configuration(format!(
            "geohash length must be in 1..={MAX_PRECISION}, got {}",
            code.len()
        )));
    }

    let mut lat_range = (-90.0_f64, 90.0_f64);
    let mut lon_range = (-180.0_f64, 180.0_f64);
    let mut even_bit = true;

    for ch in code.chars() {
        let value = BASE32
            .iter()
            .position(|&b| b as char == ch)
            .ok_or_else(|| {
                RelayError::Configuration(format!("invalid geohash character '{ch}'"))
            })?;

        for shift in (0..5).rev() {
            let bit = (value >> shift) & 1;
            if even_bit {
                let mid = (lon_range.0 + lon_range.1) / 2.0;
                if bit == 1 {
                    lon_range.0 = mid;
                } else {
                    lon_range.1 = mid;
                }
            } else {
                let mid = (lat_range.0 + lat_range.1) / 2.0;
                if bit == 1 {
                    lat_range.0 = mid;
                } else {
                    lat_range.1 = mid;
                }
            }
            even_bit = !even_bit;
        }
    }

    let center = Coordinate {
        latitude: (lat_range.0 + lat_range.1) / 2.0,
        longitude: (lon_range.0 + lon_range.1) / 2.0,
    };

    Ok(Decoded {
        center,
        lat_error: (lat_range.1 - lat_range.0) / 2.0,
        lon_error: (lon_range.1 - lon_range.0) / 2.0,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn coord(lat: f64, lon: f64) -> Coordinate {
        Coordinate::new(lat, lon).unwrap()
    }

    #[test]
    fn test_known_codes() {
        // Reference values from the original geohash definition
        assert_eq!(encode(coord(57.64911, 10.40744), 11).unwrap(), "u4pruydqqvj");
        assert_eq!(encode(coord(42.6, -5.6), 5).unwrap(), "ezs42");
        assert_eq!(encode(coord(0.0, 0.0), 1).unwrap(), "s");
    }

    #[test]
    fn test_rejects_invalid_precision() {
        assert!(encode(coord(0.0, 0.0), 0).is_err());
        assert!(encode(coord(0.0, 0.0), 13).is_err());
    }

    #[test]
    fn test_rejects_invalid_characters() {
        assert!(decode("ab").is_err()); // 'a' not in the alphabet
        assert!(decode("").is_err());
    }

    #[test]
    fn test_round_trip_stability() {
        // encode(decode(encode(c, p)).center, p) == encode(c, p)
        let points = [
            coord(57.64911, 10.40744),
            coord(-33.87, 151.21),
            coord(0.0, 0.0),
            coord(89.9, -179.9),
            coord(-89.9, 179.9),
        ];
        for c in points {
            for precision in 1..=MAX_PRECISION {
                let code = encode(c, precision).unwrap();
                let decoded = decode(&code).unwrap();
                assert_eq!(
                    encode(decoded.center, precision).unwrap(),
                    code,
                    "round trip failed for {c:?} at precision {precision}"
                );
            }
        }
    }

    #[test]
    fn test_prefix_monotonicity() {
        // The length-(n-1) prefix of encode(c, n) equals encode(c, n-1)
        let points = [coord(57.64911, 10.40744), coord(-12.5, 130.8), coord(40.0, -74.0)];
        for c in points {
            for n in 2..=MAX_PRECISION {
                let full = encode(c, n).unwrap();
                let shorter = encode(c, n - 1).unwrap();
                assert_eq!(&full[..n - 1], shorter);
            }
        }
    }

    #[test]
    fn test_decode_error_bounds_shrink() {
        let c = coord(48.8566, 2.3522);
        let mut last_lat = f64::MAX;
        let mut last_lon = f64::MAX;
        for precision in 1..=MAX_PRECISION {
            let decoded = decode(&encode(c, precision).unwrap()).unwrap();
            assert!(decoded.lat_error <= last_lat);
            assert!(decoded.lon_error <= last_lon);
            last_lat = decoded.lat_error;
            last_lon = decoded.lon_error;
        }
    }

    #[test]
    fn test_decode_center_within_bounds() {
        let c = coord(51.5074, -0.1278);
        let decoded = decode(&encode(c, 7).unwrap()).unwrap();
        assert!((decoded.center.latitude - c.latitude).abs() <= decoded.lat_error);
        assert!((decoded.center.longitude - c.longitude).abs() <= decoded.lon_error);
    }
}
