//! Spatial point codec and planar projection.
//!
//! Points are persisted as EWKT text tagged with SRID 4326 (WGS84), e.g.
//! `SRID=4326;POINT(13.3777 52.5163)` (longitude first, as WKT demands).
//! Coordinates in that system are angular, so distances are never computed
//! on the raw values: proximity queries project both ends into Web Mercator
//! (EPSG:3857) and measure the planar Euclidean distance. Mercator stretches
//! distances toward the poles; that imprecision is an accepted trade-off of
//! the projection and callers must not substitute a great-circle formula,
//! which would admit a different set of rows at the radius boundary.

use thiserror::Error;

/// SRID of the stored (geodetic) reference system.
pub const WGS84_SRID: u32 = 4326;

/// Spherical earth radius used by the EPSG:3857 forward projection, metres.
pub const EARTH_RADIUS_M: f64 = 6_378_137.0;

#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum GeoError {
    #[error("invalid coordinate (lat={lat}, lon={lon}): values must be finite")]
    InvalidCoordinate { lat: f64, lon: f64 },
}

/// Encode a latitude/longitude pair as EWKT for storage.
///
/// Uses the default float formatting, which is the shortest representation
/// that parses back to the same `f64`, so `decode_point` round-trips exactly.
/// Range checks are the caller's contract; only non-finite values are
/// rejected here.
pub fn encode_point(lat: f64, lon: f64) -> Result<String, GeoError> {
    if !lat.is_finite() || !lon.is_finite() {
        return Err(GeoError::InvalidCoordinate { lat, lon });
    }
    Ok(format!("SRID={WGS84_SRID};POINT({lon} {lat})"))
}

/// Decode a stored EWKT point back into `(lat, lon)`.
///
/// Returns `None` for anything malformed: a missing point must surface as
/// absent coordinates on the read path, never as a panic. A bare
/// `POINT(lon lat)` without the SRID tag is accepted; any other SRID is not.
pub fn decode_point(raw: &str) -> Option<(f64, f64)> {
    let raw = raw.trim();
    let body = match raw.split_once(';') {
        Some((tag, rest)) => {
            if tag != format!("SRID={WGS84_SRID}") {
                return None;
            }
            rest
        }
        None => raw,
    };
    let inner = body.strip_prefix("POINT(")?.strip_suffix(')')?;
    let mut parts = inner.split_whitespace();
    let lon: f64 = parts.next()?.parse().ok()?;
    let lat: f64 = parts.next()?.parse().ok()?;
    if parts.next().is_some() {
        return None;
    }
    Some((lat, lon))
}

/// EPSG:3857 forward projection of a WGS84 coordinate, metres.
pub fn to_web_mercator(lat: f64, lon: f64) -> (f64, f64) {
    let x = EARTH_RADIUS_M * lon.to_radians();
    let y = EARTH_RADIUS_M
        * (std::f64::consts::FRAC_PI_4 + lat.to_radians() / 2.0)
            .tan()
            .ln();
    (x, y)
}

/// Planar distance in metres between two `(lat, lon)` pairs, measured in
/// Web Mercator.
pub fn projected_distance_m(from: (f64, f64), to: (f64, f64)) -> f64 {
    let (x1, y1) = to_web_mercator(from.0, from.1);
    let (x2, y2) = to_web_mercator(to.0, to.1);
    (x2 - x1).hypot(y2 - y1)
}

/// Radius filter with an inclusive boundary: a point sitting exactly at
/// `radius_km` kilometres is kept.
pub fn within_radius(distance_m: f64, radius_km: f64) -> bool {
    distance_m <= radius_km * 1000.0
}
