use crate::types::{RawSample, TrackPoint};

/// "No fix" sentinel for the semicircle-encoded position fields.
pub(crate) const NO_FIX: i32 = i32::MAX;

/// "No altitude" sentinel for the raw altitude field.
pub(crate) const NO_ALTITUDE: u16 = u16::MAX;

/// Semicircle fixed point: the full signed 32-bit range spans ±180 degrees.
pub(crate) const SEMICIRCLES_PER_DEGREE: f64 = (1u64 << 31) as f64 / 180.0;

/// FIT altitude encoding: meters = raw / 5 - 500. Format-defined, not tunable.
pub(crate) const ALTITUDE_SCALE: f64 = 5.0;
pub(crate) const ALTITUDE_OFFSET: f64 = 500.0;

/// FIT session distance is fixed point in centimeters.
pub(crate) const DISTANCE_SCALE: f64 = 100.0;

/// Validate one raw sample and convert it to physical units.
///
/// A sentinel latitude or longitude means the device had no fix; the whole
/// sample is dropped, never defaulted. A sentinel altitude on an otherwise
/// valid sample keeps the point and sets elevation to 0.0 meters. Pure and
/// order-preserving: mapping a sequence of samples yields a subsequence of
/// points in the original order.
pub fn to_track_point(sample: &RawSample) -> Option<TrackPoint> {
    if sample.lat_semicircles == NO_FIX || sample.lon_semicircles == NO_FIX {
        return None;
    }

    let elevation_m = if sample.altitude_raw == NO_ALTITUDE {
        0.0
    } else {
        f64::from(sample.altitude_raw) / ALTITUDE_SCALE - ALTITUDE_OFFSET
    };

    Some(TrackPoint {
        lat_deg: f64::from(sample.lat_semicircles) / SEMICIRCLES_PER_DEGREE,
        lon_deg: f64::from(sample.lon_semicircles) / SEMICIRCLES_PER_DEGREE,
        elevation_m,
        timestamp: sample.timestamp,
    })
}
