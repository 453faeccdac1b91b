use chrono::{DateTime, Utc};

/// Creation identity of the uploaded file. Exactly one per activity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileIdentity {
    pub time_created: DateTime<Utc>,
}

/// Device-computed totals for the whole activity. Exactly one per activity.
///
/// `total_distance_raw` keeps the wire fixed-point encoding (centimeters);
/// `total_ascent_m` is already in meters on the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSummary {
    pub sport: u8,
    pub total_distance_raw: u32,
    pub total_ascent_m: u16,
}

/// One positional sample in its wire encoding, before validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawSample {
    pub lat_semicircles: i32,
    pub lon_semicircles: i32,
    pub altitude_raw: u16,
    pub timestamp: i64,
}

/// A validated, unit-converted sample: decimal degrees, meters, epoch seconds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrackPoint {
    pub lat_deg: f64,
    pub lon_deg: f64,
    pub elevation_m: f64,
    pub timestamp: i64,
}

/// Derived summary metrics, immutable once computed.
///
/// `elevation_gain_m` is the session's reported total ascent and is
/// independent of the per-sample elevations embedded in the track document;
/// the two figures come from different device sources and are kept separate.
#[derive(Debug, Clone, PartialEq)]
pub struct ActivityStats {
    pub distance_m: f64,
    pub elevation_gain_m: f64,
    pub record_count: usize,
    pub kind: String,
}

/// The persistable record handed to the storage collaborator.
#[derive(Debug, Clone, PartialEq)]
pub struct Activity {
    pub activity_id: String,
    pub started_at: DateTime<Utc>,
    pub kind: String,
    /// Flat stats blob (distance, elevation, record_count), stored opaquely.
    pub stats: serde_json::Map<String, serde_json::Value>,
    /// GPX track document; empty string when no valid samples were retained.
    pub gpx: String,
}
