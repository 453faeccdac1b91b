use crate::convert::DISTANCE_SCALE;
use crate::types::{ActivityStats, SessionSummary};

/// Combine the session summary with the realized track point count.
///
/// Distance comes out of the session's fixed-point total; elevation gain is
/// the session's reported ascent, used as-is and never recomputed from the
/// track elevations. `record_count` counts retained track points, not raw
/// samples seen.
pub fn aggregate_stats(summary: &SessionSummary, record_count: usize) -> ActivityStats {
    ActivityStats {
        distance_m: f64::from(summary.total_distance_raw) / DISTANCE_SCALE,
        elevation_gain_m: f64::from(summary.total_ascent_m),
        record_count,
        kind: sport_label(summary.sport).to_string(),
    }
}

/// Map a FIT sport code to its display label. Total: every code maps.
pub fn sport_label(sport: u8) -> &'static str {
    match sport {
        1 => "Running",
        2 => "Cycling",
        5 => "Swimming",
        11 => "Walking",
        17 => "Hiking",
        _ => "Unknown",
    }
}
