use std::fmt::Write;

use crate::types::TrackPoint;

/// Serialize the validated track into a GPX 1.1 document.
///
/// One root `<gpx>`, one `<trk>`, one ordered `<trkseg>`, one `<trkpt>` per
/// point with latitude/longitude attributes and a nested `<ele>`. Timestamps
/// are not embedded. Coordinates use Rust's shortest round-trip float
/// formatting so downstream map renderers see the full input precision.
///
/// An empty point sequence yields an empty string, not a minimal valid
/// document; callers special-case the empty track.
pub fn write_track_document(points: &[TrackPoint]) -> String {
    if points.is_empty() {
        return String::new();
    }

    let mut doc = String::with_capacity(128 + points.len() * 64);
    doc.push_str(r#"<?xml version="1.0" encoding="UTF-8"?>"#);
    doc.push_str(r#"<gpx version="1.1" creator="Trailpath">"#);
    doc.push_str("<trk><trkseg>");

    for point in points {
        // String formatting of plain floats cannot fail.
        let _ = write!(
            doc,
            r#"<trkpt lat="{}" lon="{}"><ele>{}</ele></trkpt>"#,
            point.lat_deg, point.lon_deg, point.elevation_m
        );
    }

    doc.push_str("</trkseg></trk></gpx>");
    doc
}
