use trailpath_fit::{DecodedMessage, FieldValue, MSG_FILE_ID, MSG_RECORD, MSG_SESSION};

use crate::convert::{ALTITUDE_OFFSET, ALTITUDE_SCALE, DISTANCE_SCALE, NO_ALTITUDE, NO_FIX};
use crate::types::{FileIdentity, RawSample, SessionSummary};

/// Accumulators filled by one pass over the decoded message sequence.
#[derive(Debug, Default, Clone)]
pub struct ExtractedMessages {
    pub identity: Option<FileIdentity>,
    pub summary: Option<SessionSummary>,
    pub samples: Vec<RawSample>,
}

/// Walk the message sequence once and route each message by its tag.
///
/// Only file_id, session and record messages are consumed; every other tag
/// hits the explicit skip arm. Skipping unknown tags is policy, not an
/// error: device firmwares emit dozens of message types this pipeline has
/// no use for. Sample accumulation order equals stream order.
pub fn extract_messages(messages: &[DecodedMessage]) -> ExtractedMessages {
    let mut extracted = ExtractedMessages::default();

    for message in messages {
        match message.tag {
            MSG_FILE_ID => {
                if let Some(FieldValue::Timestamp(ts)) = message.field("time_created") {
                    extracted.identity = Some(FileIdentity { time_created: *ts });
                }
            }
            MSG_SESSION => {
                extracted.summary = Some(SessionSummary {
                    sport: sport_code(message.field("sport")),
                    total_distance_raw: distance_wire(message.field("total_distance")),
                    total_ascent_m: ascent_wire(message.field("total_ascent")),
                });
            }
            MSG_RECORD => {
                extracted.samples.push(RawSample {
                    lat_semicircles: semicircles(message.field("position_lat")),
                    lon_semicircles: semicircles(message.field("position_long")),
                    altitude_raw: altitude_wire(
                        message
                            .field("altitude")
                            .or_else(|| message.field("enhanced_altitude")),
                    ),
                    timestamp: epoch_seconds(message.field("timestamp")),
                });
            }
            _ => {}
        }
    }

    extracted
}

// The decoder reports fields with the FIT profile scale/offset already
// applied and omits fields whose wire value was the invalid sentinel. The
// helpers below restore the wire encodings so the validator/converter owns
// the sentinel and fixed-point semantics end to end.

fn semicircles(value: Option<&FieldValue>) -> i32 {
    match value {
        Some(FieldValue::SInt32(v)) => *v,
        _ => NO_FIX,
    }
}

fn altitude_wire(value: Option<&FieldValue>) -> u16 {
    match value {
        Some(FieldValue::UInt16(v)) => *v,
        Some(FieldValue::Float64(meters)) => {
            let raw = ((meters + ALTITUDE_OFFSET) * ALTITUDE_SCALE).round();
            if (0.0..f64::from(NO_ALTITUDE)).contains(&raw) {
                raw as u16
            } else {
                NO_ALTITUDE
            }
        }
        _ => NO_ALTITUDE,
    }
}

fn distance_wire(value: Option<&FieldValue>) -> u32 {
    match value {
        Some(FieldValue::UInt32(v)) => *v,
        Some(FieldValue::Float64(meters)) if *meters >= 0.0 => {
            (meters * DISTANCE_SCALE).round() as u32
        }
        _ => 0,
    }
}

fn ascent_wire(value: Option<&FieldValue>) -> u16 {
    match value {
        Some(FieldValue::UInt16(v)) => *v,
        Some(FieldValue::Float64(meters)) if *meters >= 0.0 => meters.round() as u16,
        _ => 0,
    }
}

fn epoch_seconds(value: Option<&FieldValue>) -> i64 {
    match value {
        Some(FieldValue::Timestamp(ts)) => ts.timestamp(),
        _ => 0,
    }
}

fn sport_code(value: Option<&FieldValue>) -> u8 {
    match value {
        Some(FieldValue::UInt8(v)) => *v,
        // Profile-aware decoders report known enums by name.
        Some(FieldValue::Text(name)) => match name.as_str() {
            "running" => 1,
            "cycling" => 2,
            "swimming" => 5,
            "walking" => 11,
            "hiking" => 17,
            _ => 0,
        },
        _ => 0,
    }
}
