//! Decoder boundary for Garmin FIT byte streams.
//!
//! Wraps the `fitparser` crate behind the one call the ingestion pipeline
//! needs: [`decode`], which turns a raw upload into the ordered sequence of
//! [`DecodedMessage`] values. The pipeline routes messages by their global
//! message number and reads fields by name; everything else about the FIT
//! format stays inside this crate.

mod decoder;
mod error;

pub use decoder::{decode, DecodedMessage, FieldValue, MessageField};
pub use error::{FitError, Result};

/// FIT global message number for the `file_id` message.
pub const MSG_FILE_ID: u16 = 0;
/// FIT global message number for the `session` summary message.
pub const MSG_SESSION: u16 = 18;
/// FIT global message number for the per-sample `record` message.
pub const MSG_RECORD: u16 = 20;
