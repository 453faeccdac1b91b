//! Core activity ingestion pipeline.
//!
//! Flow: decoded FIT messages → classifier/extractor → sentinel validation
//! and unit conversion → track reconstruction (GPX) + stats aggregation →
//! activity assembly → repository insert. Control flows strictly forward in
//! a single pass; every failure is terminal for that ingestion and nothing
//! is persisted on an error path.

mod convert;
mod error;
mod extractor;
mod gpx;
mod ingest;
mod repository;
mod stats;
mod types;

pub use convert::to_track_point;
pub use error::{DomainError, DomainResult};
pub use extractor::{extract_messages, ExtractedMessages};
pub use gpx::write_track_document;
pub use ingest::{ActivityService, IngestService};
pub use repository::ActivityRepository;
pub use stats::{aggregate_stats, sport_label};
pub use types::{
    Activity, ActivityStats, FileIdentity, RawSample, SessionSummary, TrackPoint,
};

#[cfg(any(test, feature = "testing"))]
pub use repository::MockActivityRepository;
