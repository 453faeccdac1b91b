use std::sync::Arc;

use serde_json::{Map, Value};
use tracing::{debug, info};
use trailpath_fit::DecodedMessage;

use crate::convert::to_track_point;
use crate::error::{DomainError, DomainResult};
use crate::extractor::extract_messages;
use crate::gpx::write_track_document;
use crate::repository::ActivityRepository;
use crate::stats::aggregate_stats;
use crate::types::{Activity, ActivityStats, TrackPoint};

/// Orchestrates one activity ingestion end to end.
///
/// Flow:
/// 1. Decode the upload into the ordered message sequence
/// 2. Classify messages into identity, summary and raw samples
/// 3. Validate and unit-convert samples into track points
/// 4. Reconstruct the track document and aggregate stats
/// 5. Assemble the activity with a fresh id and insert it once
///
/// Single pass, no internal state shared between ingestions; any failure is
/// terminal and nothing is persisted.
pub struct IngestService {
    repository: Arc<dyn ActivityRepository>,
}

impl IngestService {
    pub fn new(repository: Arc<dyn ActivityRepository>) -> Self {
        Self { repository }
    }

    /// Ingest one raw FIT upload.
    pub async fn ingest(&self, bytes: &[u8]) -> DomainResult<Activity> {
        debug!(payload_size = bytes.len(), "Decoding activity upload");
        let messages = trailpath_fit::decode(bytes)?;
        self.ingest_messages(&messages).await
    }

    /// Run the pipeline on an already-decoded message sequence.
    pub async fn ingest_messages(&self, messages: &[DecodedMessage]) -> DomainResult<Activity> {
        let extracted = extract_messages(messages);
        let identity = extracted.identity.ok_or(DomainError::MissingFileIdentity)?;
        let summary = extracted.summary.ok_or(DomainError::MissingSessionSummary)?;

        let points: Vec<TrackPoint> = extracted.samples.iter().filter_map(to_track_point).collect();

        debug!(
            samples_seen = extracted.samples.len(),
            points_retained = points.len(),
            sport = summary.sport,
            "Classified activity messages"
        );

        let gpx = write_track_document(&points);
        let stats = aggregate_stats(&summary, points.len());

        let activity = Activity {
            activity_id: xid::new().to_string(),
            started_at: identity.time_created,
            kind: stats.kind.clone(),
            stats: stats_blob(&stats)?,
            gpx,
        };

        self.repository.insert_activity(activity.clone()).await?;

        info!(
            activity_id = %activity.activity_id,
            kind = %activity.kind,
            record_count = stats.record_count,
            "Activity ingested"
        );

        Ok(activity)
    }
}

/// Query side for stored activities.
pub struct ActivityService {
    repository: Arc<dyn ActivityRepository>,
}

impl ActivityService {
    pub fn new(repository: Arc<dyn ActivityRepository>) -> Self {
        Self { repository }
    }

    pub async fn get_activity(&self, activity_id: &str) -> DomainResult<Activity> {
        debug!(activity_id = %activity_id, "Getting activity");
        self.repository
            .get_activity(activity_id)
            .await?
            .ok_or_else(|| DomainError::ActivityNotFound(activity_id.to_string()))
    }

    pub async fn list_activities(&self) -> DomainResult<Vec<Activity>> {
        self.repository.list_activities().await
    }
}

/// Flatten the stats into the opaque key-value blob the store keeps.
///
/// Kind and start time are first-class activity fields and stay out of the
/// blob.
fn stats_blob(stats: &ActivityStats) -> DomainResult<Map<String, Value>> {
    let mut blob = Map::new();
    blob.insert("distance".to_string(), finite_number(stats.distance_m)?);
    blob.insert(
        "elevation".to_string(),
        finite_number(stats.elevation_gain_m)?,
    );
    blob.insert(
        "record_count".to_string(),
        Value::Number(stats.record_count.into()),
    );
    Ok(blob)
}

fn finite_number(value: f64) -> DomainResult<Value> {
    serde_json::Number::from_f64(value)
        .map(Value::Number)
        .ok_or_else(|| DomainError::StatsSerialization(format!("non-finite value: {value}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::MockActivityRepository;
    use chrono::{TimeZone, Utc};
    use trailpath_fit::{FieldValue, MessageField, MSG_FILE_ID, MSG_RECORD, MSG_SESSION};

    fn file_id_message() -> DecodedMessage {
        DecodedMessage::new(
            MSG_FILE_ID,
            vec![MessageField::new(
                "time_created",
                FieldValue::Timestamp(Utc.timestamp_opt(1_700_000_000, 0).unwrap()),
            )],
        )
    }

    fn session_message() -> DecodedMessage {
        DecodedMessage::new(
            MSG_SESSION,
            vec![
                MessageField::new("sport", FieldValue::UInt8(1)),
                MessageField::new("total_distance", FieldValue::UInt32(500_000)),
                MessageField::new("total_ascent", FieldValue::UInt16(120)),
            ],
        )
    }

    fn valid_record() -> DecodedMessage {
        DecodedMessage::new(
            MSG_RECORD,
            vec![
                MessageField::new("position_lat", FieldValue::SInt32(100_000_000)),
                MessageField::new("position_long", FieldValue::SInt32(200_000_000)),
                MessageField::new("altitude", FieldValue::UInt16(1000)),
                MessageField::new(
                    "timestamp",
                    FieldValue::Timestamp(Utc.timestamp_opt(1_700_000_000, 0).unwrap()),
                ),
            ],
        )
    }

    fn no_fix_record() -> DecodedMessage {
        DecodedMessage::new(
            MSG_RECORD,
            vec![
                MessageField::new("position_lat", FieldValue::SInt32(i32::MAX)),
                MessageField::new("position_long", FieldValue::SInt32(200_000_000)),
                MessageField::new("altitude", FieldValue::UInt16(1000)),
            ],
        )
    }

    #[tokio::test]
    async fn test_ingest_end_to_end() {
        // Arrange
        let mut mock_repository = MockActivityRepository::new();
        mock_repository
            .expect_insert_activity()
            .withf(|activity: &Activity| {
                !activity.activity_id.is_empty()
                    && activity.kind == "Running"
                    && activity.stats["distance"] == 5000.0
                    && activity.stats["elevation"] == 120.0
                    && activity.stats["record_count"] == 1
                    && activity.gpx.matches("<trkpt").count() == 1
            })
            .times(1)
            .return_once(|_| Ok(()));

        let service = IngestService::new(Arc::new(mock_repository));
        let messages = vec![
            file_id_message(),
            session_message(),
            valid_record(),
            no_fix_record(),
        ];

        // Act
        let activity = service.ingest_messages(&messages).await.unwrap();

        // Assert
        assert_eq!(activity.kind, "Running");
        assert_eq!(activity.started_at.timestamp(), 1_700_000_000);
        assert_eq!(activity.stats["record_count"], 1);
    }

    #[tokio::test]
    async fn test_missing_file_identity_skips_storage() {
        // No insert expectation: any repository call fails the test.
        let mock_repository = MockActivityRepository::new();
        let service = IngestService::new(Arc::new(mock_repository));

        let result = service
            .ingest_messages(&[session_message(), valid_record()])
            .await;

        assert!(matches!(result, Err(DomainError::MissingFileIdentity)));
    }

    #[tokio::test]
    async fn test_missing_session_summary_skips_storage() {
        let mock_repository = MockActivityRepository::new();
        let service = IngestService::new(Arc::new(mock_repository));

        let result = service
            .ingest_messages(&[file_id_message(), valid_record()])
            .await;

        assert!(matches!(result, Err(DomainError::MissingSessionSummary)));
    }

    #[tokio::test]
    async fn test_empty_samples_still_persist() {
        let mut mock_repository = MockActivityRepository::new();
        mock_repository
            .expect_insert_activity()
            .withf(|activity: &Activity| {
                activity.gpx.is_empty() && activity.stats["record_count"] == 0
            })
            .times(1)
            .return_once(|_| Ok(()));

        let service = IngestService::new(Arc::new(mock_repository));

        let activity = service
            .ingest_messages(&[file_id_message(), session_message()])
            .await
            .unwrap();

        assert_eq!(activity.gpx, "");
        assert_eq!(activity.stats["record_count"], 0);
    }

    #[tokio::test]
    async fn test_reingestion_yields_fresh_identifier() {
        let mut mock_repository = MockActivityRepository::new();
        mock_repository
            .expect_insert_activity()
            .times(2)
            .returning(|_| Ok(()));

        let service = IngestService::new(Arc::new(mock_repository));
        let messages = vec![file_id_message(), session_message(), valid_record()];

        let first = service.ingest_messages(&messages).await.unwrap();
        let second = service.ingest_messages(&messages).await.unwrap();

        assert_ne!(first.activity_id, second.activity_id);
        assert_eq!(first.stats, second.stats);
        assert_eq!(first.gpx, second.gpx);
        assert_eq!(first.kind, second.kind);
    }

    #[tokio::test]
    async fn test_storage_failure_propagates() {
        let mut mock_repository = MockActivityRepository::new();
        mock_repository
            .expect_insert_activity()
            .times(1)
            .return_once(|_| Err(DomainError::RepositoryError(anyhow::anyhow!("pool closed"))));

        let service = IngestService::new(Arc::new(mock_repository));

        let result = service
            .ingest_messages(&[file_id_message(), session_message()])
            .await;

        assert!(matches!(result, Err(DomainError::RepositoryError(_))));
    }

    #[tokio::test]
    async fn test_get_activity_not_found() {
        let mut mock_repository = MockActivityRepository::new();
        mock_repository
            .expect_get_activity()
            .times(1)
            .return_once(|_| Ok(None));

        let service = ActivityService::new(Arc::new(mock_repository));

        let result = service.get_activity("missing-id").await;
        assert!(matches!(result, Err(DomainError::ActivityNotFound(_))));
    }

    #[test]
    fn test_stats_blob_rejects_non_finite_values() {
        let stats = ActivityStats {
            distance_m: f64::NAN,
            elevation_gain_m: 0.0,
            record_count: 0,
            kind: "Unknown".to_string(),
        };
        assert!(matches!(
            stats_blob(&stats),
            Err(DomainError::StatsSerialization(_))
        ));
    }
}
