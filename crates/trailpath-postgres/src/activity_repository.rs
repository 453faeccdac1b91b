use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::{debug, info};
use trailpath_domain::{Activity, ActivityRepository, DomainError, DomainResult};

/// Activity row as stored; the stats blob round-trips as JSONB.
#[derive(Debug, Clone)]
pub struct ActivityRow {
    pub activity_id: String,
    pub started_at: DateTime<Utc>,
    pub kind: String,
    pub stats: serde_json::Value,
    pub gpx: String,
}

impl From<ActivityRow> for Activity {
    fn from(row: ActivityRow) -> Self {
        let stats = match row.stats {
            serde_json::Value::Object(map) => map,
            _ => serde_json::Map::new(),
        };

        Activity {
            activity_id: row.activity_id,
            started_at: row.started_at,
            kind: row.kind,
            stats,
            gpx: row.gpx,
        }
    }
}

fn row_from(row: &tokio_postgres::Row) -> ActivityRow {
    ActivityRow {
        activity_id: row.get(0),
        started_at: row.get(1),
        kind: row.get(2),
        stats: row.get(3),
        gpx: row.get(4),
    }
}

#[derive(Clone)]
pub struct PostgresActivityRepository {
    client: crate::PostgresClient,
}

impl PostgresActivityRepository {
    pub fn new(client: crate::PostgresClient) -> Self {
        Self { client }
    }

    /// Create the activities table if it is not there yet. Run once at
    /// startup, before the first upload is accepted.
    pub async fn ensure_schema(&self) -> anyhow::Result<()> {
        let conn = self.client.get_connection().await?;

        conn.batch_execute(
            "CREATE TABLE IF NOT EXISTS activities (
                activity_id TEXT PRIMARY KEY,
                started_at  TIMESTAMPTZ NOT NULL,
                kind        TEXT NOT NULL,
                stats       JSONB NOT NULL,
                gpx         TEXT NOT NULL
            )",
        )
        .await?;

        info!("activities schema ready");
        Ok(())
    }
}

#[async_trait]
impl ActivityRepository for PostgresActivityRepository {
    async fn insert_activity(&self, activity: Activity) -> DomainResult<()> {
        debug!(activity_id = %activity.activity_id, "Inserting activity");

        let conn = self
            .client
            .get_connection()
            .await
            .map_err(DomainError::RepositoryError)?;

        let stats = serde_json::Value::Object(activity.stats.clone());

        let result = conn
            .execute(
                "INSERT INTO activities (activity_id, started_at, kind, stats, gpx)
                 VALUES ($1, $2, $3, $4, $5)",
                &[
                    &activity.activity_id,
                    &activity.started_at,
                    &activity.kind,
                    &stats,
                    &activity.gpx,
                ],
            )
            .await;

        if let Err(e) = result {
            if let Some(db_err) = e.as_db_error() {
                if db_err.code().code() == "23505" {
                    return Err(DomainError::ActivityAlreadyExists(activity.activity_id));
                }
            }
            return Err(DomainError::RepositoryError(e.into()));
        }

        info!(activity_id = %activity.activity_id, "Activity inserted");
        Ok(())
    }

    async fn get_activity(&self, activity_id: &str) -> DomainResult<Option<Activity>> {
        debug!(activity_id = %activity_id, "Getting activity");

        let conn = self
            .client
            .get_connection()
            .await
            .map_err(DomainError::RepositoryError)?;

        let row = conn
            .query_opt(
                "SELECT activity_id, started_at, kind, stats, gpx
                 FROM activities
                 WHERE activity_id = $1",
                &[&activity_id],
            )
            .await
            .map_err(|e| DomainError::RepositoryError(e.into()))?;

        Ok(row.map(|row| row_from(&row).into()))
    }

    async fn list_activities(&self) -> DomainResult<Vec<Activity>> {
        let conn = self
            .client
            .get_connection()
            .await
            .map_err(DomainError::RepositoryError)?;

        let rows = conn
            .query(
                "SELECT activity_id, started_at, kind, stats, gpx
                 FROM activities
                 ORDER BY started_at DESC",
                &[],
            )
            .await
            .map_err(|e| DomainError::RepositoryError(e.into()))?;

        Ok(rows.iter().map(|row| row_from(row).into()).collect())
    }
}
