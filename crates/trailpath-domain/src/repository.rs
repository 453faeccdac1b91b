use async_trait::async_trait;

use crate::error::DomainResult;
use crate::types::Activity;

/// Storage collaborator for persisted activities.
///
/// The pipeline calls `insert_activity` at most once per ingestion and never
/// retries; retry policy, locking and transactions belong to the
/// implementation.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait ActivityRepository: Send + Sync {
    /// Persist a newly assembled activity.
    async fn insert_activity(&self, activity: Activity) -> DomainResult<()>;

    /// Fetch a single activity by id, `None` when absent.
    async fn get_activity(&self, activity_id: &str) -> DomainResult<Option<Activity>>;

    /// All activities, newest first.
    async fn list_activities(&self) -> DomainResult<Vec<Activity>>;
}
