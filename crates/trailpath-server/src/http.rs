use std::sync::Arc;

use axum::extract::{DefaultBodyLimit, Multipart, Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::json;
use tracing::{error, info};
use trailpath_domain::{Activity, ActivityService, DomainError, IngestService};

#[derive(Clone)]
pub struct AppState {
    pub ingest: Arc<IngestService>,
    pub activities: Arc<ActivityService>,
}

pub fn router(state: AppState, max_upload_bytes: usize) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/upload", post(upload))
        .route("/api/activities", get(list_activities))
        .route("/api/activities/{id}", get(get_activity))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .with_state(state)
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({"status": "ok"}))
}

/// Accept one FIT upload as the multipart field `fit_file` and run the
/// ingestion pipeline on it. Filename extension is checked before any
/// decoding happens; the body ceiling is enforced by the router layer.
async fn upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<serde_json::Value>, ApiError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(format!("malformed multipart body: {e}")))?
    {
        if field.name() != Some("fit_file") {
            continue;
        }

        let file_name = field.file_name().unwrap_or_default().to_string();
        if !is_fit_upload(&file_name) {
            return Err(ApiError::bad_request(format!(
                "unsupported file {file_name:?}: expected a .fit file"
            )));
        }

        let bytes = field
            .bytes()
            .await
            .map_err(|e| ApiError::bad_request(format!("failed to read upload: {e}")))?;

        info!(file_name = %file_name, size = bytes.len(), "Received activity upload");

        let activity = state.ingest.ingest(&bytes).await?;
        return Ok(Json(json!({
            "status": "ok",
            "id": activity.activity_id,
        })));
    }

    Err(ApiError::bad_request("missing multipart field fit_file"))
}

/// Only `.fit` uploads reach the decoder; the check is on the filename the
/// client sent, before any bytes are read.
fn is_fit_upload(file_name: &str) -> bool {
    file_name.to_ascii_lowercase().ends_with(".fit")
}

async fn list_activities(
    State(state): State<AppState>,
) -> Result<Json<Vec<ActivityResponse>>, ApiError> {
    let activities = state.activities.list_activities().await?;
    Ok(Json(
        activities.into_iter().map(ActivityResponse::from).collect(),
    ))
}

async fn get_activity(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ActivityResponse>, ApiError> {
    let activity = state.activities.get_activity(&id).await?;
    Ok(Json(ActivityResponse::from(activity)))
}

#[derive(Debug, Serialize)]
struct ActivityResponse {
    id: String,
    timestamp: DateTime<Utc>,
    kind: String,
    stats: serde_json::Map<String, serde_json::Value>,
    gpx: String,
}

impl From<Activity> for ActivityResponse {
    fn from(activity: Activity) -> Self {
        Self {
            id: activity.activity_id,
            timestamp: activity.started_at,
            kind: activity.kind,
            stats: activity.stats,
            gpx: activity.gpx,
        }
    }
}

/// Error surface of the HTTP layer: client faults get the reason as plain
/// text, server faults a generic body with the detail logged.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        let status = status_for(&err);
        if status.is_server_error() {
            error!(error = %err, "Request failed");
            Self {
                status,
                message: "internal server error".to_string(),
            }
        } else {
            Self {
                status,
                message: err.to_string(),
            }
        }
    }
}

fn status_for(err: &DomainError) -> StatusCode {
    match err {
        DomainError::Decode(_)
        | DomainError::MissingFileIdentity
        | DomainError::MissingSessionSummary
        | DomainError::InvalidUpload(_) => StatusCode::BAD_REQUEST,
        DomainError::ActivityNotFound(_) => StatusCode::NOT_FOUND,
        DomainError::ActivityAlreadyExists(_) => StatusCode::CONFLICT,
        DomainError::StatsSerialization(_) | DomainError::RepositoryError(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, self.message).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;
    use trailpath_domain::MockActivityRepository;
    use trailpath_fit::FitError;

    fn test_router() -> Router {
        // The repository must never be reached on a pre-decode rejection;
        // any call on the un-expecting mock fails the test.
        let repository = Arc::new(MockActivityRepository::new());
        let state = AppState {
            ingest: Arc::new(IngestService::new(repository.clone())),
            activities: Arc::new(ActivityService::new(repository)),
        };
        router(state, 10 * 1024 * 1024)
    }

    fn multipart_upload(field_name: &str, file_name: &str) -> Request<Body> {
        let body = format!(
            "--boundary\r\n\
             Content-Disposition: form-data; name=\"{field_name}\"; filename=\"{file_name}\"\r\n\
             Content-Type: application/octet-stream\r\n\
             \r\n\
             not a fit stream\r\n\
             --boundary--\r\n"
        );
        Request::builder()
            .method("POST")
            .uri("/api/upload")
            .header("content-type", "multipart/form-data; boundary=boundary")
            .body(Body::from(body))
            .unwrap()
    }

    #[test]
    fn test_fit_extension_check() {
        assert!(is_fit_upload("morning_run.fit"));
        assert!(is_fit_upload("MORNING_RUN.FIT"));
        assert!(!is_fit_upload("morning_run.gpx"));
        assert!(!is_fit_upload("fit"));
        assert!(!is_fit_upload(""));
    }

    #[tokio::test]
    async fn test_upload_rejects_non_fit_filename() {
        let response = test_router()
            .oneshot(multipart_upload("fit_file", "track.gpx"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_upload_rejects_missing_fit_file_field() {
        let response = test_router()
            .oneshot(multipart_upload("attachment", "track.fit"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_client_faults_map_to_400() {
        assert_eq!(
            status_for(&DomainError::Decode(FitError::Decode("bad header".into()))),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_for(&DomainError::MissingFileIdentity),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_for(&DomainError::MissingSessionSummary),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_server_faults_map_to_500_with_generic_body() {
        let err = DomainError::RepositoryError(anyhow::anyhow!("pool exhausted"));
        assert_eq!(status_for(&err), StatusCode::INTERNAL_SERVER_ERROR);

        let api_err = ApiError::from(err);
        assert_eq!(api_err.message, "internal server error");
    }

    #[test]
    fn test_missing_activity_maps_to_404() {
        assert_eq!(
            status_for(&DomainError::ActivityNotFound("act-1".into())),
            StatusCode::NOT_FOUND
        );
    }
}
