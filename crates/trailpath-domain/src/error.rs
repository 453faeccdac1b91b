use thiserror::Error;
use trailpath_fit::FitError;

pub type DomainResult<T> = Result<T, DomainError>;

#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Failed to decode activity file: {0}")]
    Decode(#[from] FitError),

    #[error("No file_id message in activity file")]
    MissingFileIdentity,

    #[error("No session message in activity file")]
    MissingSessionSummary,

    #[error("Failed to serialize activity stats: {0}")]
    StatsSerialization(String),

    #[error("Activity not found: {0}")]
    ActivityNotFound(String),

    #[error("Activity already exists: {0}")]
    ActivityAlreadyExists(String),

    #[error("Invalid upload: {0}")]
    InvalidUpload(String),

    #[error("Repository error: {0}")]
    RepositoryError(#[from] anyhow::Error),
}
