use thiserror::Error;

#[derive(Debug, Error)]
pub enum FitError {
    #[error("failed to decode fit stream: {0}")]
    Decode(String),
}

pub type Result<T> = std::result::Result<T, FitError>;
