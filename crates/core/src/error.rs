use thiserror::Error;

pub type AdServeResult<T> = Result<T, AdServeError>;

#[derive(Error, Debug)]
pub enum AdServeError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Unknown ad group: {0}")]
    UnknownGroup(String),

    #[error("Duplicate group handle: {0}")]
    DuplicateHandle(String),

    #[error("Unknown ad: {0}")]
    UnknownAd(uuid::Uuid),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}
