use thiserror::Error;

/// Errors related to the pure core types (token codec, validation).
pub type Result<T> = std::result::Result<T, CoreError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    #[error("malformed short code: {0}")]
    MalformedToken(String),
}

/// Failures reported by a storage backend.
///
/// Every variant is a "backend unavailable" condition from the point of view
/// of the link store; the variants only refine the cause for logging.
#[derive(Debug, Clone, Error)]
pub enum StorageError {
    #[error("storage backend unavailable: {0}")]
    Unavailable(String),
    #[error("storage operation timed out: {0}")]
    Timeout(String),
    #[error("stored data is invalid: {0}")]
    InvalidData(String),
    #[error("storage operation failed: {0}")]
    Operation(String),
}

#[derive(Debug, Clone, Error)]
pub enum ShortenerError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("short link not found: {0}")]
    NotFound(String),
    #[error(transparent)]
    Backend(#[from] StorageError),
}

impl From<CoreError> for ShortenerError {
    fn from(value: CoreError) -> Self {
        match value {
            CoreError::MalformedToken(_) => Self::InvalidInput(value.to_string()),
        }
    }
}
