use thiserror::Error;

/// Failure taxonomy shared by every operation in the core. The API
/// layer maps these onto HTTP status codes; validation errors are
/// raised before any mutation is issued.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Malformed reference, invalid enum value, missing field or a
    /// self-share attempt.
    #[error("{0}")]
    InvalidArgument(String),
    #[error("{0}")]
    NotFound(String),
    /// Duplicate name or email within its uniqueness scope.
    #[error("{0}")]
    Conflict(String),
    #[error("authentication required")]
    Unauthenticated,
    /// Unexpected store failure; carries the underlying cause.
    #[error("storage failure: {0}")]
    Store(#[from] anyhow::Error),
}

pub type CoreResult<T> = Result<T, CoreError>;
