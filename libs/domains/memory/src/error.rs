use axum::response::{IntoResponse, Response};
use axum_helpers::AppError;
use thiserror::Error;

/// Failure taxonomy of the gateway core.
///
/// Every failure from the embedding provider or the vector index is
/// classified into one of these kinds; none are silently swallowed.
#[derive(Debug, Error)]
pub enum MemoryError {
    /// Request rejected before any external call; the caller can correct it.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Collection not initialized yet; retry after the readiness gate passes.
    #[error("vector store is not ready")]
    NotReady,

    /// Deployed configuration disagrees with provisioned state. Fatal;
    /// requires operator intervention.
    #[error("configuration mismatch: {0}")]
    ConfigMismatch(String),

    /// Embedding provider unreachable or throttling; callers may retry with
    /// backoff.
    #[error("embedding provider unavailable: {0}")]
    ProviderUnavailable(String),

    /// Provider responded but produced no usable embedding.
    #[error("embedding failed: {0}")]
    Embedding(String),

    /// Vector index rejected a write.
    #[error("persist failed: {0}")]
    Persist(String),

    /// Vector index rejected a read.
    #[error("query failed: {0}")]
    Query(String),

    #[error("internal error: {0}")]
    Internal(String),
}

pub type MemoryResult<T> = Result<T, MemoryError>;

/// Convert MemoryError to AppError for standardized HTTP error responses.
///
/// `InvalidInput` is the only client error; everything else maps to a server
/// error, since it is not actionable by the remote caller beyond retrying.
impl From<MemoryError> for AppError {
    fn from(err: MemoryError) -> Self {
        match err {
            MemoryError::InvalidInput(msg) => AppError::BadRequest(msg),
            MemoryError::NotReady => {
                AppError::ServiceUnavailable("vector store is not ready".to_string())
            }
            MemoryError::ConfigMismatch(msg) => {
                AppError::InternalServerError(format!("configuration mismatch: {}", msg))
            }
            MemoryError::ProviderUnavailable(msg) => {
                AppError::ServiceUnavailable(format!("embedding provider unavailable: {}", msg))
            }
            MemoryError::Embedding(msg) => {
                AppError::InternalServerError(format!("embedding failed: {}", msg))
            }
            MemoryError::Persist(msg) => {
                AppError::InternalServerError(format!("persist failed: {}", msg))
            }
            MemoryError::Query(msg) => {
                AppError::InternalServerError(format!("query failed: {}", msg))
            }
            MemoryError::Internal(msg) => AppError::InternalServerError(msg),
        }
    }
}

impl IntoResponse for MemoryError {
    fn into_response(self) -> Response {
        let app_error: AppError = self.into();
        app_error.into_response()
    }
}
