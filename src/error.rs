/// Unified error types for the Upskill server
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Main error type, matched exhaustively at the HTTP boundary
#[derive(Error, Debug)]
pub enum ApiError {
    /// No usable credentials on the request
    #[error("Authentication required: {0}")]
    AuthenticationRequired(String),

    /// Token past its expiry claim
    #[error("Token has expired")]
    TokenExpired,

    /// Token structurally broken, badly signed, or carrying unknown claims
    #[error("Invalid token: {0}")]
    TokenInvalid(String),

    /// Caller authenticated but not allowed
    #[error("Insufficient permissions: {0}")]
    InsufficientPermissions(String),

    /// Resource does not exist (or is invisible to the caller)
    #[error("Not found: {0}")]
    NotFound(String),

    /// Uniqueness / reference conflicts (duplicate enrollment, referenced offering)
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Operation not valid for the current lifecycle state
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// Payment verification window lapsed
    #[error("Payment session expired: {0}")]
    SessionExpired(String),

    /// Business-rule input errors (distinct from field-shape validation)
    #[error("Validation error: {0}")]
    Validation(String),

    /// Connection/transaction failure
    #[error("Storage unavailable: {0}")]
    StorageUnavailable(String),

    /// Unclassified internal errors
    #[error("Internal error: {0}")]
    Internal(String),
}

/// JSON error body returned to clients
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    pub message: String,
}

/// Classify a database error into the taxonomy.
///
/// RLS and trigger rejections surface as SQLSTATE 42501 and are folded into
/// `InsufficientPermissions` so schema detail never leaks; they are logged as
/// security events. Ordinary constraint violations keep their own kinds.
impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::RowNotFound => ApiError::NotFound("resource not found".to_string()),
            sqlx::Error::Database(db) => match db.code().as_deref() {
                Some("42501") => {
                    tracing::warn!(
                        sqlstate = "42501",
                        detail = %db.message(),
                        "storage-layer policy rejected operation"
                    );
                    ApiError::InsufficientPermissions("access denied".to_string())
                }
                Some("23505") => ApiError::Conflict("resource already exists".to_string()),
                Some("23503") => {
                    ApiError::Conflict("resource is referenced by other records".to_string())
                }
                Some("23502") | Some("23514") => {
                    ApiError::Validation("constraint violated".to_string())
                }
                _ => {
                    tracing::error!(error = %db.message(), "unclassified database error");
                    ApiError::Internal("database error".to_string())
                }
            },
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
                ApiError::StorageUnavailable("database unavailable".to_string())
            }
            _ => {
                tracing::error!(error = %err, "unclassified storage error");
                ApiError::Internal("storage error".to_string())
            }
        }
    }
}

/// Convert ApiError to an HTTP response
impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code, message) = match &self {
            ApiError::AuthenticationRequired(_) => (
                StatusCode::UNAUTHORIZED,
                "AuthenticationRequired",
                "authentication required".to_string(),
            ),
            ApiError::TokenExpired => (
                StatusCode::UNAUTHORIZED,
                "TokenExpired",
                "token has expired".to_string(),
            ),
            ApiError::TokenInvalid(_) => (
                StatusCode::UNAUTHORIZED,
                "TokenInvalid",
                "invalid token".to_string(),
            ),
            ApiError::InsufficientPermissions(_) => (
                StatusCode::FORBIDDEN,
                "InsufficientPermissions",
                "insufficient permissions".to_string(),
            ),
            ApiError::NotFound(_) => (StatusCode::NOT_FOUND, "NotFound", self.to_string()),
            ApiError::Conflict(_) => (StatusCode::CONFLICT, "Conflict", self.to_string()),
            ApiError::InvalidState(_) => (StatusCode::CONFLICT, "InvalidState", self.to_string()),
            ApiError::SessionExpired(_) => (StatusCode::GONE, "SessionExpired", self.to_string()),
            ApiError::Validation(_) => {
                (StatusCode::BAD_REQUEST, "ValidationFailed", self.to_string())
            }
            ApiError::StorageUnavailable(_) => (
                StatusCode::SERVICE_UNAVAILABLE,
                "StorageUnavailable",
                "service temporarily unavailable".to_string(),
            ),
            // Don't leak internal detail
            ApiError::Internal(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "InternalError",
                "internal server error".to_string(),
            ),
        };

        let body = Json(ErrorBody {
            error: error_code.to_string(),
            message,
        });

        (status, body).into_response()
    }
}

/// Result type alias for server operations
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use axum::response::IntoResponse;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (
                ApiError::AuthenticationRequired("x".into()),
                StatusCode::UNAUTHORIZED,
            ),
            (ApiError::TokenExpired, StatusCode::UNAUTHORIZED),
            (
                ApiError::InsufficientPermissions("x".into()),
                StatusCode::FORBIDDEN,
            ),
            (ApiError::NotFound("x".into()), StatusCode::NOT_FOUND),
            (ApiError::Conflict("x".into()), StatusCode::CONFLICT),
            (ApiError::InvalidState("x".into()), StatusCode::CONFLICT),
            (ApiError::SessionExpired("x".into()), StatusCode::GONE),
            (ApiError::Validation("x".into()), StatusCode::BAD_REQUEST),
            (
                ApiError::StorageUnavailable("x".into()),
                StatusCode::SERVICE_UNAVAILABLE,
            ),
            (
                ApiError::Internal("x".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, expected) in cases {
            assert_eq!(err.into_response().status(), expected);
        }
    }

    #[test]
    fn test_row_not_found_maps_to_not_found() {
        let err: ApiError = sqlx::Error::RowNotFound.into();
        assert!(matches!(err, ApiError::NotFound(_)));
    }
}
