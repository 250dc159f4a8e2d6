use axum::{Json, http::StatusCode, response::IntoResponse};
use serde::Serialize;
use thiserror::Error as ThisError;

/// Errors surfaced by the HTTP layer.
///
/// Database faults never reach this type: the query executor absorbs them
/// into sentinel returns, and handlers translate "unavailable" into the
/// single [`AtelierError::Unavailable`] variant.
#[derive(Debug, ThisError)]
pub enum AtelierError {
    #[error("database unavailable")]
    Unavailable,

    #[error("{0}")]
    Unauthorized(String),

    #[error("authentication token expired")]
    TokenExpired,

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("{0}")]
    Validation(String),

    #[error("too many requests")]
    RateLimited,

    #[error("internal error: {0}")]
    Internal(String),
}

impl IntoResponse for AtelierError {
    fn into_response(self) -> axum::response::Response {
        let status = match &self {
            AtelierError::Unavailable => StatusCode::SERVICE_UNAVAILABLE,
            AtelierError::Unauthorized(_) | AtelierError::TokenExpired => StatusCode::UNAUTHORIZED,
            AtelierError::NotFound(_) => StatusCode::NOT_FOUND,
            AtelierError::Validation(_) => StatusCode::BAD_REQUEST,
            AtelierError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            AtelierError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let message = self.to_string();
        let body = ApiErrorResponse {
            success: false,
            message: message.clone(),
            error: message,
        };
        (status, Json(body)).into_response()
    }
}

/// Standardized API error envelope, mirroring the success envelope shape
/// with `error` carrying the human-readable reason.
#[derive(Serialize)]
pub struct ApiErrorResponse {
    pub success: bool,
    pub message: String,
    pub error: String,
}
