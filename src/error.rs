use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use tracing::error;

use crate::directory::DirectoryError;

#[derive(Debug)]
pub enum ApiError {
    Unauthorized(String),
    BadRequest(String),
    NotFound(String),
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg).into_response(),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg).into_response(),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg).into_response(),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg).into_response(),
        }
    }
}

// Directory failures are surfaced uniformly: a missing record keeps its 404,
// everything else becomes a generic "operation failed" with the transport
// detail kept in the logs. View state is never partially applied.
impl From<DirectoryError> for ApiError {
    fn from(value: DirectoryError) -> Self {
        match value {
            DirectoryError::MissingRecord => ApiError::NotFound(value.to_string()),
            DirectoryError::Decode(err) => {
                error!("directory payload rejected: {err}");
                ApiError::Internal("Session directory request failed".into())
            }
            DirectoryError::Http(err) => {
                error!("directory HTTP error: {err}");
                ApiError::Internal("Session directory request failed".into())
            }
        }
    }
}
