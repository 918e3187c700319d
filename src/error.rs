//! Maps the error taxonomy from the append and replicate paths to HTTP responses.
//!
//! Grounded in `sem_os_server::error::AppError`: a thiserror enum plus an `IntoResponse` impl
//! that picks the status code and a small JSON body.

use axum::{http::StatusCode, response::IntoResponse, response::Response, Json};
use serde_json::json;
use thiserror::Error;

/// Errors that can occur on the primary's `POST /messages` path.
#[derive(Debug, Error)]
pub enum AppendError {
    #[error("missing or empty 'message' in request body")]
    MissingMessage,

    #[error("write_concern {0} out of range [1, {1}]")]
    WriteConcernOutOfRange(u32, u32),

    #[error("no quorum: too many secondaries are unhealthy")]
    NoQuorum,
}

impl IntoResponse for AppendError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppendError::MissingMessage | AppendError::WriteConcernOutOfRange(_, _) => {
                StatusCode::BAD_REQUEST
            }
            AppendError::NoQuorum => StatusCode::SERVICE_UNAVAILABLE,
        };
        let body = json!({ "error": self.to_string() });
        (status, Json(body)).into_response()
    }
}

/// Errors that can occur on the secondary's `POST /replicate` path.
#[derive(Debug, Error)]
pub enum ReplicateError {
    #[error("missing field in replicate body: {0}")]
    MissingField(&'static str),
}

impl IntoResponse for ReplicateError {
    fn into_response(self) -> Response {
        let body = json!({ "error": self.to_string() });
        (StatusCode::BAD_REQUEST, Json(body)).into_response()
    }
}
