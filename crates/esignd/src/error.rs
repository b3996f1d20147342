use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

use esign_client::ClientError;
use esign_core::errors::WorkflowError;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("provider configuration incomplete: {0}")]
    Config(String),

    #[error("signature backend unavailable: {0}")]
    Unavailable(String),

    #[error("signature backend rejected the request: {0}")]
    Rejected(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl From<ClientError> for ApiError {
    fn from(err: ClientError) -> Self {
        match err {
            ClientError::Config(e) => ApiError::Config(e.to_string()),
            ClientError::Unavailable(e) => ApiError::Unavailable(e),
            ClientError::Rejected { status, body } => {
                ApiError::Rejected(format!("{status}: {body}"))
            }
            ClientError::Decode(e) => ApiError::Internal(e),
        }
    }
}

impl From<WorkflowError> for ApiError {
    fn from(err: WorkflowError) -> Self {
        match err {
            // Callers that want to absorb unknown envelopes handle the
            // variant before converting; reaching here means a read-side
            // lookup genuinely missed.
            WorkflowError::UnknownEnvelope(id) => ApiError::NotFound(format!("envelope {id}")),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            ApiError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            ApiError::Config(_) => (StatusCode::UNPROCESSABLE_ENTITY, "CONFIG_INCOMPLETE"),
            ApiError::Unavailable(_) => (StatusCode::BAD_GATEWAY, "BACKEND_UNAVAILABLE"),
            ApiError::Rejected(_) => (StatusCode::BAD_GATEWAY, "BACKEND_REJECTED"),
            ApiError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        };

        let body = ErrorResponse {
            error: self.to_string(),
            code: code.to_string(),
        };
        (status, Json(body)).into_response()
    }
}
