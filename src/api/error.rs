use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use std::fmt;

use crate::pipeline::PipelineError;

#[derive(Debug)]
pub enum ApiError {
    /// Request body was not `application/json` (415).
    UnsupportedMediaType(String),

    /// Request body could not be read as JSON (400).
    BadRequest(String),

    /// The pipeline failed; the failure notification was already attempted
    /// before this surfaces (500).
    Pipeline(PipelineError),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnsupportedMediaType(msg) | Self::BadRequest(msg) => write!(f, "{msg}"),
            Self::Pipeline(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for ApiError {}

impl From<PipelineError> for ApiError {
    fn from(err: PipelineError) -> Self {
        Self::Pipeline(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        match rejection {
            JsonRejection::MissingJsonContentType(_) => {
                Self::UnsupportedMediaType("Content-Type must be application/json".to_string())
            }
            _ => Self::BadRequest("Invalid JSON payload".to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            Self::UnsupportedMediaType(msg) => (StatusCode::UNSUPPORTED_MEDIA_TYPE, msg.clone()),
            Self::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            Self::Pipeline(err) => {
                tracing::error!("Pipeline error: {err}");
                (StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
            }
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}
