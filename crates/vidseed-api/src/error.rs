//! API error types.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

use vidseed_pipeline::PipelineError;

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Unsupported media type: {0}")]
    UnsupportedMedia(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Service busy: {0}")]
    Busy(String),

    #[error("Tooling unavailable: {0}")]
    ToolingUnavailable(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn unauthorized(msg: impl Into<String>) -> Self {
        Self::Unauthorized(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::BadRequest(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::UnsupportedMedia(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Busy(_) | ApiError::ToolingUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<PipelineError> for ApiError {
    fn from(e: PipelineError) -> Self {
        match e {
            PipelineError::Validation(m) => ApiError::BadRequest(m),
            PipelineError::UnsupportedMedia(m) => ApiError::UnsupportedMedia(m),
            PipelineError::Conflict(m) => ApiError::Conflict(m),
            PipelineError::NotFound(m) => ApiError::NotFound(m),
            PipelineError::ToolingUnavailable(m) => ApiError::ToolingUnavailable(m),
            PipelineError::PoolFull => ApiError::Busy("encoder pool is at capacity".to_string()),
            PipelineError::NoRenditions => {
                ApiError::Internal("no usable rendition was produced".to_string())
            }
            other => ApiError::Internal(other.to_string()),
        }
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    detail: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        // Internal detail (subprocess output, paths) stays in the logs, not
        // in production responses.
        let detail = match &self {
            ApiError::Internal(_) => {
                if std::env::var("ENVIRONMENT")
                    .map(|v| v.eq_ignore_ascii_case("production"))
                    .unwrap_or(false)
                {
                    "An internal error occurred".to_string()
                } else {
                    self.to_string()
                }
            }
            _ => self.to_string(),
        };

        (status, Json(ErrorResponse { detail })).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pipeline_error_mapping() {
        let cases = [
            (
                PipelineError::Conflict("dup".to_string()),
                StatusCode::CONFLICT,
            ),
            (
                PipelineError::UnsupportedMedia("mov".to_string()),
                StatusCode::UNSUPPORTED_MEDIA_TYPE,
            ),
            (
                PipelineError::NotFound("x".to_string()),
                StatusCode::NOT_FOUND,
            ),
            (
                PipelineError::ToolingUnavailable("mktorrent".to_string()),
                StatusCode::SERVICE_UNAVAILABLE,
            ),
            (PipelineError::PoolFull, StatusCode::SERVICE_UNAVAILABLE),
            (
                PipelineError::Validation("bad".to_string()),
                StatusCode::BAD_REQUEST,
            ),
        ];
        for (err, expected) in cases {
            assert_eq!(ApiError::from(err).status_code(), expected);
        }
    }
}
