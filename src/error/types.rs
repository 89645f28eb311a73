//! API error types

use crate::engine::ExecutionError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Language {0} not supported")]
    UnsupportedLanguage(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::InvalidRequest(_) | ApiError::UnsupportedLanguage(_) => {
                StatusCode::BAD_REQUEST
            }
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        ApiError::InvalidRequest(format!("Code and language are required ({})", errors))
    }
}

/// Only the language rejection maps onto an HTTP error; the other
/// pre-submission rejections are reported in the normal response body.
impl From<ExecutionError> for ApiError {
    fn from(error: ExecutionError) -> Self {
        match error {
            ExecutionError::UnsupportedLanguage(language) => {
                ApiError::UnsupportedLanguage(language)
            }
            other => ApiError::Internal(anyhow::Error::new(other)),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let (error_type, message) = match self {
            ApiError::InvalidRequest(msg) => ("invalid_request_error", msg),
            ApiError::UnsupportedLanguage(language) => (
                "unsupported_language_error",
                format!("Language {} not supported", language),
            ),
            ApiError::Internal(err) => {
                tracing::error!(error = %err, "Internal error while handling request");
                ("api_error", err.to_string())
            }
        };

        let body = Json(ErrorResponse {
            type_: "error".to_string(),
            error: ErrorDetail {
                type_: error_type.to_string(),
                message,
            },
        });

        (status, body).into_response()
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    #[serde(rename = "type")]
    type_: String,
    error: ErrorDetail,
}

#[derive(Serialize)]
struct ErrorDetail {
    #[serde(rename = "type")]
    type_: String,
    message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            ApiError::InvalidRequest("code".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::UnsupportedLanguage("cobol".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::Internal(anyhow::anyhow!("boom")).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_from_execution_error() {
        let err: ApiError = ExecutionError::UnsupportedLanguage("cobol".into()).into();
        assert!(matches!(err, ApiError::UnsupportedLanguage(ref l) if l == "cobol"));

        let err: ApiError = ExecutionError::ServiceUnavailable.into();
        assert!(matches!(err, ApiError::Internal(_)));
    }

    #[tokio::test]
    async fn test_error_body_shape() {
        let response = ApiError::UnsupportedLanguage("cobol".into()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["type"], "error");
        assert_eq!(body["error"]["type"], "unsupported_language_error");
        assert_eq!(body["error"]["message"], "Language cobol not supported");
    }
}
