//! Code execution endpoint
//!
//! POST /run

use crate::engine::{ExecutionError, ExecutionRequest, ExecutionResult};
use crate::error::ApiError;
use crate::languages::Language;
use crate::server::state::AppState;
use crate::utils::truncate_str;
use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use validator::Validate;

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RunRequest {
    #[validate(length(min = 1))]
    pub code: String,
    #[validate(length(min = 1))]
    pub language: String,
    #[serde(default)]
    pub input: Option<String>,
    /// Display filename chosen by the caller
    #[serde(default)]
    pub filename: Option<String>,
}

impl RunRequest {
    /// Field validation plus the blank-code check, then language parsing
    pub fn into_execution_request(self) -> Result<ExecutionRequest, ApiError> {
        self.validate()?;
        if self.code.trim().is_empty() || self.language.trim().is_empty() {
            return Err(ApiError::InvalidRequest(
                "Code and language are required".to_string(),
            ));
        }

        let language: Language = self.language.parse()?;

        let mut request = ExecutionRequest::new(self.code, language);
        if let Some(input) = self.input {
            request = request.with_stdin(input);
        }
        if let Some(filename) = self.filename.filter(|f| !f.trim().is_empty()) {
            request = request.with_filename(filename);
        }
        Ok(request)
    }
}

/// Same shape for every outcome; only `success` and `output` always appear
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RunResponse {
    pub success: bool,
    pub output: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub execution_time_seconds: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub memory_kb: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_entry_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub runtime_input_detected: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

impl RunResponse {
    /// Convert a terminal result; `elapsed` stands in for a missing backend time
    pub fn from_result(result: ExecutionResult, elapsed: Duration) -> Self {
        let execution_time = result
            .execution_time_seconds
            .unwrap_or_else(|| round_centis(elapsed.as_secs_f64()));

        Self {
            success: result.success,
            output: result.output,
            execution_time_seconds: Some(execution_time),
            memory_kb: result.memory_kb,
            filename: Some(result.display_filename),
            original_entry_name: result.original_entry_name,
            runtime_input_detected: None,
            status: result.status_description,
        }
    }

    /// Response for a request rejected before submission
    pub fn rejected(error: &ExecutionError, elapsed: Duration) -> Self {
        Self {
            success: false,
            output: error.to_string(),
            execution_time_seconds: Some(round_centis(elapsed.as_secs_f64())),
            runtime_input_detected: matches!(error, ExecutionError::RuntimeInputDetected)
                .then_some(true),
            ..Default::default()
        }
    }
}

fn round_centis(seconds: f64) -> f64 {
    (seconds * 100.0).round() / 100.0
}

/// POST /run
pub async fn run_code(
    State(state): State<AppState>,
    Json(body): Json<RunRequest>,
) -> Result<Json<RunResponse>, ApiError> {
    let request = body.into_execution_request()?;
    let started = Instant::now();

    tracing::info!(
        language = %request.language,
        code_length = request.source_code.chars().count(),
        preview = %truncate_str(&request.source_code, 80),
        "Received execution request"
    );

    match state.orchestrator.execute(&request).await {
        Ok(result) => Ok(Json(RunResponse::from_result(result, started.elapsed()))),
        Err(ExecutionError::UnsupportedLanguage(language)) => {
            Err(ApiError::UnsupportedLanguage(language))
        }
        Err(error) => {
            tracing::info!(error = %error, "Execution rejected before submission");
            Ok(Json(RunResponse::rejected(&error, started.elapsed())))
        }
    }
}
