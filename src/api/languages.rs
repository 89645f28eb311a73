//! Language listing and filename preview endpoints

use crate::engine::analyzer;
use crate::error::ApiError;
use crate::server::state::AppState;
use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Serialize)]
pub struct LanguageEntry {
    pub value: &'static str,
    pub label: String,
    pub extension: &'static str,
}

#[derive(Debug, Serialize)]
pub struct LanguagesResponse {
    pub languages: Vec<LanguageEntry>,
}

/// GET /languages
pub async fn list_languages(State(state): State<AppState>) -> Json<LanguagesResponse> {
    let languages = state
        .registry()
        .iter()
        .map(|config| LanguageEntry {
            value: config.id.as_str(),
            label: config.id.label(),
            extension: config.file_extension,
        })
        .collect();

    Json(LanguagesResponse { languages })
}

#[derive(Debug, Deserialize, Validate)]
pub struct FilenameRequest {
    #[validate(length(min = 1))]
    pub code: String,
    #[validate(length(min = 1))]
    pub language: String,
}

#[derive(Debug, PartialEq, Serialize)]
pub struct FilenameResponse {
    pub filename: String,
    pub basename: String,
    pub extension: &'static str,
    pub language: &'static str,
}

/// POST /get-filename
pub async fn get_filename(
    State(state): State<AppState>,
    Json(request): Json<FilenameRequest>,
) -> Result<Json<FilenameResponse>, ApiError> {
    request.validate()?;

    let config = state.registry().resolve(&request.language)?;
    let basename = analyzer::extract_entry_name(&request.code, config);

    Ok(Json(FilenameResponse {
        filename: format!("{}.{}", basename, config.file_extension),
        basename,
        extension: config.file_extension,
        language: config.id.as_str(),
    }))
}
