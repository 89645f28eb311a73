//! Execution backend contract
//!
//! The orchestrator only sees this trait, so the HTTP client can be swapped
//! for a scripted backend in tests. All stream payloads travel base64-encoded.

use super::errors::BackendError;
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque job handle returned by a submission
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubmissionToken(String);

impl SubmissionToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SubmissionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Body of a submission request
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Submission {
    pub source_code: String,
    pub language_id: u32,
    /// Encoded stdin, or empty when none was supplied
    pub stdin: String,
}

impl Submission {
    /// Encode source and stdin for the wire
    pub fn encode(source: &str, language_id: u32, stdin: Option<&str>) -> Self {
        Self {
            source_code: encode_payload(source),
            language_id,
            stdin: stdin
                .filter(|s| !s.is_empty())
                .map(encode_payload)
                .unwrap_or_default(),
        }
    }
}

/// `status` object of a status response
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct BackendStatus {
    pub id: u32,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
enum Seconds {
    Text(String),
    Number(f64),
}

fn deserialize_seconds<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = Option::<Seconds>::deserialize(deserializer)?;
    Ok(match value {
        Some(Seconds::Number(n)) => Some(n),
        Some(Seconds::Text(s)) => s.trim().parse().ok(),
        None => None,
    })
}

/// Status response for a submitted job; stream fields are still encoded
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct StatusPayload {
    #[serde(default)]
    pub status: Option<BackendStatus>,
    #[serde(default)]
    pub stdout: Option<String>,
    #[serde(default)]
    pub stderr: Option<String>,
    #[serde(default)]
    pub compile_output: Option<String>,
    #[serde(default, deserialize_with = "deserialize_seconds")]
    pub time: Option<f64>,
    #[serde(default)]
    pub memory: Option<u64>,
}

impl StatusPayload {
    pub fn status_id(&self) -> Option<u32> {
        self.status.as_ref().map(|s| s.id)
    }

    pub fn status_description(&self) -> Option<&str> {
        self.status.as_ref().and_then(|s| s.description.as_deref())
    }
}

/// Remote service that compiles and runs submissions
#[async_trait]
pub trait ExecutionBackend: Send + Sync {
    /// Queue a job and return its token
    async fn submit(&self, submission: &Submission) -> Result<SubmissionToken, BackendError>;

    /// Fetch the job status
    ///
    /// Returns `Ok(None)` when the backend answered with a non-success HTTP
    /// status; the caller treats that attempt as spent and keeps polling.
    async fn status(&self, token: &SubmissionToken) -> Result<Option<StatusPayload>, BackendError>;

    /// Cheap reachability probe
    async fn is_available(&self) -> bool;
}

pub fn encode_payload(text: &str) -> String {
    STANDARD.encode(text.as_bytes())
}

/// Decode a base64 stream field
///
/// Line breaks inside the encoding are ignored and invalid UTF-8 is replaced
/// rather than rejected.
pub fn decode_payload(encoded: &str) -> Result<String, base64::DecodeError> {
    let compact: String = encoded.chars().filter(|c| !c.is_whitespace()).collect();
    let bytes = STANDARD.decode(compact)?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}
