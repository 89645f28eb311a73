//! Judge0 execution backend client
//!
//! Talks to a Judge0 (or RapidAPI-hosted Judge0) instance over REST. Every
//! request uses `base64_encoded=true`; submissions are fire-and-forget
//! (`wait=false`) and results are fetched by token.

use crate::engine::backend::{ExecutionBackend, StatusPayload, Submission, SubmissionToken};
use crate::engine::BackendError;
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::Deserialize;
use std::time::Duration;

// ============================================================================
// Configuration
// ============================================================================

const API_KEY_HEADER: &str = "X-RapidAPI-Key";
const API_HOST_HEADER: &str = "X-RapidAPI-Host";

/// Connection settings for the Judge0 API
#[derive(Clone)]
pub struct Judge0Config {
    /// Base URL; the client reports itself unavailable without one
    pub api_url: Option<String>,
    pub api_key: Option<String>,
    pub api_host: Option<String>,
    pub request_timeout_secs: u64,
    pub availability_timeout_secs: u64,
}

impl std::fmt::Debug for Judge0Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Judge0Config")
            .field("api_url", &self.api_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("api_host", &self.api_host)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("availability_timeout_secs", &self.availability_timeout_secs)
            .finish()
    }
}

impl Default for Judge0Config {
    fn default() -> Self {
        Self {
            api_url: None,
            api_key: None,
            api_host: None,
            request_timeout_secs: 30,
            availability_timeout_secs: 10,
        }
    }
}

impl Judge0Config {
    pub fn new(api_url: impl Into<String>) -> Self {
        Self {
            api_url: Some(api_url.into()),
            ..Default::default()
        }
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.api_host = Some(host.into());
        self
    }

    pub fn with_timeouts(mut self, request_secs: u64, availability_secs: u64) -> Self {
        self.request_timeout_secs = request_secs;
        self.availability_timeout_secs = availability_secs;
        self
    }
}

// ============================================================================
// Client
// ============================================================================

#[derive(Debug, Deserialize)]
struct TokenResponse {
    token: String,
}

/// REST client for a Judge0 instance
#[derive(Debug, Clone)]
pub struct Judge0Client {
    client: Client,
    config: Judge0Config,
}

impl Judge0Client {
    pub fn new(config: Judge0Config) -> Result<Self, BackendError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;

        tracing::info!(
            api_url = ?config.api_url,
            has_api_key = config.api_key.is_some(),
            "Initialized Judge0 client"
        );

        Ok(Self { client, config })
    }

    pub fn config(&self) -> &Judge0Config {
        &self.config
    }

    fn base_url(&self) -> Result<&str, BackendError> {
        self.config
            .api_url
            .as_deref()
            .map(|url| url.trim_end_matches('/'))
            .filter(|url| !url.is_empty())
            .ok_or(BackendError::NotConfigured)
    }

    fn with_headers(&self, mut request: RequestBuilder) -> RequestBuilder {
        if let Some(key) = &self.config.api_key {
            request = request.header(API_KEY_HEADER, key);
        }
        if let Some(host) = &self.config.api_host {
            request = request.header(API_HOST_HEADER, host);
        }
        request
    }
}

#[async_trait]
impl ExecutionBackend for Judge0Client {
    async fn submit(&self, submission: &Submission) -> Result<SubmissionToken, BackendError> {
        let url = format!(
            "{}/submissions?base64_encoded=true&wait=false",
            self.base_url()?
        );

        tracing::debug!(
            url = %url,
            language_id = submission.language_id,
            "Submitting code to Judge0"
        );

        let response = self
            .with_headers(self.client.post(&url))
            .json(submission)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            tracing::warn!(status = %status, body = %body, "Judge0 rejected submission");
            return Err(BackendError::Rejected(body));
        }

        let parsed: TokenResponse = serde_json::from_str(&body).map_err(|e| {
            tracing::error!(error = %e, body = %body, "Failed to parse Judge0 submission response");
            BackendError::Parse(e.to_string())
        })?;

        Ok(SubmissionToken::new(parsed.token))
    }

    async fn status(&self, token: &SubmissionToken) -> Result<Option<StatusPayload>, BackendError> {
        let url = format!(
            "{}/submissions/{}?base64_encoded=true",
            self.base_url()?,
            token
        );

        let response = self.with_headers(self.client.get(&url)).send().await?;

        let status = response.status();
        if !status.is_success() {
            tracing::debug!(status = %status, token = %token, "Judge0 status request failed");
            return Ok(None);
        }

        let body = response.text().await?;
        let payload = serde_json::from_str(&body).map_err(|e| {
            tracing::error!(error = %e, body = %body, "Failed to parse Judge0 status response");
            BackendError::Parse(e.to_string())
        })?;

        Ok(Some(payload))
    }

    async fn is_available(&self) -> bool {
        let Ok(base) = self.base_url() else {
            tracing::warn!("JUDGE0_API_URL is not set; code execution is disabled");
            return false;
        };

        let request = self
            .with_headers(self.client.get(format!("{}/languages", base)))
            .timeout(Duration::from_secs(self.config.availability_timeout_secs));

        match request.send().await {
            Ok(response) if response.status().is_success() => true,
            Ok(response) => {
                tracing::warn!(status = %response.status(), "Judge0 availability check failed");
                false
            }
            Err(e) => {
                tracing::warn!(error = %e, "Judge0 availability check failed");
                false
            }
        }
    }
}
