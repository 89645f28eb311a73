//! Application settings and configuration
//!
//! Loaded from environment variables (and `.env`) with defaults, then
//! validated before the server starts.

use crate::engine::PollConfig;
use crate::languages::{Language, DEFAULT_JAVA_NOISE_MARKERS};
use crate::services::Judge0Config;
use anyhow::{Context, Result};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::env;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Application environment
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    #[value(alias = "dev")]
    Development,
    #[value(alias = "stage")]
    Staging,
    #[value(alias = "prod")]
    Production,
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Staging => write!(f, "staging"),
            Environment::Production => write!(f, "production"),
        }
    }
}

impl FromStr for Environment {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "development" | "dev" => Ok(Environment::Development),
            "staging" | "stage" => Ok(Environment::Staging),
            "production" | "prod" => Ok(Environment::Production),
            _ => anyhow::bail!(
                "Invalid environment: {}. Expected: development, staging, or production",
                s
            ),
        }
    }
}

/// Execution backend connection settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BackendSettings {
    pub api_url: Option<String>,
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    pub api_host: Option<String>,
    pub request_timeout_secs: u64,
    pub availability_timeout_secs: u64,
}

impl Default for BackendSettings {
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

/// Poll schedule for submitted jobs
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PollSettings {
    pub interval_ms: u64,
    pub java_interval_ms: u64,
    pub max_attempts: u32,
}

impl Default for PollSettings {
    fn default() -> Self {
        Self {
            interval_ms: 1000,
            java_interval_ms: 1500,
            max_attempts: 15,
        }
    }
}

/// Main application settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Settings {
    // App settings
    pub app_name: String,
    pub app_version: String,
    pub environment: Environment,
    pub log_level: String,

    // Server settings
    pub host: String,
    pub port: u16,

    pub backend: BackendSettings,
    pub poll: PollSettings,

    /// Languages offered to callers
    pub enabled_languages: Vec<Language>,

    /// Case-insensitive substrings marking Java stderr lines as noise
    pub java_noise_markers: Vec<String>,

    /// Write a disposable diagnostic record per execution
    pub diagnostics_enabled: bool,
}

impl Settings {
    /// Load settings from environment variables with defaults
    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok();

        let settings = Self {
            app_name: env_or_default("APP_NAME", "codemaster"),
            app_version: env!("CARGO_PKG_VERSION").to_string(),
            environment: env_or_default("ENVIRONMENT", "development")
                .parse()
                .unwrap_or_default(),
            log_level: env_or_default("LOG_LEVEL", "info"),

            host: env_or_default("HOST", "0.0.0.0"),
            port: env_or_default("PORT", "8000")
                .parse()
                .context("Invalid PORT value")?,

            backend: BackendSettings {
                api_url: env_non_empty("JUDGE0_API_URL"),
                api_key: env_non_empty("JUDGE0_API_KEY"),
                api_host: env_non_empty("JUDGE0_HOST"),
                request_timeout_secs: env_or_default("JUDGE0_REQUEST_TIMEOUT_SECS", "30")
                    .parse()
                    .context("Invalid JUDGE0_REQUEST_TIMEOUT_SECS value")?,
                availability_timeout_secs: env_or_default(
                    "JUDGE0_AVAILABILITY_TIMEOUT_SECS",
                    "10",
                )
                .parse()
                .context("Invalid JUDGE0_AVAILABILITY_TIMEOUT_SECS value")?,
            },

            poll: PollSettings {
                interval_ms: env_or_default("POLL_INTERVAL_MS", "1000")
                    .parse()
                    .context("Invalid POLL_INTERVAL_MS value")?,
                java_interval_ms: env_or_default("JAVA_POLL_INTERVAL_MS", "1500")
                    .parse()
                    .context("Invalid JAVA_POLL_INTERVAL_MS value")?,
                max_attempts: env_or_default("POLL_MAX_ATTEMPTS", "15")
                    .parse()
                    .context("Invalid POLL_MAX_ATTEMPTS value")?,
            },

            enabled_languages: match env_non_empty("ENABLED_LANGUAGES") {
                Some(list) => parse_languages(&list)?,
                None => Language::ALL.to_vec(),
            },

            java_noise_markers: match env::var("JAVA_STDERR_NOISE_MARKERS") {
                Ok(list) => parse_list(&list),
                Err(_) => default_noise_markers(),
            },

            diagnostics_enabled: env_or_default("DIAGNOSTICS_ENABLED", "true")
                .parse()
                .unwrap_or(true),
        };

        settings.validate()?;

        Ok(settings)
    }

    /// Validate settings
    pub fn validate(&self) -> Result<()> {
        if self.port == 0 {
            anyhow::bail!("Port cannot be 0");
        }

        if self.poll.interval_ms == 0 || self.poll.java_interval_ms == 0 {
            anyhow::bail!("Poll intervals must be > 0");
        }
        if self.poll.max_attempts == 0 {
            anyhow::bail!("POLL_MAX_ATTEMPTS must be > 0");
        }

        if self.backend.request_timeout_secs == 0 || self.backend.availability_timeout_secs == 0 {
            anyhow::bail!("Backend timeouts must be > 0");
        }

        if self.enabled_languages.is_empty() {
            anyhow::bail!("ENABLED_LANGUAGES must name at least one language");
        }

        if self.backend.api_url.is_none() {
            tracing::warn!("JUDGE0_API_URL is not set; /run will report the backend unavailable");
        }

        Ok(())
    }

    /// Get the server address string
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn poll_config(&self) -> PollConfig {
        PollConfig {
            interval: Duration::from_millis(self.poll.interval_ms),
            java_interval: Duration::from_millis(self.poll.java_interval_ms),
            max_attempts: self.poll.max_attempts,
        }
    }

    pub fn judge0_config(&self) -> Judge0Config {
        Judge0Config {
            api_url: self.backend.api_url.clone(),
            api_key: self.backend.api_key.clone(),
            api_host: self.backend.api_host.clone(),
            request_timeout_secs: self.backend.request_timeout_secs,
            availability_timeout_secs: self.backend.availability_timeout_secs,
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            app_name: "codemaster".to_string(),
            app_version: env!("CARGO_PKG_VERSION").to_string(),
            environment: Environment::Development,
            log_level: "info".to_string(),
            host: "0.0.0.0".to_string(),
            port: 8000,
            backend: BackendSettings::default(),
            poll: PollSettings::default(),
            enabled_languages: Language::ALL.to_vec(),
            java_noise_markers: default_noise_markers(),
            diagnostics_enabled: true,
        }
    }
}

/// Helper function to get environment variable with default
fn env_or_default(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_non_empty(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn default_noise_markers() -> Vec<String> {
    DEFAULT_JAVA_NOISE_MARKERS
        .iter()
        .map(|m| m.to_string())
        .collect()
}

fn parse_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_languages(raw: &str) -> Result<Vec<Language>> {
    let mut languages = Vec::new();
    for name in parse_list(raw) {
        let language: Language = name
            .parse()
            .with_context(|| format!("Invalid ENABLED_LANGUAGES entry: {}", name))?;
        if !languages.contains(&language) {
            languages.push(language);
        }
    }
    Ok(languages)
}
