//! Error taxonomy for the execution engine
//!
//! Pre-submission rejections are `ExecutionError`s. Faults that happen while a
//! job is in flight never escape the orchestrator: they are folded into a
//! failed `ExecutionResult` tagged with an `ExecutionOutcome`.

use thiserror::Error;

/// Rejections raised before any call to the execution backend
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExecutionError {
    #[error("Language {0} not supported")]
    UnsupportedLanguage(String),

    #[error("Sorry for the inconvenience, this is not able to work for runtime inputs")]
    RuntimeInputDetected,

    #[error("Execution backend not available. Please check configuration.")]
    ServiceUnavailable,
}

/// Errors reported by an `ExecutionBackend` implementation
#[derive(Debug, Error)]
pub enum BackendError {
    /// The backend answered the submission with a non-success status
    #[error("Submission failed: {0}")]
    Rejected(String),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Failed to parse response: {0}")]
    Parse(String),

    #[error("Execution backend URL is not configured")]
    NotConfigured,
}

/// Errors decoding a terminal status payload
#[derive(Debug, Error)]
pub enum ClassifyError {
    #[error("invalid base64 in {field}: {source}")]
    Decode {
        field: &'static str,
        #[source]
        source: base64::DecodeError,
    },
}

/// Any fault while talking to the backend after validation passed
#[derive(Debug, Error)]
pub enum TransportError {
    #[error(transparent)]
    Backend(#[from] BackendError),

    #[error(transparent)]
    Decode(#[from] ClassifyError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejection_messages() {
        assert_eq!(
            ExecutionError::UnsupportedLanguage("cobol".to_string()).to_string(),
            "Language cobol not supported"
        );
        assert_eq!(
            ExecutionError::RuntimeInputDetected.to_string(),
            "Sorry for the inconvenience, this is not able to work for runtime inputs"
        );
    }

    #[test]
    fn test_transport_error_is_transparent() {
        let err: TransportError = BackendError::Parse("missing token".to_string()).into();
        assert_eq!(err.to_string(), "Failed to parse response: missing token");
    }
}
