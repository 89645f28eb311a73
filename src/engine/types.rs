//! Data model shared by the engine stages

use crate::languages::Language;
use serde::Serialize;

/// A caller's request to run one snippet
#[derive(Debug, Clone, PartialEq)]
pub struct ExecutionRequest {
    pub source_code: String,
    pub language: Language,
    pub stdin: Option<String>,
    /// Overrides the derived display filename
    pub explicit_filename: Option<String>,
}

impl ExecutionRequest {
    pub fn new(source_code: impl Into<String>, language: Language) -> Self {
        Self {
            source_code: source_code.into(),
            language,
            stdin: None,
            explicit_filename: None,
        }
    }

    pub fn with_stdin(mut self, stdin: impl Into<String>) -> Self {
        self.stdin = Some(stdin.into());
        self
    }

    pub fn with_filename(mut self, filename: impl Into<String>) -> Self {
        self.explicit_filename = Some(filename.into());
        self
    }
}

/// Naming and source rewrite decided before submission
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryPointDecision {
    pub display_filename: String,
    /// Source actually sent to the backend
    pub transformed_source: String,
    /// Entry name the caller wrote, when it had to be renamed
    pub original_entry_name: Option<String>,
}

/// Why an execution ended the way it did
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionOutcome {
    Accepted,
    CompileFailed,
    RuntimeFailed,
    /// The backend itself killed the program for exceeding its time limit
    TimeLimitExceeded,
    /// The backend reported an internal or unrecognised failure status
    ServiceError,
    SubmissionError,
    /// Our own attempt budget ran out before a terminal status arrived
    PollTimeout,
    TransportException,
}

/// Terminal result of one execution
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExecutionResult {
    pub success: bool,
    pub outcome: ExecutionOutcome,
    pub output: String,
    pub execution_time_seconds: Option<f64>,
    pub memory_kb: Option<u64>,
    pub display_filename: String,
    pub original_entry_name: Option<String>,
    pub status_description: Option<String>,
}

impl ExecutionResult {
    /// A failed result carrying only a message and the naming context
    pub fn failure(
        outcome: ExecutionOutcome,
        output: impl Into<String>,
        decision: &EntryPointDecision,
    ) -> Self {
        Self {
            success: false,
            outcome,
            output: output.into(),
            execution_time_seconds: None,
            memory_kb: None,
            display_filename: decision.display_filename.clone(),
            original_entry_name: decision.original_entry_name.clone(),
            status_description: None,
        }
    }
}
