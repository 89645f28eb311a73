//! Poll state machine and schedule

use super::types::ExecutionOutcome;
use crate::languages::Language;
use std::time::Duration;

/// Backend status id: job waiting in queue
pub const STATUS_QUEUED: u32 = 1;
/// Backend status id: job running
pub const STATUS_PROCESSING: u32 = 2;
/// Backend status id: job finished normally
pub const STATUS_ACCEPTED: u32 = 3;
const STATUS_TIME_LIMIT: u32 = 5;
const STATUS_COMPILATION_ERROR: u32 = 6;

/// Lifecycle of one submitted job, as seen through status polls
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollState {
    Queued,
    Processing,
    Accepted,
    CompileFailed,
    RuntimeFailed,
    TimedOut,
    ServiceError,
}

impl PollState {
    /// State implied by a backend status id
    ///
    /// A payload without a status id is treated as a backend failure.
    pub fn from_status(status_id: Option<u32>) -> Self {
        match status_id {
            Some(STATUS_QUEUED) => PollState::Queued,
            Some(STATUS_PROCESSING) => PollState::Processing,
            Some(STATUS_ACCEPTED) => PollState::Accepted,
            Some(STATUS_TIME_LIMIT) => PollState::TimedOut,
            Some(STATUS_COMPILATION_ERROR) => PollState::CompileFailed,
            // wrong answer and the runtime-error family (SIGSEGV, SIGFPE, NZEC, ...)
            Some(4) | Some(7..=12) => PollState::RuntimeFailed,
            _ => PollState::ServiceError,
        }
    }

    /// Transition on a freshly observed status; terminal states are absorbing
    pub fn next(self, status_id: Option<u32>) -> Self {
        if self.is_terminal() {
            self
        } else {
            Self::from_status(status_id)
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, PollState::Queued | PollState::Processing)
    }

    /// Outcome recorded for a terminal state
    pub fn outcome(&self) -> Option<ExecutionOutcome> {
        match self {
            PollState::Queued | PollState::Processing => None,
            PollState::Accepted => Some(ExecutionOutcome::Accepted),
            PollState::CompileFailed => Some(ExecutionOutcome::CompileFailed),
            PollState::RuntimeFailed => Some(ExecutionOutcome::RuntimeFailed),
            PollState::TimedOut => Some(ExecutionOutcome::TimeLimitExceeded),
            PollState::ServiceError => Some(ExecutionOutcome::ServiceError),
        }
    }
}

/// How often and how many times to ask for a job's status
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollConfig {
    pub interval: Duration,
    /// Java compiles are slower, so its polls are spaced further apart
    pub java_interval: Duration,
    pub max_attempts: u32,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(1000),
            java_interval: Duration::from_millis(1500),
            max_attempts: 15,
        }
    }
}

impl PollConfig {
    pub fn interval_for(&self, language: Language) -> Duration {
        match language {
            Language::Java => self.java_interval,
            _ => self.interval,
        }
    }

    /// Longest time a poll loop can run, ignoring request latency
    pub fn budget_for(&self, language: Language) -> Duration {
        self.interval_for(language) * self.max_attempts
    }
}
