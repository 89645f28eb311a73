//! Code execution engine
//!
//! Everything between an incoming snippet and a classified result: source
//! analysis, the Java entry-point rewrite, the runtime-input guard, the
//! submit/poll protocol and result classification.

pub mod analyzer;
pub mod backend;
pub mod classifier;
pub mod errors;
pub mod guard;
pub mod normalizer;
pub mod orchestrator;
pub mod poll;
pub mod scratch;
pub mod types;

pub use backend::{ExecutionBackend, StatusPayload, Submission, SubmissionToken};
pub use errors::{BackendError, ClassifyError, ExecutionError, TransportError};
pub use orchestrator::Orchestrator;
pub use poll::{PollConfig, PollState};
pub use scratch::ScratchArea;
pub use types::{EntryPointDecision, ExecutionOutcome, ExecutionRequest, ExecutionResult};
