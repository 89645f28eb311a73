//! Execution orchestrator
//!
//! Drives one request through guard, naming, submission and polling:
//!
//! 1. unknown language → `UnsupportedLanguage`
//! 2. blocking stdin read detected → `RuntimeInputDetected` (no remote call)
//! 3. backend flagged unreachable → `ServiceUnavailable`
//! 4. derive the display filename and, for Java, rename the entry class
//! 5. submit, then poll once per interval up to the attempt budget
//! 6. classify the first terminal status, or report a poll timeout
//!
//! Anything that goes wrong after step 3 comes back as a failed
//! `ExecutionResult`; nothing past validation surfaces as an `Err`.

use super::analyzer;
use super::backend::{ExecutionBackend, Submission, SubmissionToken};
use super::classifier::{self, Classification, ResultContext};
use super::errors::{BackendError, ExecutionError, TransportError};
use super::guard;
use super::normalizer;
use super::poll::{PollConfig, PollState};
use super::scratch::{DiagnosticEntry, DiagnosticRecord, ScratchArea};
use super::types::{EntryPointDecision, ExecutionOutcome, ExecutionRequest, ExecutionResult};
use crate::languages::{LanguageConfig, LanguageRegistry};
use crate::services::BackendAvailability;
use crate::utils::truncate_with_suffix;
use std::sync::Arc;
use tokio::time::sleep;
use uuid::Uuid;

/// Shown when the attempt budget runs out
pub const POLL_TIMEOUT_MESSAGE: &str = "Execution timeout - please try again";

/// Owns the submit / poll / classify protocol against one backend
pub struct Orchestrator {
    registry: Arc<LanguageRegistry>,
    backend: Arc<dyn ExecutionBackend>,
    availability: Arc<BackendAvailability>,
    poll: PollConfig,
    scratch: Option<Arc<ScratchArea>>,
}

impl Orchestrator {
    pub fn new(
        registry: Arc<LanguageRegistry>,
        backend: Arc<dyn ExecutionBackend>,
        availability: Arc<BackendAvailability>,
        poll: PollConfig,
    ) -> Self {
        Self {
            registry,
            backend,
            availability,
            poll,
            scratch: None,
        }
    }

    /// Write a diagnostic record for every execution into `scratch`
    pub fn with_scratch(mut self, scratch: Arc<ScratchArea>) -> Self {
        self.scratch = Some(scratch);
        self
    }

    pub fn registry(&self) -> &LanguageRegistry {
        &self.registry
    }

    pub fn poll_config(&self) -> &PollConfig {
        &self.poll
    }

    /// Validate a request and decide its naming, without touching the network
    pub fn prepare<'r>(
        &'r self,
        request: &ExecutionRequest,
    ) -> Result<(&'r LanguageConfig, EntryPointDecision), ExecutionError> {
        let config = self.registry.lookup(request.language)?;

        if let Some(signature) = guard::matching_signature(&request.source_code, config) {
            tracing::info!(
                language = %config.id,
                signature = %signature,
                "Rejecting code that reads interactive input"
            );
            return Err(ExecutionError::RuntimeInputDetected);
        }

        Ok((config, decide_entry_point(request, config)))
    }

    /// Run one request to completion
    pub async fn execute(
        &self,
        request: &ExecutionRequest,
    ) -> Result<ExecutionResult, ExecutionError> {
        let (config, decision) = self.prepare(request)?;

        if !self.availability.is_available() {
            return Err(ExecutionError::ServiceUnavailable);
        }

        let execution_id = format!("exec_{}", Uuid::new_v4().simple());

        // dropped at the end of this call, which deletes the record
        let _record = self.write_diagnostics(&execution_id, request, &decision);

        if let Some(original) = &decision.original_entry_name {
            tracing::info!(
                execution_id = %execution_id,
                original_class = %original,
                "Renamed Java entry class to Main for execution"
            );
        }

        let result = match self
            .run_remote(&execution_id, config, &decision, request.stdin.as_deref())
            .await
        {
            Ok(result) => result,
            Err(e) => {
                tracing::error!(
                    execution_id = %execution_id,
                    error = %e,
                    "Execution failed with transport error"
                );
                ExecutionResult::failure(
                    ExecutionOutcome::TransportException,
                    format!("Execution error: {}", e),
                    &decision,
                )
            }
        };

        if result.success {
            tracing::info!(execution_id = %execution_id, "Execution succeeded");
        } else {
            tracing::warn!(
                execution_id = %execution_id,
                outcome = ?result.outcome,
                output = %truncate_with_suffix(&result.output, 200, "..."),
                "Execution failed"
            );
        }

        Ok(result)
    }

    fn write_diagnostics(
        &self,
        execution_id: &str,
        request: &ExecutionRequest,
        decision: &EntryPointDecision,
    ) -> Option<DiagnosticRecord> {
        let scratch = self.scratch.as_ref()?;
        let entry = DiagnosticEntry {
            execution_id,
            language: request.language,
            filename: &decision.display_filename,
            source: &request.source_code,
        };

        match scratch.record(&entry) {
            Ok(record) => Some(record),
            Err(e) => {
                tracing::warn!(
                    execution_id = %execution_id,
                    error = %e,
                    "Failed to write diagnostic record"
                );
                None
            }
        }
    }

    async fn run_remote(
        &self,
        execution_id: &str,
        config: &LanguageConfig,
        decision: &EntryPointDecision,
        stdin: Option<&str>,
    ) -> Result<ExecutionResult, TransportError> {
        let submission = Submission::encode(
            &decision.transformed_source,
            config.backend_language_id,
            stdin,
        );

        let token = match self.backend.submit(&submission).await {
            Ok(token) => token,
            Err(BackendError::Rejected(body)) => {
                tracing::error!(execution_id = %execution_id, body = %body, "Submission rejected");
                return Ok(ExecutionResult::failure(
                    ExecutionOutcome::SubmissionError,
                    format!("Submission failed: {}", body),
                    decision,
                ));
            }
            Err(e) => return Err(e.into()),
        };

        tracing::info!(
            execution_id = %execution_id,
            token = %token,
            language = %config.id,
            "Code submitted for execution"
        );

        let ctx = ResultContext {
            language: config.id,
            display_filename: &decision.display_filename,
            original_entry_name: decision.original_entry_name.as_deref(),
            stderr_policy: &config.stderr_policy,
        };

        if let Some(result) = self.poll_until_terminal(&token, config, &ctx).await? {
            return Ok(result);
        }

        tracing::warn!(
            execution_id = %execution_id,
            token = %token,
            attempts = self.poll.max_attempts,
            budget_ms = self.poll.budget_for(config.id).as_millis() as u64,
            "Execution timed out waiting for a terminal status"
        );
        Ok(ExecutionResult::failure(
            ExecutionOutcome::PollTimeout,
            POLL_TIMEOUT_MESSAGE,
            decision,
        ))
    }

    /// Poll until a terminal status; `None` when the attempt budget runs out
    async fn poll_until_terminal(
        &self,
        token: &SubmissionToken,
        config: &LanguageConfig,
        ctx: &ResultContext<'_>,
    ) -> Result<Option<ExecutionResult>, TransportError> {
        let interval = self.poll.interval_for(config.id);
        let mut state = PollState::Queued;

        for attempt in 1..=self.poll.max_attempts {
            sleep(interval).await;

            let Some(payload) = self.backend.status(token).await? else {
                tracing::debug!(token = %token, attempt, "Status request was not successful");
                continue;
            };

            state = state.next(payload.status_id());
            match classifier::classify(state, &payload, ctx)? {
                Classification::Pending(pending) => {
                    tracing::debug!(token = %token, attempt, state = ?pending, "Job still running");
                }
                Classification::Terminal(result) => {
                    tracing::debug!(token = %token, attempt, state = ?state, "Job reached terminal status");
                    return Ok(Some(result));
                }
            }
        }

        Ok(None)
    }
}

/// Display filename plus the source actually submitted
fn decide_entry_point(request: &ExecutionRequest, config: &LanguageConfig) -> EntryPointDecision {
    let display_filename = match &request.explicit_filename {
        Some(name) if !name.trim().is_empty() => name.clone(),
        _ => analyzer::build_filename(&request.source_code, config),
    };
    let (transformed_source, original_entry_name) =
        normalizer::normalize_entry(&request.source_code, config.id);

    EntryPointDecision {
        display_filename,
        transformed_source,
        original_entry_name,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::backend::{encode_payload, BackendStatus, StatusPayload};
    use crate::languages::Language;
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::time::Duration;

    /// Backend that replays a fixed script of status responses
    struct ScriptedBackend {
        submit_response: Mutex<Option<Result<SubmissionToken, BackendError>>>,
        statuses: Mutex<VecDeque<Result<Option<StatusPayload>, BackendError>>>,
        submissions: Mutex<Vec<Submission>>,
        status_calls: Mutex<u32>,
    }

    impl ScriptedBackend {
        fn new(statuses: Vec<Result<Option<StatusPayload>, BackendError>>) -> Self {
            Self {
                submit_response: Mutex::new(Some(Ok(SubmissionToken::new("tok-1")))),
                statuses: Mutex::new(statuses.into()),
                submissions: Mutex::new(Vec::new()),
                status_calls: Mutex::new(0),
            }
        }

        fn rejecting(body: &str) -> Self {
            let backend = Self::new(Vec::new());
            *backend.submit_response.lock().unwrap() =
                Some(Err(BackendError::Rejected(body.to_string())));
            backend
        }

        fn submissions(&self) -> Vec<Submission> {
            self.submissions.lock().unwrap().clone()
        }

        fn status_calls(&self) -> u32 {
            *self.status_calls.lock().unwrap()
        }
    }

    #[async_trait]
    impl ExecutionBackend for ScriptedBackend {
        async fn submit(&self, submission: &Submission) -> Result<SubmissionToken, BackendError> {
            self.submissions.lock().unwrap().push(submission.clone());
            self.submit_response
                .lock()
                .unwrap()
                .take()
                .unwrap_or_else(|| Ok(SubmissionToken::new("tok-n")))
        }

        async fn status(
            &self,
            _token: &SubmissionToken,
        ) -> Result<Option<StatusPayload>, BackendError> {
            *self.status_calls.lock().unwrap() += 1;
            self.statuses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Ok(Some(status(1, "In Queue"))))
        }

        async fn is_available(&self) -> bool {
            true
        }
    }

    fn status(id: u32, description: &str) -> StatusPayload {
        StatusPayload {
            status: Some(BackendStatus {
                id,
                description: Some(description.to_string()),
            }),
            ..Default::default()
        }
    }

    fn accepted(stdout: &str) -> StatusPayload {
        StatusPayload {
            stdout: Some(encode_payload(stdout)),
            time: Some(0.01),
            memory: Some(3000),
            ..status(3, "Accepted")
        }
    }

    fn fast_poll() -> PollConfig {
        PollConfig {
            interval: Duration::from_millis(1),
            java_interval: Duration::from_millis(1),
            max_attempts: 15,
        }
    }

    fn orchestrator(backend: Arc<ScriptedBackend>) -> Orchestrator {
        Orchestrator::new(
            Arc::new(LanguageRegistry::default()),
            backend,
            Arc::new(BackendAvailability::new(true)),
            fast_poll(),
        )
    }

    #[tokio::test]
    async fn test_python_hello() {
        let backend = Arc::new(ScriptedBackend::new(vec![
            Ok(Some(status(1, "In Queue"))),
            Ok(Some(status(2, "Processing"))),
            Ok(Some(accepted("hi\n"))),
        ]));
        let orchestrator = orchestrator(backend.clone());

        let request = ExecutionRequest::new("print(\"hi\")", Language::Python);
        let result = orchestrator.execute(&request).await.unwrap();

        assert!(result.success);
        assert_eq!(result.output, "hi\n");
        assert_eq!(result.display_filename, "main.py");
        assert_eq!(result.execution_time_seconds, Some(0.01));
        assert_eq!(backend.status_calls(), 3);

        let submitted = backend.submissions();
        assert_eq!(submitted.len(), 1);
        assert_eq!(submitted[0].language_id, 71);
        assert_eq!(submitted[0].source_code, encode_payload("print(\"hi\")"));
    }

    #[tokio::test]
    async fn test_java_class_is_renamed_and_restored() {
        let backend = Arc::new(ScriptedBackend::new(vec![Ok(Some(status(3, "Accepted")))]));
        let orchestrator = orchestrator(backend.clone());

        let source = "public class HelloWorld { public static void main(String[] a){System.out.println(\"hi\");} }";
        let result = orchestrator
            .execute(&ExecutionRequest::new(source, Language::Java))
            .await
            .unwrap();

        assert!(result.success);
        assert_eq!(result.display_filename, "HelloWorld.java");
        assert_eq!(result.original_entry_name.as_deref(), Some("HelloWorld"));
        assert!(result.output.contains("executed successfully"));

        let submitted = backend.submissions();
        let sent = crate::engine::backend::decode_payload(&submitted[0].source_code).unwrap();
        assert!(sent.contains("public class Main"));
        assert!(!sent.contains("HelloWorld"));
    }

    #[tokio::test]
    async fn test_runtime_input_makes_no_backend_call() {
        let backend = Arc::new(ScriptedBackend::new(Vec::new()));
        let orchestrator = orchestrator(backend.clone());

        let request = ExecutionRequest::new("name = input()\nprint(name)", Language::Python);
        let err = orchestrator.execute(&request).await.unwrap_err();

        assert_eq!(err, ExecutionError::RuntimeInputDetected);
        assert!(backend.submissions().is_empty());
        assert_eq!(backend.status_calls(), 0);
    }

    #[tokio::test]
    async fn test_disabled_language_is_rejected() {
        let backend = Arc::new(ScriptedBackend::new(Vec::new()));
        let orchestrator = Orchestrator::new(
            Arc::new(LanguageRegistry::new(&[Language::Python], &[])),
            backend.clone(),
            Arc::new(BackendAvailability::new(true)),
            fast_poll(),
        );

        let err = orchestrator
            .execute(&ExecutionRequest::new("fn main() {}", Language::Rust))
            .await
            .unwrap_err();
        assert_eq!(err, ExecutionError::UnsupportedLanguage("rust".to_string()));
        assert!(backend.submissions().is_empty());
    }

    #[tokio::test]
    async fn test_unavailable_backend_is_rejected() {
        let backend = Arc::new(ScriptedBackend::new(Vec::new()));
        let orchestrator = Orchestrator::new(
            Arc::new(LanguageRegistry::default()),
            backend.clone(),
            Arc::new(BackendAvailability::new(false)),
            fast_poll(),
        );

        let err = orchestrator
            .execute(&ExecutionRequest::new("print(1)", Language::Python))
            .await
            .unwrap_err();
        assert_eq!(err, ExecutionError::ServiceUnavailable);
        assert!(backend.submissions().is_empty());
    }

    #[tokio::test]
    async fn test_accepted_on_last_attempt() {
        let mut script: Vec<_> = (0..14).map(|_| Ok(Some(status(1, "In Queue")))).collect();
        script.push(Ok(Some(accepted("late\n"))));
        let backend = Arc::new(ScriptedBackend::new(script));
        let orchestrator = orchestrator(backend.clone());

        let result = orchestrator
            .execute(&ExecutionRequest::new("print('late')", Language::Python))
            .await
            .unwrap();

        assert!(result.success);
        assert_eq!(result.output, "late\n");
        assert_eq!(backend.status_calls(), 15);
    }

    #[tokio::test]
    async fn test_poll_budget_exhausted() {
        let script: Vec<_> = (0..15).map(|_| Ok(Some(status(1, "In Queue")))).collect();
        let backend = Arc::new(ScriptedBackend::new(script));
        let orchestrator = orchestrator(backend.clone());
        let budget = orchestrator.poll_config().budget_for(Language::Python);
        assert_eq!(budget, Duration::from_millis(15));

        let started = std::time::Instant::now();
        let result = orchestrator
            .execute(&ExecutionRequest::new("while True: pass", Language::Python))
            .await
            .unwrap();
        assert!(started.elapsed() >= budget);

        assert!(!result.success);
        assert_eq!(result.outcome, ExecutionOutcome::PollTimeout);
        assert_eq!(result.output, POLL_TIMEOUT_MESSAGE);
        assert_eq!(backend.status_calls(), 15);
    }

    #[tokio::test]
    async fn test_unsuccessful_status_requests_spend_attempts() {
        let mut script: Vec<_> = (0..3).map(|_| Ok(None)).collect();
        script.push(Ok(Some(accepted("ok"))));
        let backend = Arc::new(ScriptedBackend::new(script));
        let orchestrator = orchestrator(backend.clone());

        let result = orchestrator
            .execute(&ExecutionRequest::new("print('ok')", Language::Python))
            .await
            .unwrap();
        assert!(result.success);
        assert_eq!(backend.status_calls(), 4);
    }

    #[tokio::test]
    async fn test_submission_rejected() {
        let backend = Arc::new(ScriptedBackend::rejecting("{\"error\":\"quota\"}"));
        let orchestrator = orchestrator(backend.clone());

        let result = orchestrator
            .execute(&ExecutionRequest::new("print(1)", Language::Python))
            .await
            .unwrap();

        assert!(!result.success);
        assert_eq!(result.outcome, ExecutionOutcome::SubmissionError);
        assert_eq!(result.output, "Submission failed: {\"error\":\"quota\"}");
        assert_eq!(backend.status_calls(), 0);
    }

    #[tokio::test]
    async fn test_transport_fault_becomes_failure_result() {
        let backend = Arc::new(ScriptedBackend::new(vec![Err(BackendError::Parse(
            "unexpected body".to_string(),
        ))]));
        let orchestrator = orchestrator(backend);

        let result = orchestrator
            .execute(&ExecutionRequest::new("print(1)", Language::Python))
            .await
            .unwrap();

        assert!(!result.success);
        assert_eq!(result.outcome, ExecutionOutcome::TransportException);
        assert_eq!(
            result.output,
            "Execution error: Failed to parse response: unexpected body"
        );
        assert_eq!(result.display_filename, "main.py");
    }

    #[tokio::test]
    async fn test_compile_failure_keeps_filename() {
        let failed = StatusPayload {
            compile_output: Some(encode_payload("Main.java:1: error: ';' expected")),
            ..status(6, "Compilation Error")
        };
        let backend = Arc::new(ScriptedBackend::new(vec![Ok(Some(failed))]));
        let orchestrator = orchestrator(backend);

        let result = orchestrator
            .execute(&ExecutionRequest::new("public class Broken { int x }", Language::Java))
            .await
            .unwrap();

        assert!(!result.success);
        assert_eq!(result.outcome, ExecutionOutcome::CompileFailed);
        assert_eq!(result.output, "Main.java:1: error: ';' expected");
        assert_eq!(result.display_filename, "Broken.java");
        assert_eq!(result.status_description.as_deref(), Some("Compilation Error"));
    }

    #[tokio::test]
    async fn test_explicit_filename_wins() {
        let backend = Arc::new(ScriptedBackend::new(vec![Ok(Some(accepted("x")))]));
        let orchestrator = orchestrator(backend);

        let request = ExecutionRequest::new("print('x')", Language::Python)
            .with_filename("script.py")
            .with_stdin("");
        let result = orchestrator.execute(&request).await.unwrap();
        assert_eq!(result.display_filename, "script.py");
    }

    #[tokio::test]
    async fn test_stdin_is_encoded() {
        let backend = Arc::new(ScriptedBackend::new(vec![Ok(Some(accepted("3")))]));
        let orchestrator = orchestrator(backend.clone());

        let request = ExecutionRequest::new("print(3)", Language::Python).with_stdin("1 2");
        orchestrator.execute(&request).await.unwrap();
        assert_eq!(backend.submissions()[0].stdin, encode_payload("1 2"));
    }

    #[tokio::test]
    async fn test_diagnostic_record_removed_after_execution() {
        let parent = tempfile::tempdir().unwrap();
        let scratch = Arc::new(ScratchArea::create_in(parent.path()).unwrap());
        let backend = Arc::new(ScriptedBackend::new(vec![Err(BackendError::NotConfigured)]));
        let orchestrator = orchestrator(backend).with_scratch(scratch.clone());

        let result = orchestrator
            .execute(&ExecutionRequest::new("print(1)", Language::Python))
            .await
            .unwrap();

        assert!(!result.success);
        let leftover = std::fs::read_dir(scratch.files_dir()).unwrap().count();
        assert_eq!(leftover, 0);
    }

    #[test]
    fn test_prepare_is_deterministic() {
        let backend = Arc::new(ScriptedBackend::new(Vec::new()));
        let orchestrator = orchestrator(backend);
        let request = ExecutionRequest::new("class Foo { }", Language::Java);

        let (_, first) = orchestrator.prepare(&request).unwrap();
        let (_, second) = orchestrator.prepare(&request).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.display_filename, "Foo.java");
        assert_eq!(first.transformed_source, "public class Main { }");
    }
}
