//! Result classifier
//!
//! Turns a terminal status payload into the caller-facing result. Pure: it
//! depends only on the payload and the naming context, never on the network.

use super::backend::{decode_payload, StatusPayload};
use super::errors::ClassifyError;
use super::poll::PollState;
use super::types::{ExecutionOutcome, ExecutionResult};
use crate::languages::{Language, StderrPolicy};

/// Naming context carried from the entry-point decision
#[derive(Debug, Clone, Copy)]
pub struct ResultContext<'a> {
    pub language: Language,
    pub display_filename: &'a str,
    pub original_entry_name: Option<&'a str>,
    pub stderr_policy: &'a StderrPolicy,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Classification {
    /// Still queued or running; poll again
    Pending(PollState),
    Terminal(ExecutionResult),
}

fn decode_field(
    value: Option<&String>,
    field: &'static str,
) -> Result<Option<String>, ClassifyError> {
    value
        .filter(|encoded| !encoded.is_empty())
        .map(|encoded| {
            decode_payload(encoded).map_err(|source| ClassifyError::Decode { field, source })
        })
        .transpose()
}

/// Drop blank lines and lines containing any noise marker (case-insensitive)
pub fn filter_stderr(stderr: &str, markers: &[String]) -> String {
    stderr
        .split('\n')
        .filter(|line| {
            let lowered = line.to_lowercase();
            !line.trim().is_empty() && !markers.iter().any(|marker| lowered.contains(marker.as_str()))
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Message shown when a successful run printed nothing
pub fn success_placeholder(language: Language, original_entry_name: Option<&str>) -> String {
    match original_entry_name {
        Some(name) => format!("{} class '{}' executed successfully", language.label(), name),
        None => "Code executed successfully (no output)".to_string(),
    }
}

/// Classify a status payload observed in `state`
pub fn classify(
    state: PollState,
    payload: &StatusPayload,
    ctx: &ResultContext<'_>,
) -> Result<Classification, ClassifyError> {
    let Some(outcome) = state.outcome() else {
        return Ok(Classification::Pending(state));
    };

    let stdout = decode_field(payload.stdout.as_ref(), "stdout")?;
    let stderr = decode_field(payload.stderr.as_ref(), "stderr")?;

    let mut result = ExecutionResult {
        success: outcome == ExecutionOutcome::Accepted,
        outcome,
        output: String::new(),
        execution_time_seconds: payload.time,
        memory_kb: payload.memory,
        display_filename: ctx.display_filename.to_string(),
        original_entry_name: ctx.original_entry_name.map(str::to_string),
        status_description: None,
    };

    if result.success {
        let mut output = stdout.unwrap_or_default();
        if let Some(stderr) = stderr {
            match ctx.stderr_policy {
                StderrPolicy::Passthrough => output.push_str(&stderr),
                StderrPolicy::FilterNoise(markers) => {
                    output.push_str(&filter_stderr(&stderr, markers));
                }
            }
        }

        result.output = if output.is_empty() {
            success_placeholder(ctx.language, ctx.original_entry_name)
        } else {
            output
        };
        return Ok(Classification::Terminal(result));
    }

    let description = payload
        .status_description()
        .unwrap_or("Unknown error")
        .to_string();

    let mut error_output = decode_field(payload.compile_output.as_ref(), "compile_output")?
        .unwrap_or_default();
    if let Some(stderr) = stderr.filter(|s| !s.trim().is_empty()) {
        error_output.push_str("\nRuntime Error:\n");
        error_output.push_str(&stderr);
    }
    if error_output.trim().is_empty() {
        error_output = description.clone();
    }

    result.output = error_output;
    result.status_description = Some(description);
    Ok(Classification::Terminal(result))
}
