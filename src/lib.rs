//! CodeMaster execution gateway
//!
//! Accepts source snippets over HTTP, runs them on a Judge0 execution
//! backend and returns normalized results.

pub mod api;
pub mod config;
pub mod engine;
pub mod error;
pub mod languages;
pub mod logging;
pub mod middleware;
pub mod server;
pub mod services;
pub mod utils;

pub use config::Settings;
pub use engine::{ExecutionRequest, ExecutionResult, Orchestrator};
pub use error::ApiError;
pub use server::App;
