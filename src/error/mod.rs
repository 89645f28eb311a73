//! HTTP-facing error handling

pub mod types;

pub use types::ApiError;
