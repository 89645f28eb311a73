//! Services module
//!
//! External collaborators of the execution engine.

pub mod availability;
pub mod judge0;

pub use availability::BackendAvailability;
pub use judge0::{Judge0Client, Judge0Config};
