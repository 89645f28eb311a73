//! Backend reachability flag
//!
//! Probed once at startup and shared read-only by every execution. The
//! readiness endpoint can re-probe explicitly through `refresh`.

use crate::engine::ExecutionBackend;
use std::sync::atomic::{AtomicBool, Ordering};

#[derive(Debug)]
pub struct BackendAvailability {
    available: AtomicBool,
}

impl BackendAvailability {
    pub fn new(available: bool) -> Self {
        Self {
            available: AtomicBool::new(available),
        }
    }

    /// Probe `backend` and build the flag from the answer
    pub async fn probe(backend: &dyn ExecutionBackend) -> Self {
        let flag = Self::new(false);
        flag.refresh(backend).await;
        flag
    }

    pub fn is_available(&self) -> bool {
        self.available.load(Ordering::Relaxed)
    }

    pub fn set(&self, available: bool) {
        self.available.store(available, Ordering::Relaxed);
    }

    /// Re-probe the backend and store the result
    pub async fn refresh(&self, backend: &dyn ExecutionBackend) -> bool {
        let available = backend.is_available().await;
        let previous = self.available.swap(available, Ordering::Relaxed);

        if previous != available {
            if available {
                tracing::info!("Execution backend is reachable");
            } else {
                tracing::warn!("Execution backend is not reachable");
            }
        }

        available
    }
}

impl Default for BackendAvailability {
    fn default() -> Self {
        Self::new(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{BackendError, StatusPayload, Submission, SubmissionToken};
    use async_trait::async_trait;

    struct FixedBackend(bool);

    #[async_trait]
    impl ExecutionBackend for FixedBackend {
        async fn submit(&self, _: &Submission) -> Result<SubmissionToken, BackendError> {
            Err(BackendError::NotConfigured)
        }

        async fn status(&self, _: &SubmissionToken) -> Result<Option<StatusPayload>, BackendError> {
            Err(BackendError::NotConfigured)
        }

        async fn is_available(&self) -> bool {
            self.0
        }
    }

    #[tokio::test]
    async fn test_probe_and_refresh() {
        let flag = BackendAvailability::probe(&FixedBackend(true)).await;
        assert!(flag.is_available());

        assert!(!flag.refresh(&FixedBackend(false)).await);
        assert!(!flag.is_available());
    }

    #[test]
    fn test_defaults_to_unavailable() {
        let flag = BackendAvailability::default();
        assert!(!flag.is_available());
        flag.set(true);
        assert!(flag.is_available());
    }
}
