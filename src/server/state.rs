//! Application state container
//!
//! Shared by every handler through axum state extraction. Cheap to clone;
//! everything behind it is immutable or atomic.

use crate::config::Settings;
use crate::engine::{ExecutionBackend, Orchestrator, ScratchArea};
use crate::languages::LanguageRegistry;
use crate::services::{BackendAvailability, Judge0Client};
use anyhow::Context;
use std::sync::Arc;
use std::time::Instant;

#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,

    pub orchestrator: Arc<Orchestrator>,

    /// Backend client, kept for readiness re-probes
    pub backend: Arc<dyn ExecutionBackend>,

    /// Reachability flag read by every execution
    pub availability: Arc<BackendAvailability>,

    /// Scratch directory for diagnostic records, when enabled
    pub scratch: Option<Arc<ScratchArea>>,

    /// Application start time (for uptime calculation)
    pub start_time: Instant,
}

impl AppState {
    /// Build the state: Judge0 client, one availability probe, scratch area
    pub async fn new(settings: Settings) -> anyhow::Result<Self> {
        let client = Judge0Client::new(settings.judge0_config())
            .context("Failed to build Judge0 HTTP client")?;
        let backend: Arc<dyn ExecutionBackend> = Arc::new(client);

        let availability = BackendAvailability::probe(backend.as_ref()).await;
        tracing::info!(
            backend_available = availability.is_available(),
            "Execution backend probed"
        );

        let scratch = if settings.diagnostics_enabled {
            match ScratchArea::create() {
                Ok(scratch) => {
                    tracing::info!(path = %scratch.path().display(), "Created scratch area");
                    Some(Arc::new(scratch))
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Failed to create scratch area; diagnostics disabled");
                    None
                }
            }
        } else {
            None
        };

        Ok(Self::from_parts(settings, backend, availability, scratch))
    }

    /// Assemble the state around an already constructed backend
    pub fn from_parts(
        settings: Settings,
        backend: Arc<dyn ExecutionBackend>,
        availability: BackendAvailability,
        scratch: Option<Arc<ScratchArea>>,
    ) -> Self {
        let registry = Arc::new(LanguageRegistry::new(
            &settings.enabled_languages,
            &settings.java_noise_markers,
        ));
        let availability = Arc::new(availability);

        let mut orchestrator = Orchestrator::new(
            registry,
            backend.clone(),
            availability.clone(),
            settings.poll_config(),
        );
        if let Some(scratch) = &scratch {
            orchestrator = orchestrator.with_scratch(scratch.clone());
        }

        tracing::debug!(
            languages = settings.enabled_languages.len(),
            "Application state initialized"
        );

        Self {
            settings: Arc::new(settings),
            orchestrator: Arc::new(orchestrator),
            backend,
            availability,
            scratch,
            start_time: Instant::now(),
        }
    }

    pub fn registry(&self) -> &LanguageRegistry {
        self.orchestrator.registry()
    }

    /// Get the application uptime in seconds
    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }

    pub fn is_backend_available(&self) -> bool {
        self.availability.is_available()
    }

    /// Probe the backend again and update the shared flag
    pub async fn refresh_availability(&self) -> bool {
        self.availability.refresh(self.backend.as_ref()).await
    }
}
