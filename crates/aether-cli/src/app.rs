//! Wiring of services for one CLI process.

use crate::output::ConsoleNotifier;
use aether_application::{RefinementOrchestrator, SessionService};
use aether_core::config::RootConfig;
use aether_core::secret::SecretService;
use aether_infrastructure::{AetherPaths, FileSessionSnapshotRepository, SecretServiceImpl};
use aether_interaction::{AgentUiFlows, GeminiApiAgent};
use anyhow::{Result, anyhow};
use std::sync::Arc;

pub struct App {
    pub sessions: Arc<SessionService>,
    /// Missing when no API key is configured; the reason is kept for display.
    orchestrator: std::result::Result<Arc<RefinementOrchestrator>, String>,
}

impl App {
    pub async fn build(paths: &AetherPaths, config: &RootConfig) -> Result<Self> {
        let data_dir = paths
            .data_dir()
            .map_err(|e| anyhow!("Failed to resolve data directory: {}", e))?;
        let repository = Arc::new(FileSessionSnapshotRepository::new(data_dir));
        let sessions =
            Arc::new(SessionService::bootstrap(repository, Arc::new(ConsoleNotifier)).await);

        let orchestrator = Self::build_orchestrator(paths, config, &sessions)
            .await
            .map_err(|e| {
                tracing::warn!("Backend unavailable: {:#}", e);
                format!("{:#}", e)
            });

        Ok(Self {
            sessions,
            orchestrator,
        })
    }

    async fn build_orchestrator(
        paths: &AetherPaths,
        config: &RootConfig,
        sessions: &Arc<SessionService>,
    ) -> Result<Arc<RefinementOrchestrator>> {
        let secret_service = SecretServiceImpl::new(paths)?;
        if !secret_service.secret_file_exists().await {
            let path = paths.ensure_secret_file()?;
            tracing::info!("Created secret template at {}", path.display());
        }
        let secrets = secret_service.load_secrets().await?;
        let agent = GeminiApiAgent::from_config(&config.backend, &secrets)?;
        tracing::info!("Using Gemini model {}", agent.model());

        let flows = Arc::new(AgentUiFlows::new(agent));
        Ok(Arc::new(RefinementOrchestrator::new(sessions.clone(), flows)))
    }

    pub fn orchestrator(&self) -> Result<&Arc<RefinementOrchestrator>> {
        self.orchestrator
            .as_ref()
            .map_err(|reason| anyhow!("Generative backend is not configured: {}", reason))
    }
}
