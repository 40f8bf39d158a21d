//! Orchestrates a full pull request set run.

mod config;
mod error;
mod plan;

pub use config::RunnerConfig;
pub use error::RunnerError;
pub use plan::{Overrides, Plan};

use crate::client::{DryRunClient, GitHubClient, RepositoryClient};
use crate::pull_requests::Orchestrator;
use crate::summary::RunSummary;
use crate::templates::TemplateRenderer;
use tracing::{info, warn};

/// Runs a [`Plan`] against a repository client.
pub struct Runner {
    config: RunnerConfig,
    client: Box<dyn RepositoryClient>,
}

impl Runner {
    /// Builds a runner around an existing client.
    pub fn new(config: RunnerConfig, client: Box<dyn RepositoryClient>) -> Self {
        Self { config, client }
    }

    /// Builds a runner for the configured mode.
    ///
    /// Dry runs record calls with a [`DryRunClient`] and need no token. Live
    /// runs authenticate with GitHub and verify the token before returning.
    ///
    /// # Errors
    ///
    /// Returns [`RunnerError`] if the token is missing or rejected.
    pub async fn connect(config: RunnerConfig, token: Option<&str>) -> Result<Self, RunnerError> {
        if config.dry_run() {
            info!("Dry run: no pull requests will be opened");
            return Ok(Self::new(config, Box::new(DryRunClient::new())));
        }

        let token = token
            .filter(|t| !t.trim().is_empty())
            .ok_or(RunnerError::MissingToken)?;
        let client = GitHubClient::new(token)?;
        client.login().await.map_err(RunnerError::Login)?;

        Ok(Self::new(config, Box::new(client)))
    }

    /// Returns the runner configuration.
    pub fn config(&self) -> &RunnerConfig {
        &self.config
    }

    /// Executes create, link and review stages for the plan.
    ///
    /// # Errors
    ///
    /// Returns [`RunnerError::Template`] if rendering fails. Per-repository
    /// remote failures are reported in the summary instead.
    pub async fn run(&self, plan: &Plan) -> Result<RunSummary, RunnerError> {
        let renderer = TemplateRenderer::with_formats(&plan.formats)?;
        let orchestrator = Orchestrator::new(self.client.as_ref(), &renderer, self.config.concurrency())
            .with_cancellation(self.config.cancellation().clone());

        let pipeline = orchestrator.run(&plan.targets, &plan.change_set).await?;
        let summary = RunSummary::from_pipeline(&plan.targets, &pipeline, self.config.dry_run());

        if summary.cancelled {
            warn!("Run was cancelled before every call was issued");
        }
        info!(
            created = summary.prs_created,
            linked = summary.prs_linked,
            reviews = summary.reviews_requested,
            failed = summary.prs_failed + summary.links_failed + summary.reviews_failed,
            "Run complete"
        );

        Ok(summary)
    }
}
