//! Turning configuration and command-line input into a runnable plan.

use super::RunnerError;
use crate::change_set::{
    select_targets, validate_targets, ChangeSet, RepositoryKey, RepositoryTarget, TicketReference,
};
use crate::config::{load_template, PrSetConfig};
use crate::templates::{BodyTemplate, SectionFormats, DEFAULT_BODY_TEMPLATE};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Values supplied on the command line, each overriding the configuration.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    /// Pull request title.
    pub title: Option<String>,
    /// Ticket reference.
    pub ticket: Option<String>,
    /// Head branch for repositories that do not set one.
    pub head: Option<String>,
    /// Base branch for repositories that do not set one.
    pub base: Option<String>,
    /// Reviewers; replaces the configured list when non-empty.
    pub reviewers: Vec<String>,
    /// Repositories to include; empty means all.
    pub repositories: Vec<RepositoryKey>,
    /// Body template path.
    pub template: Option<PathBuf>,
    /// Whether to open drafts.
    pub draft: Option<bool>,
}

/// Everything needed to run the pipeline.
#[derive(Debug, Clone)]
pub struct Plan {
    /// Repositories, in configuration order.
    pub targets: Vec<RepositoryTarget>,
    /// The shared change.
    pub change_set: ChangeSet,
    /// Section formats for the renderer.
    pub formats: SectionFormats,
}

impl Plan {
    /// Builds and validates a plan.
    ///
    /// `config_path` locates templates given relative to the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`RunnerError`] if the template cannot be loaded or parsed, or
    /// if the resulting change set or targets are incomplete.
    pub fn build(
        config: &PrSetConfig,
        config_path: &Path,
        overrides: &Overrides,
    ) -> Result<Self, RunnerError> {
        let targets: Vec<RepositoryTarget> = config
            .repositories
            .iter()
            .map(|r| r.to_target(overrides.head.as_deref(), overrides.base.as_deref()))
            .collect();
        let targets = select_targets(targets, &overrides.repositories)?;
        validate_targets(&targets)?;

        let template_path = overrides
            .template
            .clone()
            .or_else(|| config.template_path(config_path));
        let template = match &template_path {
            Some(path) => {
                debug!(path = %path.display(), "Loading body template");
                load_template(path)?
            }
            None => DEFAULT_BODY_TEMPLATE.to_string(),
        };
        let body_template = BodyTemplate::parse(template)?;

        let title = overrides
            .title
            .clone()
            .or_else(|| config.title.clone())
            .unwrap_or_default();
        let ticket = match &overrides.ticket {
            Some(ticket) => TicketReference::new(ticket),
            None => config.ticket_reference(),
        };
        let reviewers = if overrides.reviewers.is_empty() {
            &config.reviewers
        } else {
            &overrides.reviewers
        };
        let draft = overrides.draft.or(config.draft).unwrap_or(true);

        let change_set = ChangeSet::new(title, body_template)?
            .with_ticket(ticket)
            .with_reviewers(reviewers)
            .with_draft(draft);

        info!(
            repositories = targets.len(),
            title = %change_set.title,
            ticket = ?change_set.ticket.as_ref().map(TicketReference::as_str),
            reviewers = change_set.reviewers.len(),
            "Plan ready"
        );

        Ok(Self {
            targets,
            change_set,
            formats: config.formats.clone(),
        })
    }
}
