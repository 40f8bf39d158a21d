//! Opening and cross-linking a pull request set.
//!
//! The orchestrator runs three stages, each a bounded fan-out over the
//! repositories followed by a barrier:
//!
//! 1. **Create**: open a pull request in every target repository.
//! 2. **Link**: rewrite every created pull request's description so it lists
//!    its siblings. Needs the complete result of stage 1.
//! 3. **Request reviewers**: ask the configured reviewers to review every
//!    created pull request.
//!
//! A failure for one repository never stops the others. Repositories whose
//! pull request was not created are skipped by the later stages.

mod cancel;
mod record;
mod stage;
mod status;

pub use cancel::Cancellation;
pub use record::PullRequestRecord;
pub use stage::{StageFailure, StageResult};
pub use status::StageOutcome;

use crate::change_set::{ChangeSet, RepositoryKey, RepositoryTarget};
use crate::client::{NewPullRequest, RepositoryClient};
use crate::templates::{TemplateError, TemplateRenderer};
use stage::{fan_out, gather, Settled};
use std::collections::HashSet;
use tracing::{error, info, info_span, warn, Instrument};

const NOT_CREATED: &str = "pull request was not created";
const NO_REVIEWERS: &str = "no reviewers configured";

/// Outcomes of a full create/link/review run.
#[derive(Debug, Default)]
pub struct PipelineResult {
    /// Stage 1.
    pub created: StageResult,
    /// Stage 2.
    pub linked: StageResult,
    /// Stage 3.
    pub reviewed: StageResult,
}

/// Drives the stages against a [`RepositoryClient`].
pub struct Orchestrator<'a, C: ?Sized> {
    client: &'a C,
    renderer: &'a TemplateRenderer,
    concurrency: usize,
    cancellation: Cancellation,
}

impl<'a, C: RepositoryClient + ?Sized> Orchestrator<'a, C> {
    /// Creates an orchestrator issuing at most `concurrency` calls at a time.
    pub fn new(client: &'a C, renderer: &'a TemplateRenderer, concurrency: usize) -> Self {
        Self {
            client,
            renderer,
            concurrency: concurrency.max(1),
            cancellation: Cancellation::new(),
        }
    }

    /// Uses `cancellation` to stop issuing new calls.
    #[must_use]
    pub fn with_cancellation(mut self, cancellation: Cancellation) -> Self {
        self.cancellation = cancellation;
        self
    }

    /// Runs all three stages, each starting only after the previous one settled.
    ///
    /// # Errors
    ///
    /// Returns [`TemplateError`] if a title or description cannot be rendered.
    /// Remote failures are reported in the result instead.
    pub async fn run(
        &self,
        targets: &[RepositoryTarget],
        change_set: &ChangeSet,
    ) -> Result<PipelineResult, TemplateError> {
        let created = self.create(targets, change_set).await?;
        let linked = self.link(&created.records, targets, change_set).await?;
        let reviewed = self
            .request_reviewers(&created.records, targets, &change_set.reviewers)
            .await;

        Ok(PipelineResult {
            created,
            linked,
            reviewed,
        })
    }

    /// Stage 1: opens a pull request in every target.
    ///
    /// Every target gets the same title and a body without sibling links.
    /// `targets` must not list a repository twice; [`validate_targets`]
    /// rejects such lists before a run.
    ///
    /// [`validate_targets`]: crate::change_set::validate_targets
    ///
    /// # Errors
    ///
    /// Returns [`TemplateError`] before any call is issued if rendering fails.
    pub async fn create(
        &self,
        targets: &[RepositoryTarget],
        change_set: &ChangeSet,
    ) -> Result<StageResult, TemplateError> {
        debug_assert!(
            targets
                .iter()
                .map(|t| &t.key)
                .collect::<HashSet<_>>()
                .len()
                == targets.len(),
            "duplicate repository in targets"
        );

        let title = self.renderer.render_title(change_set)?;
        let body = self.renderer.render_body(change_set, &[])?;
        info!(count = targets.len(), title = %title, "Creating pull requests");

        let client = self.client;
        let title = title.as_str();
        let body = body.as_str();
        let draft = change_set.draft;

        let settled = fan_out(
            targets.iter().collect::<Vec<_>>(),
            self.concurrency,
            &self.cancellation,
            move |target| {
                let span = info_span!("create_pr", repo = %target.key);
                async move {
                    let request = NewPullRequest {
                        repository: &target.key,
                        title,
                        head: &target.head,
                        base: &target.base,
                        body,
                        draft,
                    };
                    match client.create_pull_request(request).await {
                        Ok(pr) => {
                            info!(number = pr.number, url = %pr.url, "Pull request created");
                            Ok(pr)
                        }
                        Err(e) => {
                            error!(error = %e, "Unable to create pull request");
                            Err(e)
                        }
                    }
                }
                .instrument(span)
            },
        )
        .await;

        let working = targets
            .iter()
            .zip(settled)
            .map(|(target, settled)| {
                let settled = settled.map(|pr| PullRequestRecord {
                    repository: target.key.clone(),
                    url: pr.url,
                    number: pr.number,
                });
                (target.key.clone(), settled)
            })
            .collect();

        let result = gather(targets, working, NOT_CREATED);
        log_stage("create", &result);
        Ok(result)
    }

    /// Stage 2: lists every sibling in each created pull request's description.
    ///
    /// Only targets with a record take part. Sibling links follow the order of
    /// `targets`, and a pull request never links to itself.
    ///
    /// # Errors
    ///
    /// Returns [`TemplateError`] before any call is issued if rendering fails.
    pub async fn link(
        &self,
        records: &[PullRequestRecord],
        targets: &[RepositoryTarget],
        change_set: &ChangeSet,
    ) -> Result<StageResult, TemplateError> {
        let working = working_set(records, targets);
        info!(count = working.len(), "Linking pull requests");

        let mut jobs = Vec::with_capacity(working.len());
        for record in &working {
            let linkage: Vec<&str> = working
                .iter()
                .filter(|sibling| sibling.repository != record.repository)
                .map(|sibling| sibling.url.as_str())
                .collect();
            let body = self.renderer.render_body(change_set, &linkage)?;
            jobs.push((*record, body));
        }

        let client = self.client;
        let settled = fan_out(
            jobs,
            self.concurrency,
            &self.cancellation,
            move |(record, body)| {
                let span = info_span!("update_pr", repo = %record.repository, number = record.number);
                async move {
                    match client
                        .update_pull_request(&record.repository, record.number, &body)
                        .await
                    {
                        Ok(url) => {
                            info!(url = %url, "Pull request updated");
                            Ok(url)
                        }
                        Err(e) => {
                            error!(error = %e, "Unable to update pull request");
                            Err(e)
                        }
                    }
                }
                .instrument(span)
            },
        )
        .await;

        let result = gather(targets, settle_records(working, settled), NOT_CREATED);
        log_stage("link", &result);
        Ok(result)
    }

    /// Stage 3: requests `reviewers` on every created pull request.
    ///
    /// Issues no calls when `reviewers` is empty.
    pub async fn request_reviewers(
        &self,
        records: &[PullRequestRecord],
        targets: &[RepositoryTarget],
        reviewers: &[String],
    ) -> StageResult {
        if reviewers.is_empty() {
            info!("No reviewers configured, skipping review requests");
            return gather(targets, Vec::new(), NO_REVIEWERS);
        }

        let working = working_set(records, targets);
        info!(count = working.len(), ?reviewers, "Requesting reviewers");

        let client = self.client;
        let settled = fan_out(
            working.clone(),
            self.concurrency,
            &self.cancellation,
            move |record| {
                let span =
                    info_span!("request_reviewers", repo = %record.repository, number = record.number);
                async move {
                    match client
                        .request_reviewers(&record.repository, record.number, reviewers)
                        .await
                    {
                        Ok(url) => {
                            info!(url = %url, "Reviewers requested");
                            Ok(url)
                        }
                        Err(e) => {
                            error!(error = %e, "Unable to request reviewers");
                            Err(e)
                        }
                    }
                }
                .instrument(span)
            },
        )
        .await;

        let result = gather(targets, settle_records(working, settled), NOT_CREATED);
        log_stage("request reviewers", &result);
        result
    }
}

/// Records that belong to a target, in target order.
fn working_set<'r>(
    records: &'r [PullRequestRecord],
    targets: &[RepositoryTarget],
) -> Vec<&'r PullRequestRecord> {
    targets
        .iter()
        .filter_map(|target| records.iter().find(|r| r.repository == target.key))
        .collect()
}

/// Pairs each called record with how its call settled.
fn settle_records<T>(
    working: Vec<&PullRequestRecord>,
    settled: Vec<Settled<T>>,
) -> Vec<(RepositoryKey, Settled<PullRequestRecord>)> {
    working
        .into_iter()
        .zip(settled)
        .map(|(record, settled)| (record.repository.clone(), settled.map(|_| record.clone())))
        .collect()
}

fn log_stage(stage: &str, result: &StageResult) {
    if result.is_clean() {
        info!(stage, succeeded = result.records.len(), "Stage complete");
    } else {
        warn!(
            stage,
            succeeded = result.records.len(),
            failed = result.failures.len(),
            "Stage complete with failures"
        );
    }
}
