//! The remote API boundary.
//!
//! The orchestrator only ever talks to a [`RepositoryClient`]. Two
//! implementations are provided: [`GitHubClient`] for real runs and
//! [`DryRunClient`], which records calls without touching the network.

mod dry_run;
mod error;
mod github;

pub use dry_run::{DryRunClient, Operation, RemoteCall};
pub use error::RemoteError;
pub use github::GitHubClient;

use crate::change_set::RepositoryKey;
use async_trait::async_trait;

/// Parameters for opening a pull request.
#[derive(Debug, Clone, Copy)]
pub struct NewPullRequest<'a> {
    /// Repository to open the pull request in.
    pub repository: &'a RepositoryKey,
    /// Pull request title.
    pub title: &'a str,
    /// Branch holding the change.
    pub head: &'a str,
    /// Branch to merge into.
    pub base: &'a str,
    /// Rendered description.
    pub body: &'a str,
    /// Whether to open as a draft.
    pub draft: bool,
}

/// A pull request as reported by the remote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemotePullRequest {
    /// Pull request number within its repository.
    pub number: u64,
    /// Browser URL of the pull request.
    pub url: String,
}

/// Operations the orchestrator performs against the remote, one repository at a time.
///
/// Implementations are shared by every concurrent call of a stage.
#[async_trait]
pub trait RepositoryClient: Send + Sync {
    /// Opens a pull request.
    async fn create_pull_request(
        &self,
        request: NewPullRequest<'_>,
    ) -> Result<RemotePullRequest, RemoteError>;

    /// Replaces the description of an existing pull request, returning its URL.
    async fn update_pull_request(
        &self,
        repository: &RepositoryKey,
        number: u64,
        body: &str,
    ) -> Result<String, RemoteError>;

    /// Requests reviews from `reviewers`, returning the pull request URL.
    async fn request_reviewers(
        &self,
        repository: &RepositoryKey,
        number: u64,
        reviewers: &[String],
    ) -> Result<String, RemoteError>;
}

/// Builds the browser URL of a pull request on github.com.
#[must_use]
pub fn pull_request_url(repository: &RepositoryKey, number: u64) -> String {
    format!("https://github.com/{repository}/pull/{number}")
}
