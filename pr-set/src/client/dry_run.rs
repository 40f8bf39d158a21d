//! A client that records calls instead of performing them.

use super::{
    pull_request_url, NewPullRequest, RemoteError, RemotePullRequest, RepositoryClient,
};
use crate::change_set::RepositoryKey;
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;
use tracing::{debug, info};

/// A remote operation, used to target injected failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    /// Opening a pull request.
    Create,
    /// Rewriting a pull request description.
    Update,
    /// Requesting reviewers.
    RequestReviewers,
}

impl Operation {
    fn as_str(self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Update => "update",
            Self::RequestReviewers => "request reviewers",
        }
    }
}

/// A call received by a [`DryRunClient`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteCall {
    /// A pull request would have been opened.
    Create {
        repository: RepositoryKey,
        title: String,
        head: String,
        base: String,
        body: String,
        draft: bool,
    },
    /// A description would have been rewritten.
    Update {
        repository: RepositoryKey,
        number: u64,
        body: String,
    },
    /// Reviewers would have been requested.
    RequestReviewers {
        repository: RepositoryKey,
        number: u64,
        reviewers: Vec<String>,
    },
}

impl RemoteCall {
    /// Repository the call addressed.
    #[must_use]
    pub fn repository(&self) -> &RepositoryKey {
        match self {
            Self::Create { repository, .. }
            | Self::Update { repository, .. }
            | Self::RequestReviewers { repository, .. } => repository,
        }
    }

    /// Operation the call performed.
    #[must_use]
    pub fn operation(&self) -> Operation {
        match self {
            Self::Create { .. } => Operation::Create,
            Self::Update { .. } => Operation::Update,
            Self::RequestReviewers { .. } => Operation::RequestReviewers,
        }
    }
}

/// Records every call and answers with made-up pull request numbers.
///
/// Used for `--dry-run` and for exercising the orchestrator without a
/// network. Failures and latency can be injected per repository.
#[derive(Debug, Default)]
pub struct DryRunClient {
    next_number: AtomicU64,
    calls: Mutex<Vec<RemoteCall>>,
    failures: HashSet<(Operation, RepositoryKey)>,
    latency: HashMap<RepositoryKey, Duration>,
}

impl DryRunClient {
    /// Creates a client where every call succeeds immediately.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes `operation` fail for `repository`.
    #[must_use]
    pub fn fail_on(mut self, operation: Operation, repository: RepositoryKey) -> Self {
        self.failures.insert((operation, repository));
        self
    }

    /// Delays every call addressed to `repository`.
    #[must_use]
    pub fn with_latency(mut self, repository: RepositoryKey, latency: Duration) -> Self {
        self.latency.insert(repository, latency);
        self
    }

    /// Returns the calls received so far, in arrival order.
    #[must_use]
    pub fn calls(&self) -> Vec<RemoteCall> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Returns the calls of one operation, in arrival order.
    #[must_use]
    pub fn calls_for(&self, operation: Operation) -> Vec<RemoteCall> {
        self.calls()
            .into_iter()
            .filter(|c| c.operation() == operation)
            .collect()
    }

    async fn receive(&self, call: RemoteCall) -> Result<(), RemoteError> {
        let repository = call.repository().clone();
        let operation = call.operation();

        match &call {
            RemoteCall::Create {
                title, head, base, body, ..
            } => debug!(repo = %repository, %title, %head, %base, %body, "[dry run] create"),
            RemoteCall::Update { number, body, .. } => {
                debug!(repo = %repository, number, %body, "[dry run] update")
            }
            RemoteCall::RequestReviewers {
                number, reviewers, ..
            } => debug!(repo = %repository, number, ?reviewers, "[dry run] request reviewers"),
        }

        if let Some(latency) = self.latency.get(&repository) {
            tokio::time::sleep(*latency).await;
        }

        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(call);

        if self.failures.contains(&(operation, repository.clone())) {
            return Err(RemoteError::Rejected {
                repository: repository.to_string(),
                operation: operation.as_str(),
                message: "injected failure".to_string(),
            });
        }

        info!(repo = %repository, operation = operation.as_str(), "[dry run] accepted");
        Ok(())
    }
}

#[async_trait]
impl RepositoryClient for DryRunClient {
    async fn create_pull_request(
        &self,
        request: NewPullRequest<'_>,
    ) -> Result<RemotePullRequest, RemoteError> {
        self.receive(RemoteCall::Create {
            repository: request.repository.clone(),
            title: request.title.to_string(),
            head: request.head.to_string(),
            base: request.base.to_string(),
            body: request.body.to_string(),
            draft: request.draft,
        })
        .await?;

        let number = self.next_number.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(RemotePullRequest {
            number,
            url: pull_request_url(request.repository, number),
        })
    }

    async fn update_pull_request(
        &self,
        repository: &RepositoryKey,
        number: u64,
        body: &str,
    ) -> Result<String, RemoteError> {
        self.receive(RemoteCall::Update {
            repository: repository.clone(),
            number,
            body: body.to_string(),
        })
        .await?;

        Ok(pull_request_url(repository, number))
    }

    async fn request_reviewers(
        &self,
        repository: &RepositoryKey,
        number: u64,
        reviewers: &[String],
    ) -> Result<String, RemoteError> {
        self.receive(RemoteCall::RequestReviewers {
            repository: repository.clone(),
            number,
            reviewers: reviewers.to_vec(),
        })
        .await?;

        Ok(pull_request_url(repository, number))
    }
}
