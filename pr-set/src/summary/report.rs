//! Per-repository report rows.

use crate::change_set::RepositoryKey;
use crate::pull_requests::StageOutcome;
use serde::Serialize;

/// Outcome of every stage for one repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RepositoryReport {
    /// Repository the row describes.
    pub repository: RepositoryKey,

    /// Stage 1 outcome.
    pub created: StageOutcome,

    /// Stage 2 outcome.
    pub linked: StageOutcome,

    /// Stage 3 outcome.
    pub reviewers: StageOutcome,
}

impl RepositoryReport {
    /// Returns the pull request URL if it was created.
    #[must_use]
    pub fn url(&self) -> Option<&str> {
        self.created.url()
    }

    /// Returns true if any stage failed for this repository.
    #[must_use]
    pub fn has_failures(&self) -> bool {
        self.created.is_failure() || self.linked.is_failure() || self.reviewers.is_failure()
    }
}
