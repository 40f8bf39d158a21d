//! Created pull request records.

use crate::change_set::RepositoryKey;
use serde::Serialize;

/// A pull request opened by the create stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PullRequestRecord {
    /// Repository the pull request lives in.
    pub repository: RepositoryKey,

    /// Browser URL of the pull request.
    pub url: String,

    /// Pull request number.
    pub number: u64,
}
