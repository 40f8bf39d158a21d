//! Remote API error types.

use thiserror::Error;

/// Errors returned by a [`RepositoryClient`](super::RepositoryClient).
#[derive(Debug, Error)]
pub enum RemoteError {
    /// GitHub API error.
    #[error("GitHub API error: {0}")]
    GitHubError(#[from] octocrab::Error),

    /// The remote refused the operation.
    #[error("{operation} rejected for {repository}: {message}")]
    Rejected {
        repository: String,
        operation: &'static str,
        message: String,
    },
}
