//! Validation error types.

use thiserror::Error;

/// Errors raised when the collected change set or targets are incomplete.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// The change set title is empty.
    #[error("Pull request title must not be empty")]
    EmptyTitle,

    /// No repositories remain after selection.
    #[error("No repositories selected")]
    NoRepositories,

    /// A repository has no head branch.
    #[error("Repository '{repository}' has no head branch")]
    MissingHead { repository: String },

    /// A repository has no base branch and no default base.
    #[error("Repository '{repository}' has no base branch and no default base")]
    MissingBase { repository: String },

    /// A branch name is not a valid git reference name.
    #[error("Repository '{repository}' has an invalid branch name '{branch}': {message}")]
    InvalidBranch {
        repository: String,
        branch: String,
        message: String,
    },

    /// The same repository appears twice.
    #[error("Repository '{repository}' is configured more than once")]
    DuplicateRepository { repository: String },

    /// A selected repository is not part of the configuration.
    #[error("Repository '{repository}' is not in the configuration")]
    UnknownRepository { repository: String },

    /// A repository selector is not in `owner/name` form.
    #[error("Invalid repository selector '{selector}', expected 'owner/name'")]
    InvalidSelector { selector: String },
}
