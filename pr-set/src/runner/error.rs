//! Runner error types.

/// Errors that abort a run before or between stages.
#[derive(Debug, thiserror::Error)]
pub enum RunnerError {
    /// Configuration loading errors.
    #[error(transparent)]
    Config(#[from] crate::config::ConfigError),

    /// Incomplete change set or targets.
    #[error(transparent)]
    Validation(#[from] crate::change_set::ValidationError),

    /// Body template or section format errors.
    #[error(transparent)]
    Template(#[from] crate::templates::TemplateError),

    /// GitHub API client initialization errors.
    #[error(transparent)]
    Octocrab(#[from] octocrab::Error),

    /// Authentication check failed.
    #[error("Unable to log in: {0}")]
    Login(#[source] crate::client::RemoteError),

    /// No token was provided for a live run.
    #[error("A GitHub token is required (set GITHUB_TOKEN, pass --token, or set 'token' in the configuration)")]
    MissingToken,
}
