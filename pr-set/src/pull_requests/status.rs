//! Per-repository stage outcomes.

use super::stage::CANCELLED;
use serde::Serialize;

/// Result of one stage for one repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum StageOutcome {
    /// The remote call succeeded.
    Succeeded {
        /// URL of the pull request.
        url: String,
    },

    /// The repository was not eligible or the run was cancelled.
    Skipped {
        /// Reason for skipping.
        reason: String,
    },

    /// The remote call failed.
    Failed {
        /// Error message.
        error: String,
    },
}

impl StageOutcome {
    /// Returns the outcome as a short label.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Succeeded { .. } => "ok",
            Self::Skipped { .. } => "skipped",
            Self::Failed { .. } => "failed",
        }
    }

    /// Returns the pull request URL on success.
    #[must_use]
    pub fn url(&self) -> Option<&str> {
        match self {
            Self::Succeeded { url } => Some(url),
            _ => None,
        }
    }

    /// Returns true for [`StageOutcome::Succeeded`].
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Succeeded { .. })
    }

    /// Returns true for [`StageOutcome::Failed`].
    #[must_use]
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }

    /// Returns true if the call was skipped because the run was cancelled.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Skipped { reason } if reason == CANCELLED)
    }

    pub(crate) fn skipped(reason: &str) -> Self {
        Self::Skipped {
            reason: reason.to_string(),
        }
    }
}
