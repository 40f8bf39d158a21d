//! Exit status policy.

use super::RunSummary;

/// How per-repository failures affect the exit status of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExitPolicy {
    /// Per-repository failures are reported but the run still succeeds.
    #[default]
    Lenient,

    /// Any per-repository failure fails the run.
    FailOnPartial,
}

impl ExitPolicy {
    /// Returns the process exit code for a finished run.
    #[must_use]
    pub fn exit_code(self, summary: &RunSummary) -> u8 {
        match self {
            Self::FailOnPartial if summary.has_failures() => 1,
            _ => 0,
        }
    }
}
