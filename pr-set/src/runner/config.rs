//! Runner configuration.

use crate::pull_requests::Cancellation;

/// Configuration for running the pipeline.
#[derive(Debug, Clone)]
pub struct RunnerConfig {
    /// Maximum concurrent API requests per stage.
    concurrency: usize,
    /// Whether remote calls are only recorded.
    dry_run: bool,
    /// Flag that stops new remote calls.
    cancellation: Cancellation,
}

impl RunnerConfig {
    /// Creates a new configuration for a run.
    pub fn new(concurrency: usize, dry_run: bool) -> Self {
        Self {
            concurrency: concurrency.max(1),
            dry_run,
            cancellation: Cancellation::new(),
        }
    }

    /// Sets the cancellation flag shared with the caller.
    pub fn with_cancellation(mut self, cancellation: Cancellation) -> Self {
        self.cancellation = cancellation;
        self
    }

    /// Returns the max concurrent API requests.
    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    /// Returns whether dry-run mode is enabled.
    pub fn dry_run(&self) -> bool {
        self.dry_run
    }

    /// Returns the cancellation flag.
    pub fn cancellation(&self) -> &Cancellation {
        &self.cancellation
    }
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self::new(5, false)
    }
}
