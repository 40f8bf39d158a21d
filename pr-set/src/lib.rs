#![doc = include_str!(concat!("../", env!("CARGO_PKG_README")))]

pub mod change_set;
pub mod client;
pub mod config;
pub mod pull_requests;
pub mod runner;
pub mod summary;
pub mod templates;

pub use change_set::{
    select_targets, validate_targets, ChangeSet, RepositoryKey, RepositoryTarget,
    TicketReference, ValidationError,
};
pub use client::{
    DryRunClient, GitHubClient, NewPullRequest, Operation, RemoteCall, RemoteError,
    RemotePullRequest, RepositoryClient,
};
pub use config::{load_config, load_template, ConfigError, PrSetConfig, RepositoryConfig};
pub use pull_requests::{
    Cancellation, Orchestrator, PipelineResult, PullRequestRecord, StageFailure, StageOutcome,
    StageResult,
};
pub use runner::{Overrides, Plan, Runner, RunnerConfig, RunnerError};
pub use summary::{ExitPolicy, RepositoryReport, RunSummary};
pub use templates::{BodyTemplate, Placeholder, SectionFormats, TemplateError, TemplateRenderer};
