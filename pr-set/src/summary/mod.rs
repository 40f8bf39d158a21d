//! Run summary types and helpers.

mod policy;
mod report;
mod run_summary;

pub use policy::ExitPolicy;
pub use report::RepositoryReport;
pub use run_summary::RunSummary;
