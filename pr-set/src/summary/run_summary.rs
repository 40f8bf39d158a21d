//! Run summary types.

use super::RepositoryReport;
use crate::change_set::RepositoryTarget;
use crate::pull_requests::{PipelineResult, StageOutcome, StageResult};
use serde::Serialize;
use std::fmt;

/// Summary of a complete run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunSummary {
    /// One row per repository, in configuration order.
    pub repositories: Vec<RepositoryReport>,

    /// Number of pull requests created.
    pub prs_created: usize,

    /// Number of pull requests that failed to create.
    pub prs_failed: usize,

    /// Number of pull requests whose description was linked.
    pub prs_linked: usize,

    /// Number of description updates that failed.
    pub links_failed: usize,

    /// Number of pull requests with reviewers requested.
    pub reviews_requested: usize,

    /// Number of review requests that failed.
    pub reviews_failed: usize,

    /// Whether the run was cancelled before completing.
    pub cancelled: bool,

    /// Whether this was a dry run.
    pub dry_run: bool,
}

impl RunSummary {
    /// Creates a new empty summary.
    #[must_use]
    pub fn new(dry_run: bool) -> Self {
        Self {
            dry_run,
            ..Default::default()
        }
    }

    /// Builds the summary of a finished pipeline.
    #[must_use]
    pub fn from_pipeline(
        targets: &[RepositoryTarget],
        pipeline: &PipelineResult,
        dry_run: bool,
    ) -> Self {
        let mut summary = Self::new(dry_run);
        for target in targets {
            let report = RepositoryReport {
                repository: target.key.clone(),
                created: outcome_of(&pipeline.created, target),
                linked: outcome_of(&pipeline.linked, target),
                reviewers: outcome_of(&pipeline.reviewed, target),
            };
            summary.record(report);
        }
        summary
    }

    /// Adds a repository row and updates the counters.
    pub fn record(&mut self, report: RepositoryReport) {
        tally(&report.created, &mut self.prs_created, &mut self.prs_failed);
        tally(&report.linked, &mut self.prs_linked, &mut self.links_failed);
        tally(
            &report.reviewers,
            &mut self.reviews_requested,
            &mut self.reviews_failed,
        );

        if report.created.is_cancelled()
            || report.linked.is_cancelled()
            || report.reviewers.is_cancelled()
        {
            self.cancelled = true;
        }

        self.repositories.push(report);
    }

    /// Returns true if any failures occurred.
    #[must_use]
    pub fn has_failures(&self) -> bool {
        self.prs_failed > 0 || self.links_failed > 0 || self.reviews_failed > 0
    }

    /// Returns true if all operations were successful.
    #[must_use]
    pub fn all_success(&self) -> bool {
        !self.has_failures() && !self.cancelled
    }

    /// Returns the URLs of every created pull request.
    pub fn urls(&self) -> impl Iterator<Item = &str> {
        self.repositories.iter().filter_map(RepositoryReport::url)
    }
}

fn outcome_of(stage: &StageResult, target: &RepositoryTarget) -> StageOutcome {
    stage
        .outcome(&target.key)
        .cloned()
        .unwrap_or_else(|| StageOutcome::Skipped {
            reason: "not attempted".to_string(),
        })
}

fn tally(outcome: &StageOutcome, succeeded: &mut usize, failed: &mut usize) {
    match outcome {
        StageOutcome::Succeeded { .. } => *succeeded += 1,
        StageOutcome::Failed { .. } => *failed += 1,
        StageOutcome::Skipped { .. } => {}
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let width = self
            .repositories
            .iter()
            .map(|r| r.repository.to_string().len())
            .max()
            .unwrap_or(0)
            .max("Repository".len());

        writeln!(
            f,
            "{:<width$}  {:<8} {:<8} {:<9} URL",
            "Repository", "Created", "Linked", "Reviewers"
        )?;
        for report in &self.repositories {
            writeln!(
                f,
                "{:<width$}  {:<8} {:<8} {:<9} {}",
                report.repository.to_string(),
                report.created.as_str(),
                report.linked.as_str(),
                report.reviewers.as_str(),
                report.url().unwrap_or("-"),
            )?;
        }

        for report in &self.repositories {
            for (stage, outcome) in [
                ("create", &report.created),
                ("link", &report.linked),
                ("reviewers", &report.reviewers),
            ] {
                if let StageOutcome::Failed { error } = outcome {
                    writeln!(f, "  {} ({stage}): {error}", report.repository)?;
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::change_set::RepositoryKey;
    use crate::summary::ExitPolicy;

    fn ok(url: &str) -> StageOutcome {
        StageOutcome::Succeeded {
            url: url.to_string(),
        }
    }

    fn skipped(reason: &str) -> StageOutcome {
        StageOutcome::Skipped {
            reason: reason.to_string(),
        }
    }

    fn failed() -> StageOutcome {
        StageOutcome::Failed {
            error: "boom".to_string(),
        }
    }

    fn report(name: &str, created: StageOutcome, linked: StageOutcome) -> RepositoryReport {
        RepositoryReport {
            repository: RepositoryKey::new("o", name),
            created,
            linked,
            reviewers: skipped("no reviewers configured"),
        }
    }

    #[test]
    fn can_record_result() {
        let mut summary = RunSummary::new(false);
        summary.record(report("a", ok("https://x/a/1"), ok("https://x/a/1")));

        assert_eq!(summary.prs_created, 1);
        assert_eq!(summary.prs_linked, 1);
        assert_eq!(summary.reviews_requested, 0);
        assert!(summary.all_success());
        assert_eq!(summary.urls().collect::<Vec<_>>(), vec!["https://x/a/1"]);
    }

    #[test]
    fn partial_failure_is_counted_and_displayed() {
        let mut summary = RunSummary::new(false);
        summary.record(report("a", ok("https://x/a/1"), ok("https://x/a/1")));
        summary.record(report("b", failed(), skipped("pull request was not created")));

        assert_eq!(summary.prs_created, 1);
        assert_eq!(summary.prs_failed, 1);
        assert!(summary.has_failures());

        let table = summary.to_string();
        assert!(table.contains("o/b"));
        assert!(table.contains("o/b (create): boom"));
        assert!(table.contains("https://x/a/1"));
    }

    #[test]
    fn cancellation_marks_summary() {
        let mut summary = RunSummary::new(false);
        summary.record(report("a", skipped("cancelled"), skipped("cancelled")));

        assert!(summary.cancelled);
        assert!(!summary.has_failures());
        assert!(!summary.all_success());
    }

    #[test]
    fn exit_policy_decides_partial_failures() {
        let mut summary = RunSummary::new(false);
        summary.record(report("a", failed(), skipped("pull request was not created")));

        assert_eq!(ExitPolicy::Lenient.exit_code(&summary), 0);
        assert_eq!(ExitPolicy::FailOnPartial.exit_code(&summary), 1);
        assert_eq!(ExitPolicy::FailOnPartial.exit_code(&RunSummary::new(false)), 0);
    }

    #[test]
    fn serializes_reports() {
        let mut summary = RunSummary::new(true);
        summary.record(report("a", ok("https://x/a/1"), failed()));

        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["dry_run"], true);
        assert_eq!(json["repositories"][0]["repository"]["name"], "a");
        assert_eq!(json["repositories"][0]["created"]["status"], "succeeded");
        assert_eq!(json["repositories"][0]["linked"]["status"], "failed");
    }
}
