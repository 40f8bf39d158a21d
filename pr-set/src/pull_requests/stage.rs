//! Scatter/gather execution shared by every stage.

use super::{Cancellation, PullRequestRecord, StageOutcome};
use crate::change_set::{RepositoryKey, RepositoryTarget};
use crate::client::RemoteError;
use futures::stream::{self, StreamExt};
use std::collections::HashMap;
use std::future::Future;

pub(crate) const CANCELLED: &str = "cancelled";

/// A remote failure for one repository.
#[derive(Debug)]
pub struct StageFailure {
    /// Repository whose call failed.
    pub repository: RepositoryKey,

    /// Error returned by the client.
    pub error: RemoteError,
}

/// Everything one stage produced, in configuration order.
#[derive(Debug, Default)]
pub struct StageResult {
    /// Pull requests the stage succeeded on.
    pub records: Vec<PullRequestRecord>,

    /// Remote failures.
    pub failures: Vec<StageFailure>,

    /// One outcome per configured repository.
    pub outcomes: Vec<(RepositoryKey, StageOutcome)>,
}

impl StageResult {
    /// Returns the outcome recorded for `repository`.
    #[must_use]
    pub fn outcome(&self, repository: &RepositoryKey) -> Option<&StageOutcome> {
        self.outcomes
            .iter()
            .find(|(key, _)| key == repository)
            .map(|(_, outcome)| outcome)
    }

    /// Returns true if no remote call failed.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }

    fn succeed(&mut self, record: PullRequestRecord) {
        self.outcomes.push((
            record.repository.clone(),
            StageOutcome::Succeeded {
                url: record.url.clone(),
            },
        ));
        self.records.push(record);
    }

    fn fail(&mut self, repository: &RepositoryKey, error: RemoteError) {
        self.outcomes.push((
            repository.clone(),
            StageOutcome::Failed {
                error: error.to_string(),
            },
        ));
        self.failures.push(StageFailure {
            repository: repository.clone(),
            error,
        });
    }

    fn skip(&mut self, repository: &RepositoryKey, reason: &str) {
        self.outcomes
            .push((repository.clone(), StageOutcome::skipped(reason)));
    }
}

/// How a single call of a stage settled.
pub(crate) enum Settled<T> {
    /// The call was issued and returned.
    Done(Result<T, RemoteError>),
    /// The call was never issued.
    Cancelled,
}

impl<T> Settled<T> {
    pub(crate) fn map<U>(self, f: impl FnOnce(T) -> U) -> Settled<U> {
        match self {
            Self::Done(result) => Settled::Done(result.map(f)),
            Self::Cancelled => Settled::Cancelled,
        }
    }
}

/// Runs `call` for every job with at most `concurrency` calls in flight.
///
/// Returns once every job has settled. Results are in job order regardless
/// of completion order. Jobs not yet started when `cancellation` is raised
/// settle as [`Settled::Cancelled`].
pub(crate) async fn fan_out<J, T, F, Fut>(
    jobs: Vec<J>,
    concurrency: usize,
    cancellation: &Cancellation,
    call: F,
) -> Vec<Settled<T>>
where
    F: Fn(J) -> Fut,
    Fut: Future<Output = Result<T, RemoteError>>,
{
    let call = &call;
    let mut settled: Vec<(usize, Settled<T>)> = stream::iter(jobs.into_iter().enumerate())
        .map(|(index, job)| async move {
            if cancellation.is_cancelled() {
                return (index, Settled::Cancelled);
            }
            (index, Settled::Done(call(job).await))
        })
        .buffer_unordered(concurrency.max(1))
        .collect()
        .await;

    settled.sort_by_key(|(index, _)| *index);
    settled.into_iter().map(|(_, s)| s).collect()
}

/// Folds settled calls into a [`StageResult`] covering every target.
///
/// Targets with no entry in `working` were not called and are skipped with
/// `not_eligible`.
pub(crate) fn gather(
    targets: &[RepositoryTarget],
    working: Vec<(RepositoryKey, Settled<PullRequestRecord>)>,
    not_eligible: &str,
) -> StageResult {
    let mut by_key: HashMap<RepositoryKey, Settled<PullRequestRecord>> =
        working.into_iter().collect();

    let mut result = StageResult::default();
    for target in targets {
        match by_key.remove(&target.key) {
            Some(Settled::Done(Ok(record))) => result.succeed(record),
            Some(Settled::Done(Err(error))) => result.fail(&target.key, error),
            Some(Settled::Cancelled) => result.skip(&target.key, CANCELLED),
            None => result.skip(&target.key, not_eligible),
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[tokio::test]
    async fn results_follow_job_order_not_completion_order() {
        let cancellation = Cancellation::new();
        let delays = vec![30u64, 0, 15];

        let settled = fan_out(delays, 3, &cancellation, |delay| async move {
            tokio::time::sleep(Duration::from_millis(delay)).await;
            Ok::<_, RemoteError>(delay)
        })
        .await;

        let values: Vec<u64> = settled
            .into_iter()
            .map(|s| match s {
                Settled::Done(Ok(v)) => v,
                _ => panic!("unexpected result"),
            })
            .collect();
        assert_eq!(values, vec![30, 0, 15]);
    }

    #[tokio::test]
    async fn respects_concurrency_limit() {
        let cancellation = Cancellation::new();
        let in_flight = &AtomicUsize::new(0);
        let peak = &AtomicUsize::new(0);

        fan_out((0..8).collect::<Vec<_>>(), 2, &cancellation, move |_| async move {
            let now = in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            peak.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(5)).await;
            in_flight.fetch_sub(1, Ordering::SeqCst);
            Ok::<_, RemoteError>(())
        })
        .await;

        assert!(peak.load(Ordering::SeqCst) <= 2);
    }

    #[tokio::test]
    async fn cancelled_jobs_are_not_started() {
        let cancellation = Cancellation::new();
        cancellation.cancel();
        let started = &AtomicUsize::new(0);

        let settled = fan_out(vec![1, 2, 3], 2, &cancellation, move |_| async move {
            started.fetch_add(1, Ordering::SeqCst);
            Ok::<_, RemoteError>(())
        })
        .await;

        assert_eq!(started.load(Ordering::SeqCst), 0);
        assert!(settled.iter().all(|s| matches!(s, Settled::Cancelled)));
    }

    #[tokio::test]
    async fn cancelling_mid_stage_lets_in_flight_calls_finish() {
        let cancellation = &Cancellation::new();
        let started = &AtomicUsize::new(0);

        let settled = fan_out(vec![0, 1, 2, 3], 1, cancellation, move |job| async move {
            started.fetch_add(1, Ordering::SeqCst);
            if job == 1 {
                cancellation.cancel();
            }
            Ok::<_, RemoteError>(job)
        })
        .await;

        assert_eq!(started.load(Ordering::SeqCst), 2);
        assert!(matches!(settled[0], Settled::Done(Ok(0))));
        assert!(matches!(settled[1], Settled::Done(Ok(1))));
        assert!(matches!(settled[2], Settled::Cancelled));
        assert!(matches!(settled[3], Settled::Cancelled));
    }
}
