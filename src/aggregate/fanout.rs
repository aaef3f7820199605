//! Concurrent fan-out/fan-in over named fetch tasks.
//!
//! Every task in the list is started at once and the aggregator waits for all
//! of them before looking at any outcome. Errors are then inspected in list
//! order, so the surfaced error never depends on which task finished first.

use crate::errors::{AggregateError, SourceError};
use futures::future::{join_all, BoxFuture};
use std::future::Future;
use tracing::{debug, warn};

/// Outcome of a single fetch task.
pub type FetchOutcome<T> = Result<T, SourceError>;

/// A named, parameterless fetch operation.
pub struct FetchTask<'a, T> {
    name: &'static str,
    future: BoxFuture<'a, FetchOutcome<T>>,
}

impl<'a, T> FetchTask<'a, T> {
    /// Wrap a future under a source name. The future is not polled until
    /// the task list is handed to [`aggregate`].
    pub fn new<F>(name: &'static str, future: F) -> Self
    where
        F: Future<Output = FetchOutcome<T>> + Send + 'a,
    {
        Self {
            name,
            future: Box::pin(future),
        }
    }
}

/// Values collected from a successful aggregation, in task order.
#[derive(Debug, Clone, PartialEq)]
pub struct Collected<T> {
    values: Vec<(&'static str, T)>,
}

impl<T> Collected<T> {
    /// Remove and return the value collected for `name`.
    pub fn take(&mut self, name: &'static str) -> Result<T, AggregateError> {
        let index = self
            .values
            .iter()
            .position(|(n, _)| *n == name)
            .ok_or(AggregateError::MissingReading(name))?;

        Ok(self.values.remove(index).1)
    }

    /// Source names still held, in task order.
    pub fn names(&self) -> Vec<&'static str> {
        self.values.iter().map(|(name, _)| *name).collect()
    }
}

/// Run every task concurrently and collect the outcomes.
///
/// Returns the error of the first failing task in list order, or every value
/// if all tasks succeeded. All tasks are driven to completion before the
/// result is decided.
pub async fn aggregate<'a, T>(
    tasks: Vec<FetchTask<'a, T>>,
) -> Result<Collected<T>, AggregateError> {
    debug!("Fetching {} sources concurrently", tasks.len());

    let (names, futures): (Vec<_>, Vec<_>) = tasks
        .into_iter()
        .map(|task| (task.name, task.future))
        .unzip();

    let outcomes = join_all(futures).await;

    let mut values = Vec::with_capacity(outcomes.len());
    let mut first_error: Option<AggregateError> = None;

    for (name, outcome) in names.into_iter().zip(outcomes) {
        match outcome {
            Ok(value) => values.push((name, value)),
            Err(source) if first_error.is_none() => {
                warn!("Source {} failed: {}", name, source);
                first_error = Some(AggregateError::Source { name, source });
            }
            Err(source) => {
                debug!("Discarding later error from {}: {}", name, source);
            }
        }
    }

    match first_error {
        Some(err) => Err(err),
        None => {
            let collected = Collected { values };
            debug!("Collected {:?}", collected.names());
            Ok(collected)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;
    use tokio_test::{assert_err, assert_ok};

    fn delayed(ms: u64, outcome: FetchOutcome<f64>) -> impl Future<Output = FetchOutcome<f64>> {
        async move {
            tokio::time::sleep(Duration::from_millis(ms)).await;
            outcome
        }
    }

    fn fail(message: &str) -> FetchOutcome<f64> {
        Err(SourceError::Upstream(message.to_string()))
    }

    #[tokio::test]
    async fn test_all_success_ignores_completion_order() {
        let tasks = vec![
            FetchTask::new("treasury", delayed(30, Ok(4.5))),
            FetchTask::new("aaa", delayed(10, Ok(5.0))),
            FetchTask::new("baa", delayed(0, Ok(5.5))),
        ];

        let mut collected = assert_ok!(aggregate(tasks).await);

        assert_eq!(collected.names(), vec!["treasury", "aaa", "baa"]);
        assert_eq!(collected.take("baa").unwrap(), 5.5);
        assert_eq!(collected.take("treasury").unwrap(), 4.5);
        assert_eq!(collected.names(), vec!["aaa"]);
    }

    #[tokio::test]
    async fn test_single_failure_is_returned() {
        let tasks = vec![
            FetchTask::new("treasury", delayed(0, Ok(4.5))),
            FetchTask::new("cape", delayed(5, fail("page changed"))),
        ];

        let err = assert_err!(aggregate(tasks).await);

        assert!(matches!(err, AggregateError::Source { name: "cape", .. }));
        assert!(err.to_string().contains("page changed"));
    }

    #[tokio::test]
    async fn test_priority_order_beats_completion_order() {
        // A finishes last but is first in priority order.
        let tasks = vec![
            FetchTask::new("a", delayed(40, fail("x"))),
            FetchTask::new("b", delayed(0, Ok(1.0))),
            FetchTask::new("c", delayed(0, fail("y"))),
        ];
        let err = assert_err!(aggregate(tasks).await);
        assert!(matches!(err, AggregateError::Source { name: "a", .. }));
        assert_eq!(err.to_string(), "failed to fetch a: x");

        let reversed = vec![
            FetchTask::new("c", delayed(40, fail("y"))),
            FetchTask::new("b", delayed(0, Ok(1.0))),
            FetchTask::new("a", delayed(0, fail("x"))),
        ];
        let err = assert_err!(aggregate(reversed).await);
        assert!(matches!(err, AggregateError::Source { name: "c", .. }));
        assert_eq!(err.to_string(), "failed to fetch c: y");
    }

    #[tokio::test]
    async fn test_every_task_is_drained_after_early_failure() {
        let finished = Arc::new(AtomicUsize::new(0));

        let tasks: Vec<FetchTask<'_, f64>> = (0..4)
            .map(|i| {
                let finished = Arc::clone(&finished);
                FetchTask::new("source", async move {
                    tokio::time::sleep(Duration::from_millis(10 * i)).await;
                    finished.fetch_add(1, Ordering::SeqCst);
                    if i == 0 {
                        fail("first")
                    } else {
                        Ok(i as f64)
                    }
                })
            })
            .collect();

        assert_err!(aggregate(tasks).await);
        assert_eq!(finished.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn test_tasks_run_concurrently() {
        let tasks = vec![
            FetchTask::new("a", delayed(100, Ok(1.0))),
            FetchTask::new("b", delayed(100, Ok(2.0))),
            FetchTask::new("c", delayed(100, Ok(3.0))),
        ];

        let start = std::time::Instant::now();
        assert_ok!(aggregate(tasks).await);

        // Sequential execution would take at least 300ms.
        assert!(start.elapsed() < Duration::from_millis(280));
    }

    #[tokio::test]
    async fn test_repeated_aggregation_has_same_shape() {
        for _ in 0..2 {
            let tasks = vec![
                FetchTask::new("treasury", delayed(0, Ok(4.5))),
                FetchTask::new("aaa", delayed(0, Ok(5.0))),
            ];
            let collected = assert_ok!(aggregate(tasks).await);
            assert_eq!(collected.names(), vec!["treasury", "aaa"]);
        }
    }

    #[tokio::test]
    async fn test_empty_task_list() {
        let tasks: Vec<FetchTask<'_, f64>> = Vec::new();
        let collected = assert_ok!(aggregate(tasks).await);
        assert!(collected.names().is_empty());
    }

    #[tokio::test]
    async fn test_take_missing_name() {
        let tasks = vec![FetchTask::new("treasury", delayed(0, Ok(4.5)))];
        let mut collected = assert_ok!(aggregate(tasks).await);

        let err = assert_err!(collected.take("cape"));
        assert!(matches!(err, AggregateError::MissingReading("cape")));
        assert_eq!(collected.names(), vec!["treasury"]);
    }
}
