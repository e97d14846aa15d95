//! Scheduling strategies for per-record tasks.

use async_trait::async_trait;
use futures::future::BoxFuture;
use futures::StreamExt;
use tokio_util::sync::CancellationToken;

use crate::error_handling::PipelineError;
use crate::models::DomainRecord;

/// Future driving one record through every operation.
pub type RecordTask<'a> = BoxFuture<'a, Result<DomainRecord, PipelineError>>;

/// Records finished by a strategy.
#[derive(Debug, Default)]
pub struct StrategyOutcome {
    /// Finished records, in completion order.
    pub records: Vec<DomainRecord>,
    /// Set when cancellation stopped the run before every task finished.
    pub interrupted: bool,
}

/// Decides how record tasks are polled.
///
/// Implementations stop at the first error (dropping unfinished tasks) and stop
/// starting new tasks once `cancel` fires.
#[async_trait]
pub trait ExecutionStrategy: Send + Sync {
    async fn execute<'a>(
        &self,
        tasks: Vec<RecordTask<'a>>,
        cancel: &CancellationToken,
    ) -> Result<StrategyOutcome, PipelineError>;
}

/// Runs one record at a time, in input order.
#[derive(Debug, Clone, Copy, Default)]
pub struct Sequential;

#[async_trait]
impl ExecutionStrategy for Sequential {
    async fn execute<'a>(
        &self,
        tasks: Vec<RecordTask<'a>>,
        cancel: &CancellationToken,
    ) -> Result<StrategyOutcome, PipelineError> {
        let mut outcome = StrategyOutcome {
            records: Vec::with_capacity(tasks.len()),
            interrupted: false,
        };

        for task in tasks {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    outcome.interrupted = true;
                    break;
                }
                result = task => outcome.records.push(result?),
            }
        }

        Ok(outcome)
    }
}

/// Runs up to `limit` records at the same time.
#[derive(Debug, Clone, Copy)]
pub struct BoundedConcurrency {
    limit: usize,
}

impl BoundedConcurrency {
    /// A limit of zero is treated as one.
    pub fn new(limit: usize) -> Self {
        Self {
            limit: limit.max(1),
        }
    }

    pub fn limit(&self) -> usize {
        self.limit
    }
}

#[async_trait]
impl ExecutionStrategy for BoundedConcurrency {
    async fn execute<'a>(
        &self,
        tasks: Vec<RecordTask<'a>>,
        cancel: &CancellationToken,
    ) -> Result<StrategyOutcome, PipelineError> {
        let mut outcome = StrategyOutcome {
            records: Vec::with_capacity(tasks.len()),
            interrupted: false,
        };
        let mut running = futures::stream::iter(tasks).buffer_unordered(self.limit);

        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    outcome.interrupted = true;
                    break;
                }
                next = running.next() => match next {
                    Some(result) => outcome.records.push(result?),
                    None => break,
                },
            }
        }

        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::FutureExt;
    use std::time::Duration;

    fn ready(index: usize) -> RecordTask<'static> {
        async move { Ok(DomainRecord::new(index, format!("d{index}.test"))) }.boxed()
    }

    fn delayed(index: usize, millis: u64) -> RecordTask<'static> {
        async move {
            tokio::time::sleep(Duration::from_millis(millis)).await;
            Ok(DomainRecord::new(index, format!("d{index}.test")))
        }
        .boxed()
    }

    #[tokio::test]
    async fn test_sequential_keeps_input_order() {
        let cancel = CancellationToken::new();
        let outcome = Sequential
            .execute(vec![delayed(1, 20), ready(2), delayed(3, 5)], &cancel)
            .await
            .unwrap();
        let order: Vec<usize> = outcome.records.iter().map(|r| r.index).collect();
        assert_eq!(order, vec![1, 2, 3]);
        assert!(!outcome.interrupted);
    }

    #[tokio::test]
    async fn test_bounded_concurrency_overlaps_tasks() {
        let cancel = CancellationToken::new();
        let started = std::time::Instant::now();
        let tasks = (1..=4).map(|i| delayed(i, 100)).collect();
        let outcome = BoundedConcurrency::new(4)
            .execute(tasks, &cancel)
            .await
            .unwrap();
        assert_eq!(outcome.records.len(), 4);
        assert!(started.elapsed() < Duration::from_millis(350));
    }

    #[tokio::test]
    async fn test_cancelled_before_start() {
        let cancel = CancellationToken::new();
        cancel.cancel();
        let outcome = BoundedConcurrency::new(2)
            .execute(vec![ready(1), ready(2)], &cancel)
            .await
            .unwrap();
        assert!(outcome.interrupted);
        assert!(outcome.records.is_empty());
    }

    #[tokio::test]
    async fn test_first_error_stops() {
        let cancel = CancellationToken::new();
        let failing: RecordTask<'static> = async {
            Err(PipelineError::Operation {
                operation: "fetch",
                index: 2,
                domain: "d2.test".to_string(),
                source: anyhow::anyhow!("boom"),
            })
        }
        .boxed();
        let result = Sequential
            .execute(vec![ready(1), failing, ready(3)], &cancel)
            .await;
        assert!(matches!(
            result,
            Err(PipelineError::Operation { index: 2, .. })
        ));
    }

    #[test]
    fn test_zero_limit_is_one() {
        assert_eq!(BoundedConcurrency::new(0).limit(), 1);
    }
}
