//! Pipeline runner.
//!
//! Drives every [`DomainRecord`] through an ordered list of operations. Operations
//! are opened once before the first record and closed once after the last one, in
//! reverse order, whatever the outcome of the run. Each record runs its operations
//! strictly in sequence; how records are scheduled against each other is decided by
//! an [`ExecutionStrategy`].

mod strategy;

use std::sync::Arc;

use futures::FutureExt;
use log::{info, warn};
use tokio_util::sync::CancellationToken;

use crate::error_handling::{OperationError, PipelineError};
use crate::models::DomainRecord;
use crate::operation::Operation;

pub use strategy::{BoundedConcurrency, ExecutionStrategy, RecordTask, Sequential, StrategyOutcome};

/// Notification sent after each (record, operation) step.
#[derive(Debug)]
pub struct ProgressEvent<'a> {
    /// The record with every result accumulated so far.
    pub record: &'a DomainRecord,
    pub operation: &'static str,
    /// Set on the record's last step, including when a record is abandoned early.
    pub finished: bool,
    /// Number of records in the run.
    pub total: usize,
}

/// Progress callback. Called from whichever task drives the record, so it must not
/// block.
pub type ProgressCallback = Arc<dyn Fn(&ProgressEvent<'_>) + Send + Sync>;

/// Records that finished, sorted by index.
#[derive(Debug, Default)]
pub struct PipelineOutcome {
    pub records: Vec<DomainRecord>,
    /// Cancellation stopped the run early; unfinished records were dropped.
    pub interrupted: bool,
}

async fn open_all(operations: &mut [Box<dyn Operation>]) -> Result<(), PipelineError> {
    for i in 0..operations.len() {
        if let Err(source) = operations[i].open().await {
            let operation = operations[i].name();
            for opened in operations[..i].iter_mut().rev() {
                opened.close().await;
            }
            return Err(PipelineError::Open { operation, source });
        }
    }
    Ok(())
}

async fn close_all(operations: &mut [Box<dyn Operation>]) {
    for operation in operations.iter_mut().rev() {
        operation.close().await;
    }
}

async fn process_record(
    operations: &[Box<dyn Operation>],
    mut record: DomainRecord,
    callback: Option<ProgressCallback>,
    total: usize,
) -> Result<DomainRecord, PipelineError> {
    for (step, operation) in operations.iter().enumerate() {
        let mut finished = step + 1 == operations.len();

        if let Some(input) = operation.prepare(&record) {
            match operation.execute(input).await {
                Ok(results) => record.extend(results),
                Err(OperationError::Record(e)) => {
                    warn!(
                        "Abandoning record #{} ({}) at operation {}: {:#}",
                        record.index,
                        record.domain,
                        operation.name(),
                        e
                    );
                    finished = true;
                }
                Err(OperationError::Fatal(source)) => {
                    return Err(PipelineError::Operation {
                        operation: operation.name(),
                        index: record.index,
                        domain: record.domain.clone(),
                        source,
                    });
                }
            }
        }

        if let Some(callback) = &callback {
            callback(&ProgressEvent {
                record: &record,
                operation: operation.name(),
                finished,
                total,
            });
        }
        if finished {
            break;
        }
    }

    Ok(record)
}

/// Runs `operations` over `records`.
///
/// A record-level operation failure abandons that record's remaining operations and
/// keeps the results it already has. A fatal failure aborts the run and is returned
/// tagged with the record and operation. Cancelling `cancel` stops the run promptly
/// and returns the records finished so far with `interrupted` set.
pub async fn run_operations(
    operations: &mut [Box<dyn Operation>],
    records: Vec<DomainRecord>,
    strategy: &dyn ExecutionStrategy,
    callback: Option<ProgressCallback>,
    cancel: CancellationToken,
) -> Result<PipelineOutcome, PipelineError> {
    open_all(operations).await?;

    let total = records.len();
    let names: Vec<&str> = operations.iter().map(|op| op.name()).collect();
    info!("Running [{}] over {} records", names.join(", "), total);

    let result = {
        let operations: &[Box<dyn Operation>] = operations;
        let tasks: Vec<RecordTask<'_>> = records
            .into_iter()
            .map(|record| process_record(operations, record, callback.clone(), total).boxed())
            .collect();
        strategy.execute(tasks, &cancel).await
    };

    close_all(operations).await;

    let mut outcome = result?;
    outcome.records.sort_by_key(|record| record.index);
    if outcome.interrupted {
        warn!(
            "Run interrupted after {} of {} records",
            outcome.records.len(),
            total
        );
    } else {
        info!("Finished {} records", outcome.records.len());
    }

    Ok(PipelineOutcome {
        records: outcome.records,
        interrupted: outcome.interrupted,
    })
}
