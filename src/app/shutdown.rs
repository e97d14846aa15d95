//! Interrupt and graceful shutdown handling.

use log::warn;
use tokio_util::sync::CancellationToken;

/// Cancels `run` on the first Ctrl-C.
///
/// The returned task ends on its own when `run` is cancelled by someone else.
pub fn cancel_on_interrupt(run: CancellationToken) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        tokio::select! {
            _ = run.cancelled() => {}
            result = tokio::signal::ctrl_c() => {
                match result {
                    Ok(()) => {
                        warn!("Interrupted, finishing with the records completed so far");
                        run.cancel();
                    }
                    Err(e) => warn!("Failed to listen for Ctrl-C: {e}"),
                }
            }
        }
    })
}

/// Stops the background tasks and waits for them.
pub async fn shutdown_gracefully(
    cancel: CancellationToken,
    logging_task: Option<tokio::task::JoinHandle<()>>,
    interrupt_task: Option<tokio::task::JoinHandle<()>>,
) {
    cancel.cancel();
    if let Some(logging_task) = logging_task {
        let _ = logging_task.await;
    }
    if let Some(interrupt_task) = interrupt_task {
        interrupt_task.abort();
        let _ = interrupt_task.await;
    }
}
