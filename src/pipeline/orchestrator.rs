//! Batch controller: spawn the producer and the worker pool, collect events, join everything.

use log::{debug, warn};
use std::thread;

use crate::store::ObjectStore;
use crate::utils::config::PipelineConsts;
use crate::{BatchSummary, ObjectId, SetMetaError};

use super::context::{CancelToken, PipelineContext, PipelineEvent, create_pipeline_channels};
use super::producer::run_producer;
use super::worker::run_worker;

/// Terminal state of a batch run.
#[derive(Debug)]
pub enum BatchOutcome {
    AllCompleted { completed: usize },
    Aborted { completed: usize, error: SetMetaError },
}

/// Worker count must be at least 1.
pub fn validate_concurrency(routines: usize) -> Result<(), SetMetaError> {
    if routines == 0 {
        return Err(SetMetaError::InvalidConcurrency(routines));
    }
    Ok(())
}

/// Main orchestrator: one producer and `routines` workers on scoped threads, this thread as
/// controller. Producer → work queue → workers (fetch, merge, write) → event queue → controller.
///
/// The first failure from any role cancels the token; the controller then keeps draining events
/// until every role has terminated and every thread is joined, so nothing is left running when
/// this returns. `on_progress` is called once per written object with the running count.
pub fn run_batch<S, F>(
    store: &S,
    ctx: &PipelineContext,
    routines: usize,
    cancel: &CancelToken,
    mut on_progress: F,
) -> Result<BatchSummary, SetMetaError>
where
    S: ObjectStore + ?Sized,
    F: FnMut(&ObjectId, usize),
{
    validate_concurrency(routines)?;
    let channels = create_pipeline_channels(PipelineConsts::WORK_QUEUE_CAP);

    thread::scope(|scope| {
        let producer = {
            let work_tx = channels.work_tx;
            let event_tx = channels.event_tx.clone();
            scope.spawn(move || run_producer(store, &ctx.prefix, work_tx, &event_tx, cancel))
        };
        let workers: Vec<_> = (0..routines)
            .map(|id| {
                let work_rx = channels.work_rx.clone();
                let event_tx = channels.event_tx.clone();
                scope.spawn(move || run_worker(id, store, ctx, work_rx, event_tx, cancel))
            })
            .collect();
        // Dropping the controller's copies lets recv() fail instead of hanging if every role exits early.
        drop(channels.work_rx);
        drop(channels.event_tx);

        let outcome = control(&channels.event_rx, routines + 1, cancel, &mut on_progress);

        // Every handle is joined before any result is inspected.
        let scanned = producer.join();
        let mut worker_panicked = false;
        for handle in workers {
            worker_panicked |= handle.join().is_err();
        }
        let scanned = match scanned {
            Ok(scanned) if !worker_panicked => scanned,
            _ => return Err(SetMetaError::WorkerPanicked),
        };

        match outcome {
            BatchOutcome::AllCompleted { completed } if cancel.is_cancelled() => {
                Err(SetMetaError::BatchAborted {
                    completed,
                    source: Box::new(SetMetaError::Cancelled),
                })
            }
            BatchOutcome::AllCompleted { completed } => Ok(BatchSummary { scanned, completed }),
            BatchOutcome::Aborted { completed, error } => Err(SetMetaError::BatchAborted {
                completed,
                source: Box::new(error),
            }),
        }
    })
}

/// Controller loop: count completions until `roles` terminal events arrived. Keeps the first
/// failure and cancels the token on it; later failures are only logged.
fn control<F>(
    event_rx: &crossbeam_channel::Receiver<PipelineEvent>,
    roles: usize,
    cancel: &CancelToken,
    on_progress: &mut F,
) -> BatchOutcome
where
    F: FnMut(&ObjectId, usize),
{
    let mut completed = 0_usize;
    let mut terminated = 0_usize;
    let mut first_error: Option<SetMetaError> = None;

    while terminated < roles {
        let Ok(event) = event_rx.recv() else {
            break;
        };
        match event {
            PipelineEvent::Completed(object) => {
                completed += 1;
                on_progress(&object, completed);
            }
            PipelineEvent::Finished(role) => {
                terminated += 1;
                debug!("{} finished ({}/{})", role, terminated, roles);
            }
            PipelineEvent::Failed(role, err) => {
                terminated += 1;
                if first_error.is_none() {
                    warn!("{} failed, stopping batch: {}", role, err);
                    cancel.cancel();
                    first_error = Some(err);
                } else {
                    debug!("{} also failed after abort: {}", role, err);
                }
            }
        }
    }

    match first_error {
        Some(error) => BatchOutcome::Aborted { completed, error },
        None => BatchOutcome::AllCompleted { completed },
    }
}
