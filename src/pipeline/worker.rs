//! Workers: pull one key at a time, merge and write its metadata.

use crossbeam_channel::{Receiver, Sender, select};
use log::debug;

use super::context::{CancelToken, PipelineContext, PipelineEvent, Role};
use crate::engine::core::mutate_object;
use crate::store::ObjectStore;
use crate::ObjectId;

/// Single worker loop. Stops pulling on the first failure, on cancellation, or when the queue
/// closes; always ends with one terminal event.
pub fn run_worker<S>(
    id: usize,
    store: &S,
    ctx: &PipelineContext,
    work_rx: Receiver<ObjectId>,
    event_tx: Sender<PipelineEvent>,
    cancel: &CancelToken,
) where
    S: ObjectStore + ?Sized,
{
    let role = Role::Worker(id);
    loop {
        let object = select! {
            recv(work_rx) -> msg => match msg {
                Ok(object) => object,
                Err(_) => break,
            },
            recv(cancel.signal()) -> _ => break,
        };
        if cancel.is_cancelled() {
            debug!("{}: cancelled, leaving {} untouched", role, object);
            break;
        }
        match mutate_object(store, &object, &ctx.patch, ctx.mode, ctx.policy) {
            Ok(_) => {
                let _ = event_tx.send(PipelineEvent::Completed(object));
            }
            Err(err) => {
                let _ = event_tx.send(PipelineEvent::Failed(role, err));
                return;
            }
        }
    }
    let _ = event_tx.send(PipelineEvent::Finished(role));
}
