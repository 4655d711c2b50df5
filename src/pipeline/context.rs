//! Pipeline context and channels: shared read-only inputs, queues, and the cancellation token.

use crossbeam_channel::{Receiver, Sender, bounded, unbounded};
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use crate::engine::retry::RetryPolicy;
use crate::{MergeMode, MetadataPatch, ObjectId, SetMetaError};

/// Shared, read-only inputs every worker runs with.
#[derive(Clone, Debug)]
pub struct PipelineContext {
    pub prefix: String,
    pub patch: MetadataPatch,
    pub mode: MergeMode,
    pub policy: RetryPolicy,
}

/// Cooperative cancellation shared by the controller, producer, workers and the Ctrl-C handler.
///
/// `signal()` is a receiver that never yields a message; it becomes ready (disconnected) once
/// `cancel()` drops the only sender, so it can sit in a `select!` next to a queue operation.
#[derive(Clone)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
    trigger: Arc<Mutex<Option<Sender<()>>>>,
    signal: Receiver<()>,
}

impl CancelToken {
    pub fn new() -> Self {
        let (tx, rx) = bounded::<()>(0);
        Self {
            flag: Arc::new(AtomicBool::new(false)),
            trigger: Arc::new(Mutex::new(Some(tx))),
            signal: rx,
        }
    }

    /// Idempotent.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
        if let Ok(mut trigger) = self.trigger.lock() {
            trigger.take();
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }

    pub fn signal(&self) -> &Receiver<()> {
        &self.signal
    }
}

impl Default for CancelToken {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for CancelToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CancelToken")
            .field("cancelled", &self.is_cancelled())
            .finish()
    }
}

/// Who sent a terminal event.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Role {
    Producer,
    Worker(usize),
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Producer => f.write_str("producer"),
            Role::Worker(id) => write!(f, "worker {}", id),
        }
    }
}

/// Messages on the event queue. Every role ends with exactly one `Failed` or `Finished`.
#[derive(Debug)]
pub enum PipelineEvent {
    Completed(ObjectId),
    Failed(Role, SetMetaError),
    Finished(Role),
}

/// Channels for one batch run. Producer gets `work_tx`; workers get `work_rx`; everyone gets an
/// `event_tx`; the controller keeps `event_rx`.
pub struct PipelineChannels {
    pub work_tx: Sender<ObjectId>,
    pub work_rx: Receiver<ObjectId>,
    pub event_tx: Sender<PipelineEvent>,
    pub event_rx: Receiver<PipelineEvent>,
}

/// Work queue is bounded so listing cannot run arbitrarily far ahead; events are unbounded so a
/// worker never blocks reporting to a controller that stopped counting.
pub fn create_pipeline_channels(work_queue_cap: usize) -> PipelineChannels {
    let (work_tx, work_rx) = bounded::<ObjectId>(work_queue_cap);
    let (event_tx, event_rx) = unbounded::<PipelineEvent>();
    PipelineChannels {
        work_tx,
        work_rx,
        event_tx,
        event_rx,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossbeam_channel::select;
    use std::time::Duration;

    #[test]
    fn cancel_wakes_select() {
        let token = CancelToken::new();
        let (_tx, rx) = bounded::<u8>(0);
        let waiter = token.clone();
        let handle = std::thread::spawn(move || {
            select! {
                recv(rx) -> _ => false,
                recv(waiter.signal()) -> _ => true,
            }
        });
        std::thread::sleep(Duration::from_millis(20));
        token.cancel();
        token.cancel();
        assert!(handle.join().unwrap());
        assert!(token.is_cancelled());
    }
}
