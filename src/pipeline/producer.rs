//! Producer: list keys under the prefix and feed them to the work queue.

use crossbeam_channel::{Sender, select};
use log::debug;

use super::context::{CancelToken, PipelineEvent, Role};
use crate::store::{Enumerator, StoreError};
use crate::{ObjectId, SetMetaError};

/// Push every listed key onto `work_tx` until the listing ends, fails, or the token is cancelled.
/// Ends with one terminal event (`Finished`, or `Failed` on a listing error) and drops `work_tx`
/// so idle workers see the queue close. Returns the number of keys queued.
pub fn run_producer<E>(
    enumerator: &E,
    prefix: &str,
    work_tx: Sender<ObjectId>,
    event_tx: &Sender<PipelineEvent>,
    cancel: &CancelToken,
) -> usize
where
    E: Enumerator + ?Sized,
{
    let fail = |source: StoreError| {
        let _ = event_tx.send(PipelineEvent::Failed(
            Role::Producer,
            SetMetaError::Enumeration {
                prefix: prefix.to_string(),
                source,
            },
        ));
    };

    let keys = match enumerator.enumerate(prefix) {
        Ok(keys) => keys,
        Err(source) => {
            fail(source);
            return 0;
        }
    };

    let mut count = 0_usize;
    for key in keys {
        if cancel.is_cancelled() {
            break;
        }
        let key = match key {
            Ok(key) => key,
            Err(source) => {
                fail(source);
                return count;
            }
        };
        select! {
            send(work_tx, key) -> res => {
                if res.is_err() {
                    break;
                }
                count += 1;
            }
            recv(cancel.signal()) -> _ => break,
        }
    }
    debug!("producer: queued {} objects under {:?}", count, prefix);
    drop(work_tx);
    let _ = event_tx.send(PipelineEvent::Finished(Role::Producer));
    count
}
