//! Per-object processing shared by single-object mode and the batch workers.

use log::debug;

use crate::engine::merge::merge;
use crate::engine::retry::{RetryPolicy, apply_with_retry};
use crate::store::{MetadataReader, MetadataWriter};
use crate::{Metadata, MergeMode, MetadataPatch, SetMetaError};

/// Fetch (when the mode needs it), merge, and write with retries. Returns attempts used.
///
/// Existing metadata is read fresh for every call; nothing is cached between objects.
pub fn mutate_object<S>(
    store: &S,
    object: &str,
    patch: &MetadataPatch,
    mode: MergeMode,
    policy: RetryPolicy,
) -> Result<usize, SetMetaError>
where
    S: MetadataReader + MetadataWriter + ?Sized,
{
    let existing = if mode.needs_existing() {
        store.fetch_existing(object)?
    } else {
        Metadata::new()
    };
    let merged = merge(&existing, patch, mode);
    debug!(
        "{}: {} merge -> {} headers",
        object,
        mode,
        merged.len()
    );
    apply_with_retry(store, object, &merged, policy)
}
