//! Setmeta: set, update or delete metadata headers on stored objects.
//!
//! A header list like `Cache-Control:no-cache#X-Oss-Meta-owner:alice` is parsed once into a
//! [`MetadataPatch`], then merged with each object's metadata under a [`MergeMode`] and written
//! back with bounded retries. [`set_single`] does this inline for one object; [`set_batch`] fans
//! it out over every object under a prefix with a fixed worker pool that stops at the first
//! failure.
//!
//! The store is reached only through the [`store`] traits; [`store::SqliteStore`] is the local
//! implementation the CLI uses.

pub mod catalog;
pub mod engine;
pub mod error;
pub mod pipeline;
pub mod store;
pub mod types;
pub mod utils;

/// Re-export types for API
pub use error::SetMetaError;
pub use types::*;

use log::debug;

use crate::engine::core::mutate_object;
use crate::engine::parse_patch;
use crate::engine::retry::RetryPolicy;
use crate::pipeline::{CancelToken, PipelineContext, run_batch, validate_concurrency};
use crate::store::{MetadataReader, MetadataWriter, ObjectStore};

/// Result alias used by public setmeta API
pub use error::SetMetaError as Error;
pub type Result<T> = std::result::Result<T, Error>;

/// Set metadata on one object. `patch` is `name:value#name:value...`.
///
/// The patch is validated before the store is touched. In Update and Delete modes the object's
/// current metadata is fetched first, so a missing object fails with [`SetMetaError::NotFound`].
pub fn set_single<S>(
    store: &S,
    object: &str,
    patch: &str,
    mode: MergeMode,
    opts: &SetMetaOpts,
) -> Result<()>
where
    S: MetadataReader + MetadataWriter + ?Sized,
{
    if object.is_empty() {
        return Err(SetMetaError::EmptyObject);
    }
    let patch = parse_patch(patch, mode)?;
    let attempts = mutate_object(
        store,
        object,
        &patch,
        mode,
        RetryPolicy::new(opts.retry_times),
    )?;
    debug!("{}: done after {} attempt(s)", object, attempts);
    Ok(())
}

/// Set metadata on every object whose key starts with `prefix`, `opts.routines` at a time.
///
/// - Patch and concurrency are validated before any thread starts.
/// - `on_progress(object, completed)` runs on the calling thread after each written object.
/// - The first failure (or a cancelled `cancel`) stops the batch; every thread is joined before
///   returning, and the error is [`SetMetaError::BatchAborted`] carrying the number of objects
///   that were written.
pub fn set_batch<S, F>(
    store: &S,
    prefix: &str,
    patch: &str,
    mode: MergeMode,
    opts: &SetMetaOpts,
    cancel: &CancelToken,
    on_progress: F,
) -> Result<BatchSummary>
where
    S: ObjectStore + ?Sized,
    F: FnMut(&ObjectId, usize),
{
    validate_concurrency(opts.routines)?;
    let ctx = PipelineContext {
        prefix: prefix.to_string(),
        patch: parse_patch(patch, mode)?,
        mode,
        policy: RetryPolicy::new(opts.retry_times),
    };
    debug!(
        "batch {} on {:?}: {} headers, {} routines, {} attempts",
        mode,
        prefix,
        ctx.patch.len(),
        opts.routines,
        ctx.policy.max_attempts()
    );
    run_batch(store, &ctx, opts.routines, cancel, on_progress)
}
