//! Apply merged metadata to one object with bounded, sequential retries.

use log::{debug, warn};

use crate::engine::encode::encode_options;
use crate::store::MetadataWriter;
use crate::utils::config::PipelineConsts;
use crate::{Metadata, SetMetaError};

/// Maximum number of write attempts per object. Never below 1.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: usize,
}

impl RetryPolicy {
    pub fn new(max_attempts: usize) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
        }
    }

    pub fn max_attempts(&self) -> usize {
        self.max_attempts
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(PipelineConsts::DEFAULT_RETRY_TIMES)
    }
}

/// Encode `merged` once, then write it until a write succeeds or attempts run out.
/// Returns the number of attempts used. Encoding errors are not retried.
pub fn apply_with_retry<W>(
    writer: &W,
    object: &str,
    merged: &Metadata,
    policy: RetryPolicy,
) -> Result<usize, SetMetaError>
where
    W: MetadataWriter + ?Sized,
{
    let options = encode_options(merged)?;
    let mut attempt = 0;
    loop {
        attempt += 1;
        match writer.apply_metadata(object, &options) {
            Ok(()) => {
                debug!("set meta on {} ({} headers, attempt {})", object, options.len(), attempt);
                return Ok(attempt);
            }
            Err(source) if attempt >= policy.max_attempts => {
                return Err(SetMetaError::Mutation {
                    object: object.to_string(),
                    attempts: attempt,
                    source,
                });
            }
            Err(e) => {
                warn!(
                    "set meta on {}: attempt {}/{} failed: {}",
                    object, attempt, policy.max_attempts, e
                );
            }
        }
    }
}
