//! Error taxonomy for parsing, merging and applying metadata.

use thiserror::Error;

use crate::ObjectId;
use crate::catalog::USER_META_PREFIX;
use crate::store::StoreError;

#[derive(Debug, Error)]
pub enum SetMetaError {
    /// Malformed `name:value#...` input (empty name, duplicate header).
    #[error("malformed header list: {0}")]
    Parse(String),

    #[error("unsupported header: {0}, use a supported header or one starting with {prefix}", prefix = USER_META_PREFIX)]
    UnsupportedHeader(String),

    #[error("invalid value {value:?} for header {name}: {reason}")]
    InvalidValue {
        name: String,
        value: String,
        reason: String,
    },

    /// A value given in delete mode, or update and delete requested together.
    #[error("{0}")]
    Conflict(String),

    #[error("object not found: {0}")]
    NotFound(ObjectId),

    #[error("set meta on {object} failed after {attempts} attempt(s): {source}")]
    Mutation {
        object: ObjectId,
        attempts: usize,
        #[source]
        source: StoreError,
    },

    #[error("concurrency must be at least 1, got {0}")]
    InvalidConcurrency(usize),

    #[error("object key is empty; bucket meta cannot be set, use --recursive to set meta on every object under a prefix")]
    EmptyObject,

    #[error("listing objects under {prefix:?} failed: {source}")]
    Enumeration {
        prefix: String,
        #[source]
        source: StoreError,
    },

    #[error(transparent)]
    Store(StoreError),

    #[error("operation cancelled")]
    Cancelled,

    #[error("a pipeline thread panicked")]
    WorkerPanicked,

    /// Batch stopped early; `completed` objects were written before it did.
    #[error("set meta on {completed} object(s) before error: {source}")]
    BatchAborted {
        completed: usize,
        #[source]
        source: Box<SetMetaError>,
    },
}

impl SetMetaError {
    /// Errors raised from the caller's input alone, before any store access.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::Parse(_)
                | Self::UnsupportedHeader(_)
                | Self::InvalidValue { .. }
                | Self::Conflict(_)
                | Self::InvalidConcurrency(_)
                | Self::EmptyObject
        )
    }

    /// Objects completed before an aborted batch stopped.
    pub fn completed(&self) -> Option<usize> {
        match self {
            Self::BatchAborted { completed, .. } => Some(*completed),
            _ => None,
        }
    }

    /// The error that aborted a batch, or `self` for anything else.
    pub fn root(&self) -> &SetMetaError {
        match self {
            Self::BatchAborted { source, .. } => source.root(),
            other => other,
        }
    }
}

impl From<StoreError> for SetMetaError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound(object) => SetMetaError::NotFound(object),
            other => SetMetaError::Store(other),
        }
    }
}
