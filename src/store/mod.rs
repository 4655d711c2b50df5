//! Object store collaborators: listing, metadata reads and in-place metadata rewrites.
//!
//! The core only talks to a store through these traits. [`sqlite::SqliteStore`] is the bundled
//! local implementation used by the CLI.

mod sqlite;

pub use sqlite::{SqliteStore, open_store, open_store_in_memory};

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::catalog::{AclType, USER_META_PREFIX};
use crate::engine::encode::format_http_date;
use crate::{Metadata, ObjectId};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("object not found: {0}")]
    NotFound(ObjectId),
    #[error("transient store failure: {0}")]
    Transient(String),
    #[error("store backend: {0}")]
    Backend(#[from] rusqlite::Error),
    #[error("store connection lock poisoned")]
    Poisoned,
}

/// Lazy sequence of object keys returned by [`Enumerator::enumerate`].
pub type ObjectIter<'a> = Box<dyn Iterator<Item = Result<ObjectId, StoreError>> + 'a>;

/// Lists the objects whose key starts with a prefix.
pub trait Enumerator: Sync {
    fn enumerate<'a>(&'a self, prefix: &str) -> Result<ObjectIter<'a>, StoreError>;
}

/// Fetches the metadata currently stored on an object. Missing objects are [`StoreError::NotFound`].
pub trait MetadataReader: Sync {
    fn fetch_existing(&self, object: &str) -> Result<Metadata, StoreError>;
}

/// Rewrites an object's settable metadata in place. Applying the same options twice is harmless.
pub trait MetadataWriter: Sync {
    fn apply_metadata(&self, object: &str, options: &WriteOptions) -> Result<(), StoreError>;
}

/// Everything the batch pipeline needs from a store.
pub trait ObjectStore: Enumerator + MetadataReader + MetadataWriter {}

impl<T: Enumerator + MetadataReader + MetadataWriter + ?Sized> ObjectStore for T {}

/// One encoded header of a metadata write.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum WriteOption {
    Header { name: &'static str, value: String },
    Timestamp { name: &'static str, at: DateTime<Utc> },
    Acl(AclType),
    /// User-metadata tag; `key` has the prefix stripped.
    Meta { key: String, value: String },
}

pub type WriteOptions = Vec<WriteOption>;

impl WriteOption {
    /// Header line as it is persisted or sent: lower-case name, rendered value.
    /// `None` for the ACL, which is not a plain header on the object.
    pub fn to_header(&self) -> Option<(String, String)> {
        match self {
            WriteOption::Header { name, value } => Some((name.to_ascii_lowercase(), value.clone())),
            WriteOption::Timestamp { name, at } => {
                Some((name.to_ascii_lowercase(), format_http_date(at)))
            }
            WriteOption::Meta { key, value } => Some((
                format!("{}{}", USER_META_PREFIX, key).to_ascii_lowercase(),
                value.clone(),
            )),
            WriteOption::Acl(_) => None,
        }
    }
}
