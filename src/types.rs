//! Public and internal types for the setmeta API and pipeline.

use std::borrow::Borrow;
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

use crate::SetMetaError;
use crate::catalog::{self, RecognizedHeader};
use crate::utils::config::PipelineConsts;

/// Key of one stored object (everything after the bucket in `oss://bucket/key`).
pub type ObjectId = String;

/// Case-insensitive header name, stored lower-cased.
///
/// `Content-Type` and `content-type` are the same `HeaderName`. Implements `Borrow<str>` so a
/// [`Metadata`] map can be queried with a lower-case `&str`.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct HeaderName(String);

impl HeaderName {
    pub fn new(name: &str) -> Self {
        Self(name.trim().to_ascii_lowercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Catalog entry for this header, if it is one of the recognized headers.
    pub fn recognized(&self) -> Option<&'static RecognizedHeader> {
        catalog::lookup(&self.0)
    }

    /// True when the name carries the user-metadata prefix and a non-empty tag key.
    pub fn is_user_meta(&self) -> bool {
        catalog::user_meta_key(&self.0).is_some()
    }

    /// Tag key of a user-metadata header (the name with the prefix stripped).
    pub fn user_meta_key(&self) -> Option<&str> {
        catalog::user_meta_key(&self.0)
    }

    /// Recognized or user-metadata: the headers a write can carry.
    pub fn is_settable(&self) -> bool {
        self.recognized().is_some() || self.is_user_meta()
    }
}

impl From<&str> for HeaderName {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl Borrow<str> for HeaderName {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for HeaderName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Header name → value. Ordered so merged metadata encodes deterministically.
///
/// Used for existing metadata (as reported by the store) and for the merged result that is
/// written back.
pub type Metadata = BTreeMap<HeaderName, String>;

/// Build a [`Metadata`] map from raw `(name, value)` pairs, canonicalizing every name.
pub fn canonicalize<I, K, V>(pairs: I) -> Metadata
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: Into<String>,
{
    pairs
        .into_iter()
        .map(|(k, v)| (HeaderName::new(k.as_ref()), v.into()))
        .collect()
}

/// How a patch combines with the metadata already on an object.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum MergeMode {
    /// Overwrite every settable header with the patch.
    #[default]
    Replace,
    /// Keep existing settable headers, overwrite or add the patched ones.
    Update,
    /// Keep existing settable headers except the patched ones.
    Delete,
}

impl MergeMode {
    /// Mode from the `--update` / `--delete` flags. Both at once is a conflict.
    pub fn from_flags(update: bool, delete: bool) -> Result<Self, SetMetaError> {
        match (update, delete) {
            (true, true) => Err(SetMetaError::Conflict(
                "--update and --delete cannot be used at the same time".to_string(),
            )),
            (true, false) => Ok(Self::Update),
            (false, true) => Ok(Self::Delete),
            (false, false) => Ok(Self::Replace),
        }
    }

    /// Update and Delete start from the object's current metadata; Replace does not.
    pub fn needs_existing(self) -> bool {
        !matches!(self, Self::Replace)
    }
}

impl fmt::Display for MergeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Replace => "replace",
            Self::Update => "update",
            Self::Delete => "delete",
        };
        f.write_str(s)
    }
}

/// Validated header edits requested by the caller. Built by
/// [`parse_patch`](crate::engine::parse_patch); names are unique after canonicalization.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MetadataPatch {
    entries: Vec<(HeaderName, String)>,
}

impl MetadataPatch {
    pub(crate) fn from_entries(entries: Vec<(HeaderName, String)>) -> Self {
        Self { entries }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&HeaderName, &String)> {
        self.entries.iter().map(|(n, v)| (n, v))
    }

    pub fn names(&self) -> impl Iterator<Item = &HeaderName> {
        self.entries.iter().map(|(n, _)| n)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The patch as a metadata map.
    pub fn to_metadata(&self) -> Metadata {
        self.entries.iter().cloned().collect()
    }
}

/// Lib-only options for [`set_single`](crate::set_single) and [`set_batch`](crate::set_batch).
#[derive(Clone, Debug)]
pub struct SetMetaOpts {
    /// Worker count for batch mode. Must be at least 1.
    pub routines: usize,
    /// Maximum write attempts per object (values below 1 are treated as 1).
    pub retry_times: usize,
}

impl Default for SetMetaOpts {
    fn default() -> Self {
        Self {
            routines: PipelineConsts::DEFAULT_ROUTINES,
            retry_times: PipelineConsts::DEFAULT_RETRY_TIMES,
        }
    }
}

impl From<&Opts> for SetMetaOpts {
    fn from(o: &Opts) -> Self {
        SetMetaOpts {
            routines: o.routines,
            retry_times: o.retry_times,
        }
    }
}

/// Full options (CLI). Use [`SetMetaOpts`] for lib.
#[derive(Clone, Debug)]
pub struct Opts {
    /// Local object store database. Default: package store filename in the working directory.
    pub store_path: PathBuf,
    /// Worker count for recursive mode.
    pub routines: usize,
    /// Maximum write attempts per object.
    pub retry_times: usize,
    /// Debug logging.
    pub verbose: bool,
}

impl Default for Opts {
    fn default() -> Self {
        Self {
            store_path: PathBuf::from(crate::utils::PackagePaths::get().store_filename()),
            routines: PipelineConsts::DEFAULT_ROUTINES,
            retry_times: PipelineConsts::DEFAULT_RETRY_TIMES,
            verbose: false,
        }
    }
}

/// Result of a batch run that finished without error.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BatchSummary {
    /// Objects handed to the workers by the producer.
    pub scanned: usize,
    /// Objects whose metadata was written.
    pub completed: usize,
}
