//! Combine an object's existing metadata with a patch.

use crate::catalog::{OBJECT_ACL, STAT_ACL};
use crate::{HeaderName, Metadata, MergeMode, MetadataPatch};

/// Existing entries a write may carry forward: recognized and user-metadata headers. The ACL,
/// reported under its status name, is renamed to its settable header.
pub fn settable_base(existing: &Metadata) -> Metadata {
    let acl_status = HeaderName::new(STAT_ACL);
    existing
        .iter()
        .filter_map(|(name, value)| {
            if *name == acl_status {
                Some((HeaderName::new(OBJECT_ACL), value.clone()))
            } else if name.is_settable() {
                Some((name.clone(), value.clone()))
            } else {
                None
            }
        })
        .collect()
}

/// Metadata to write for `mode`. Pure; `existing` is ignored in Replace mode.
pub fn merge(existing: &Metadata, patch: &MetadataPatch, mode: MergeMode) -> Metadata {
    match mode {
        MergeMode::Replace => patch.to_metadata(),
        MergeMode::Update => {
            let mut merged = settable_base(existing);
            for (name, value) in patch.iter() {
                merged.insert(name.clone(), value.clone());
            }
            merged
        }
        MergeMode::Delete => {
            let mut merged = settable_base(existing);
            for name in patch.names() {
                merged.remove(name);
            }
            merged
        }
    }
}
