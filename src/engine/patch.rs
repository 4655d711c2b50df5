//! Parse `name:value#name:value` into a validated [`MetadataPatch`].

use crate::engine::encode::encode_value;
use crate::{HeaderName, MergeMode, MetadataPatch, SetMetaError};

/// Separates pairs.
pub const PAIR_DELIMITER: char = '#';
/// Separates a name from its value (first occurrence only; values may contain it).
pub const VALUE_DELIMITER: char = ':';

/// Parse and validate a header list for `mode`. The empty string is the empty patch.
///
/// Checks, per pair and in order: non-empty name, no value in delete mode, supported header,
/// no duplicate (case-insensitive), and a decodable value for timestamp and ACL headers.
pub fn parse_patch(input: &str, mode: MergeMode) -> Result<MetadataPatch, SetMetaError> {
    let input = input.trim();
    if input.is_empty() {
        return Ok(MetadataPatch::default());
    }

    let mut entries: Vec<(HeaderName, String)> = Vec::new();
    for pair in input.split(PAIR_DELIMITER) {
        let (raw_name, value) = pair.split_once(VALUE_DELIMITER).unwrap_or((pair, ""));
        let raw_name = raw_name.trim();
        if raw_name.is_empty() {
            return Err(SetMetaError::Parse(format!(
                "missing header name in {pair:?}"
            )));
        }
        if mode == MergeMode::Delete && !value.is_empty() {
            return Err(SetMetaError::Conflict(format!(
                "delete mode takes no value for header {raw_name}, set {value:?} to empty"
            )));
        }

        let name = HeaderName::new(raw_name);
        let recognized = name.recognized();
        if recognized.is_none() && !name.is_user_meta() {
            return Err(SetMetaError::UnsupportedHeader(raw_name.to_string()));
        }
        if entries.iter().any(|(n, _)| *n == name) {
            return Err(SetMetaError::Parse(format!(
                "header {raw_name} given more than once"
            )));
        }
        if let Some(header) = recognized
            && !value.is_empty()
        {
            encode_value(header, value)?;
        }
        entries.push((name, value.to_string()));
    }
    Ok(MetadataPatch::from_entries(entries))
}
