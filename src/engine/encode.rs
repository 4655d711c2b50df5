//! Encode merged metadata into write options, one pure function per value kind.

use chrono::{DateTime, NaiveDateTime, Utc};

use crate::catalog::{AclType, RecognizedHeader, ValueKind};
use crate::store::{WriteOption, WriteOptions};
use crate::{HeaderName, Metadata, SetMetaError};

/// HTTP-date (RFC 7231 IMF-fixdate), the canonical form timestamps are sent in.
pub const HTTP_DATE_FORMAT: &str = "%a, %d %b %Y %H:%M:%S GMT";

/// Parse an HTTP-date, falling back to RFC3339.
pub fn parse_timestamp(value: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    NaiveDateTime::parse_from_str(value, HTTP_DATE_FORMAT)
        .map(|t| t.and_utc())
        .or_else(|_| DateTime::parse_from_rfc3339(value).map(|t| t.with_timezone(&Utc)))
}

pub fn format_http_date(at: &DateTime<Utc>) -> String {
    at.format(HTTP_DATE_FORMAT).to_string()
}

fn invalid(name: &str, value: &str, reason: impl ToString) -> SetMetaError {
    SetMetaError::InvalidValue {
        name: name.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

/// Encode the value of a recognized header according to its kind.
pub fn encode_value(header: &RecognizedHeader, value: &str) -> Result<WriteOption, SetMetaError> {
    match header.kind {
        ValueKind::Plain => Ok(WriteOption::Header {
            name: header.name,
            value: value.to_string(),
        }),
        ValueKind::Timestamp => parse_timestamp(value)
            .map(|at| WriteOption::Timestamp {
                name: header.name,
                at,
            })
            .map_err(|e| {
                invalid(
                    header.name,
                    value,
                    format!("{e}, expected HTTP-date or RFC3339"),
                )
            }),
        ValueKind::Acl => value
            .parse::<AclType>()
            .map(WriteOption::Acl)
            .map_err(|e| invalid(header.name, value, e)),
    }
}

/// Encode one merged entry: user metadata becomes a tag, recognized headers go through [`encode_value`].
pub fn encode_entry(name: &HeaderName, value: &str) -> Result<WriteOption, SetMetaError> {
    if let Some(key) = name.user_meta_key() {
        return Ok(WriteOption::Meta {
            key: key.to_string(),
            value: value.to_string(),
        });
    }
    match name.recognized() {
        Some(header) => encode_value(header, value),
        None => Err(SetMetaError::UnsupportedHeader(name.to_string())),
    }
}

/// Encode a whole merged map, in key order.
pub fn encode_options(merged: &Metadata) -> Result<WriteOptions, SetMetaError> {
    merged
        .iter()
        .map(|(name, value)| encode_entry(name, value))
        .collect()
}
