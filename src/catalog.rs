//! Recognized headers and how each one is applied.
//!
//! The catalog is a closed table: every entry names a header and the kind of value it takes.
//! Anything outside the table is only accepted under the user-metadata prefix, where the rest
//! of the name becomes a free-form tag key.

use std::fmt;
use std::str::FromStr;

/// Reserved prefix of caller-defined tags. The only headers `Delete` can remove.
pub const USER_META_PREFIX: &str = "X-Oss-Meta-";

/// Name under which the store reports an object's ACL when its metadata is fetched.
pub const STAT_ACL: &str = "ACL";

/// Settable header carrying the object ACL.
pub const OBJECT_ACL: &str = "X-Oss-Object-Acl";

/// How a recognized header's value is encoded on write.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ValueKind {
    /// Sent as-is.
    Plain,
    /// HTTP-date or RFC3339 on input, re-emitted as HTTP-date.
    Timestamp,
    /// One of the [`AclType`] tokens.
    Acl,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RecognizedHeader {
    /// Canonical spelling, used when the header is sent.
    pub name: &'static str,
    pub kind: ValueKind,
}

const fn header(name: &'static str, kind: ValueKind) -> RecognizedHeader {
    RecognizedHeader { name, kind }
}

pub const HEADER_CATALOG: &[RecognizedHeader] = &[
    header("Content-Type", ValueKind::Plain),
    header("Cache-Control", ValueKind::Plain),
    header("Content-Disposition", ValueKind::Plain),
    header("Content-Encoding", ValueKind::Plain),
    header("Expires", ValueKind::Timestamp),
    header("Accept-Encoding", ValueKind::Plain),
    header("X-Oss-Server-Side-Encryption", ValueKind::Plain),
    header(OBJECT_ACL, ValueKind::Acl),
    header("Origin", ValueKind::Plain),
];

/// Case-insensitive catalog lookup.
pub fn lookup(name: &str) -> Option<&'static RecognizedHeader> {
    HEADER_CATALOG
        .iter()
        .find(|h| h.name.eq_ignore_ascii_case(name))
}

/// Tag key of a user-metadata header name, or `None` if the prefix is missing or nothing follows it.
pub fn user_meta_key(name: &str) -> Option<&str> {
    let prefix_len = USER_META_PREFIX.len();
    let prefix = name.get(..prefix_len)?;
    if !prefix.eq_ignore_ascii_case(USER_META_PREFIX) {
        return None;
    }
    let key = &name[prefix_len..];
    (!key.is_empty()).then_some(key)
}

/// Supported header names joined by `sep`, for help and prompts.
pub fn format_supported_headers(sep: &str) -> String {
    HEADER_CATALOG
        .iter()
        .map(|h| match h.kind {
            ValueKind::Timestamp => format!("{} (HTTP-date or RFC3339)", h.name),
            ValueKind::Acl => format!("{} ({})", h.name, AclType::tokens().join("|")),
            ValueKind::Plain => h.name.to_string(),
        })
        .collect::<Vec<_>>()
        .join(sep)
}

/// Object access level accepted by [`OBJECT_ACL`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AclType {
    Default,
    Private,
    PublicRead,
    PublicReadWrite,
}

impl AclType {
    pub const ALL: [AclType; 4] = [
        AclType::Default,
        AclType::Private,
        AclType::PublicRead,
        AclType::PublicReadWrite,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            AclType::Default => "default",
            AclType::Private => "private",
            AclType::PublicRead => "public-read",
            AclType::PublicReadWrite => "public-read-write",
        }
    }

    pub fn tokens() -> Vec<&'static str> {
        Self::ALL.iter().map(|a| a.as_str()).collect()
    }
}

impl FromStr for AclType {
    type Err = String;

    /// Tokens are values, so matching is case-sensitive.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|a| a.as_str() == s)
            .ok_or_else(|| format!("expected one of {}", Self::tokens().join(", ")))
    }
}

impl fmt::Display for AclType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_ignores_case() {
        assert_eq!(lookup("content-type").map(|h| h.name), Some("Content-Type"));
        assert_eq!(lookup("EXPIRES").map(|h| h.kind), Some(ValueKind::Timestamp));
        assert!(lookup("X-Oss-Meta-a").is_none());
    }

    #[test]
    fn user_meta_key_requires_prefix_and_key() {
        assert_eq!(user_meta_key("x-oss-meta-color"), Some("color"));
        assert_eq!(user_meta_key("X-OSS-META-Color"), Some("Color"));
        assert_eq!(user_meta_key("x-oss-meta-"), None);
        assert_eq!(user_meta_key("x-oss-met"), None);
        assert_eq!(user_meta_key("Content-Type"), None);
    }

    #[test]
    fn acl_tokens_are_case_sensitive() {
        assert_eq!("public-read".parse::<AclType>(), Ok(AclType::PublicRead));
        assert!("Public-Read".parse::<AclType>().is_err());
    }

    #[test]
    fn supported_headers_lists_every_entry() {
        let listed = format_supported_headers("\n");
        assert_eq!(listed.lines().count(), HEADER_CATALOG.len());
        assert!(listed.contains("Expires (HTTP-date or RFC3339)"));
    }
}
