use setmeta::engine::{merge, parse_patch, settable_base};
use setmeta::{Metadata, MergeMode, canonicalize};

fn existing(pairs: &[(&str, &str)]) -> Metadata {
    canonicalize(pairs.iter().copied())
}

fn sample_existing() -> Metadata {
    existing(&[("Content-Type", "text/plain"), ("X-Oss-Meta-a", "old")])
}

// --- scenarios ---

#[test]
fn test_update_scenario() {
    let patch = parse_patch("X-Oss-Meta-a:new#Content-Encoding:gzip", MergeMode::Update).unwrap();
    let merged = merge(&sample_existing(), &patch, MergeMode::Update);
    assert_eq!(
        merged,
        existing(&[
            ("Content-Type", "text/plain"),
            ("X-Oss-Meta-a", "new"),
            ("Content-Encoding", "gzip"),
        ])
    );
}

#[test]
fn test_delete_scenario() {
    let patch = parse_patch("X-Oss-Meta-a", MergeMode::Delete).unwrap();
    let merged = merge(&sample_existing(), &patch, MergeMode::Delete);
    assert_eq!(merged, existing(&[("Content-Type", "text/plain")]));
}

// --- replace ---

#[test]
fn test_replace_ignores_existing() {
    let patch = parse_patch("Cache-Control:no-cache#x-oss-meta-B:2", MergeMode::Replace).unwrap();
    for e in [Metadata::new(), sample_existing()] {
        assert_eq!(merge(&e, &patch, MergeMode::Replace), patch.to_metadata());
    }
}

#[test]
fn test_replace_with_empty_patch_clears_everything() {
    let patch = parse_patch("", MergeMode::Replace).unwrap();
    assert!(merge(&sample_existing(), &patch, MergeMode::Replace).is_empty());
}

// --- update ---

#[test]
fn test_update_disjoint_is_union() {
    let e = existing(&[("Cache-Control", "no-cache"), ("X-Oss-Meta-x", "1")]);
    let patch = parse_patch("Content-Type:image/png#X-Oss-Meta-y:2", MergeMode::Update).unwrap();
    let mut expected = e.clone();
    expected.extend(patch.to_metadata());
    assert_eq!(merge(&e, &patch, MergeMode::Update), expected);
}

#[test]
fn test_update_matches_existing_case_insensitively() {
    let e = existing(&[("CONTENT-TYPE", "text/plain")]);
    let patch = parse_patch("content-type:application/json", MergeMode::Update).unwrap();
    let merged = merge(&e, &patch, MergeMode::Update);
    assert_eq!(merged.len(), 1);
    assert_eq!(
        merged.get("content-type").map(String::as_str),
        Some("application/json")
    );
}

#[test]
fn test_update_drops_service_managed_headers() {
    let e = existing(&[
        ("Content-Type", "text/plain"),
        ("Content-Length", "42"),
        ("ETag", "\"abc\""),
        ("Last-Modified", "Tue, 15 Nov 1994 08:12:31 GMT"),
    ]);
    let patch = parse_patch("", MergeMode::Update).unwrap();
    assert_eq!(
        merge(&e, &patch, MergeMode::Update),
        existing(&[("Content-Type", "text/plain")])
    );
}

#[test]
fn test_acl_status_renamed_to_settable_header() {
    let e = existing(&[("ACL", "private"), ("X-Oss-Meta-a", "1")]);
    let base = settable_base(&e);
    assert_eq!(
        base,
        existing(&[("X-Oss-Object-Acl", "private"), ("X-Oss-Meta-a", "1")])
    );
}

#[test]
fn test_update_overrides_reported_acl() {
    let e = existing(&[("ACL", "private")]);
    let patch = parse_patch("X-Oss-Object-Acl:public-read", MergeMode::Update).unwrap();
    assert_eq!(
        merge(&e, &patch, MergeMode::Update),
        existing(&[("X-Oss-Object-Acl", "public-read")])
    );
}

// --- delete ---

#[test]
fn test_delete_removes_every_patched_name() {
    let e = existing(&[
        ("Content-Type", "text/plain"),
        ("X-Oss-Meta-a", "1"),
        ("X-Oss-Meta-b", "2"),
        ("X-Oss-Meta-c", "3"),
    ]);
    let patch = parse_patch("x-oss-meta-A#X-OSS-META-C#X-Oss-Meta-missing", MergeMode::Delete).unwrap();
    let merged = merge(&e, &patch, MergeMode::Delete);
    for name in patch.names() {
        assert!(!merged.contains_key(name), "{name} still present");
    }
    assert_eq!(
        merged,
        existing(&[("Content-Type", "text/plain"), ("X-Oss-Meta-b", "2")])
    );
}

#[test]
fn test_delete_is_idempotent() {
    let patch = parse_patch("X-Oss-Meta-a#Content-Type", MergeMode::Delete).unwrap();
    let once = merge(&sample_existing(), &patch, MergeMode::Delete);
    let twice = merge(&once, &patch, MergeMode::Delete);
    assert_eq!(once, twice);
    assert!(once.is_empty());
}

#[test]
fn test_delete_of_absent_name_is_noop() {
    let patch = parse_patch("X-Oss-Meta-zzz", MergeMode::Delete).unwrap();
    assert_eq!(
        merge(&sample_existing(), &patch, MergeMode::Delete),
        sample_existing()
    );
}

// --- laws over generated metadata ---

mod laws {
    use super::*;
    use proptest::prelude::*;
    use std::collections::BTreeMap;

    const PLAIN_HEADERS: &[&str] = &[
        "Content-Type",
        "Cache-Control",
        "Content-Disposition",
        "Content-Encoding",
        "Accept-Encoding",
        "X-Oss-Server-Side-Encryption",
        "Origin",
    ];

    /// Lower-cased settable names: plain catalog headers and user-metadata tags.
    fn header_name() -> impl Strategy<Value = String> {
        prop_oneof![
            prop::sample::select(PLAIN_HEADERS).prop_map(str::to_ascii_lowercase),
            "[a-z0-9]{1,6}".prop_map(|key| format!("x-oss-meta-{key}")),
        ]
    }

    fn headers() -> impl Strategy<Value = BTreeMap<String, String>> {
        prop::collection::btree_map(header_name(), "[A-Za-z0-9/=.,-]{0,10}", 0..6)
    }

    /// Flip letters to upper case according to the bits of `seed`.
    fn scramble_case(name: &str, seed: u64) -> String {
        name.chars()
            .enumerate()
            .map(|(i, c)| {
                if (seed >> (i % 64)) & 1 == 1 {
                    c.to_ascii_uppercase()
                } else {
                    c
                }
            })
            .collect()
    }

    fn render(pairs: &BTreeMap<String, String>, seed: u64, with_values: bool) -> String {
        pairs
            .iter()
            .map(|(name, value)| {
                let name = scramble_case(name, seed);
                if with_values {
                    format!("{name}:{value}")
                } else {
                    name
                }
            })
            .collect::<Vec<_>>()
            .join("#")
    }

    fn mixed_case(pairs: &BTreeMap<String, String>, seed: u64) -> Metadata {
        canonicalize(
            pairs
                .iter()
                .map(|(name, value)| (scramble_case(name, seed), value.clone())),
        )
    }

    proptest! {
        #[test]
        fn prop_parse_ignores_name_case(p in headers(), seed in any::<u64>()) {
            let scrambled = parse_patch(&render(&p, seed, true), MergeMode::Update).unwrap();
            let lower = parse_patch(&render(&p, 0, true), MergeMode::Update).unwrap();
            prop_assert_eq!(scrambled.to_metadata(), lower.to_metadata());
            prop_assert_eq!(scrambled.to_metadata(), canonicalize(&p));
        }

        #[test]
        fn prop_replace_is_canonical_patch(e in headers(), p in headers(), seed in any::<u64>()) {
            let existing = mixed_case(&e, seed.rotate_left(17));
            let patch = parse_patch(&render(&p, seed, true), MergeMode::Replace).unwrap();
            prop_assert_eq!(merge(&existing, &patch, MergeMode::Replace), canonicalize(&p));
        }

        #[test]
        fn prop_update_disjoint_is_union(e in headers(), p in headers(), seed in any::<u64>()) {
            let p: BTreeMap<String, String> =
                p.into_iter().filter(|(name, _)| !e.contains_key(name)).collect();
            let existing = mixed_case(&e, seed.rotate_left(17));
            let patch = parse_patch(&render(&p, seed, true), MergeMode::Update).unwrap();
            let expected = canonicalize(e.iter().chain(p.iter()));
            prop_assert_eq!(merge(&existing, &patch, MergeMode::Update), expected);
        }

        #[test]
        fn prop_delete_leaves_no_patched_name(e in headers(), p in headers(), seed in any::<u64>()) {
            let existing = mixed_case(&e, seed.rotate_left(17));
            let patch = parse_patch(&render(&p, seed, false), MergeMode::Delete).unwrap();
            let merged = merge(&existing, &patch, MergeMode::Delete);
            for name in patch.names() {
                prop_assert!(!merged.contains_key(name));
            }
            let expected = canonicalize(e.iter().filter(|(name, _)| !p.contains_key(*name)));
            prop_assert_eq!(merged, expected);
        }

        #[test]
        fn prop_delete_is_idempotent(e in headers(), p in headers(), seed in any::<u64>()) {
            let existing = mixed_case(&e, seed);
            let patch = parse_patch(&render(&p, seed, false), MergeMode::Delete).unwrap();
            let once = merge(&existing, &patch, MergeMode::Delete);
            prop_assert_eq!(merge(&once, &patch, MergeMode::Delete), once.clone());
        }
    }
}
