//! Property-based tests for tag key classification.
//!
//! # Invariants tested
//!
//! - **Problem characters:** any key containing one is rejected.
//! - **Well-formed keys:** lowercase/digit segments joined by colons are
//!   accepted, split on the first colon only.
//! - **Round trip:** an accepted prefixed key rebuilds the raw key as
//!   `type:key`.
//! - **Uppercase:** any uppercase ASCII letter causes rejection.

use osm2sql_core::{DEFAULT_TAG_TYPE, PROBLEM_CHARS, classify};
use proptest::prelude::*;

fn segment() -> impl Strategy<Value = String> {
    "[0-9a-z]{1,8}"
}

fn well_formed_key() -> impl Strategy<Value = Vec<String>> {
    proptest::collection::vec(segment(), 1..5)
}

fn problem_char() -> impl Strategy<Value = char> {
    proptest::sample::select(PROBLEM_CHARS.to_vec())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    /// Property: a single problem character anywhere disqualifies the key.
    #[test]
    fn keys_with_problem_chars_are_rejected(
        segments in well_formed_key(),
        bad in problem_char(),
        at in any::<prop::sample::Index>(),
    ) {
        let joined = segments.join(":");
        let mut chars: Vec<char> = joined.chars().collect();
        let index = at.index(chars.len() + 1);
        chars.insert(index, bad);
        let raw: String = chars.into_iter().collect();

        prop_assert!(classify(&raw).is_none(), "{raw:?} should be rejected");
    }

    /// Property: well-formed keys are accepted and split on the first colon.
    #[test]
    fn well_formed_keys_split_on_first_colon(segments in well_formed_key()) {
        let raw = segments.join(":");
        let split = classify(&raw);
        prop_assert!(split.is_some(), "{raw:?} should be accepted");
        let Some(split) = split else {
            return Ok(());
        };

        match segments.split_first() {
            Some((first, rest)) if !rest.is_empty() => {
                prop_assert_eq!(split.tag_type(), first.as_str());
                prop_assert_eq!(split.key(), rest.join(":"));
                prop_assert_eq!(format!("{}:{}", split.tag_type(), split.key()), raw);
            }
            _ => {
                prop_assert_eq!(split.tag_type(), DEFAULT_TAG_TYPE);
                prop_assert_eq!(split.key(), raw.as_str());
            }
        }
    }

    /// Property: uppercase letters fail the per-segment check.
    #[test]
    fn uppercase_keys_are_rejected(prefix in segment(), upper in "[A-Z]{1,4}") {
        let raw = format!("{prefix}{upper}");
        prop_assert!(classify(&raw).is_none(), "{raw:?} should be rejected");
    }
}
