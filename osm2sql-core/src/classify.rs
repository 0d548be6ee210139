//! Tag key classification.
//!
//! Decides whether an OSM tag key is recorded and, when it is, splits it into
//! a type and a key on the first colon. Keys are only accepted when every
//! colon-separated segment consists of lowercase ASCII letters and digits;
//! underscores are rejected even though they are common in OSM keys.

/// Type assigned to keys that carry no colon.
pub const DEFAULT_TAG_TYPE: &str = "regular";

/// Characters that disqualify a tag key outright.
pub const PROBLEM_CHARS: [char; 20] = [
    '=', '+', '/', '&', '<', '>', ';', '\'', '"', '?', '%', '#', '$', '@', ',', '.', ' ', '\t',
    '\r', '\n',
];

/// An accepted tag key split into its type prefix and remainder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TagKey<'a> {
    prefix: Option<&'a str>,
    key: &'a str,
}

impl<'a> TagKey<'a> {
    /// The type: the text before the first colon, or [`DEFAULT_TAG_TYPE`].
    #[must_use]
    pub fn tag_type(&self) -> &'a str {
        self.prefix.unwrap_or(DEFAULT_TAG_TYPE)
    }

    /// The type, falling back to `default` when the key has no colon.
    #[must_use]
    pub fn tag_type_or<'b>(&self, default: &'b str) -> &'b str
    where
        'a: 'b,
    {
        self.prefix.unwrap_or(default)
    }

    /// Everything after the first colon, or the whole key without one.
    #[must_use]
    pub const fn key(&self) -> &'a str {
        self.key
    }

    /// Whether the raw key contained a colon.
    #[must_use]
    pub const fn has_prefix(&self) -> bool {
        self.prefix.is_some()
    }
}

/// Classify a raw tag key.
///
/// Returns `None` when the key must be skipped.
///
/// # Examples
/// ```
/// use osm2sql_core::classify;
///
/// let split = classify("addr:street:name").expect("key is accepted");
/// assert_eq!(split.tag_type(), "addr");
/// assert_eq!(split.key(), "street:name");
///
/// assert_eq!(classify("amenity").map(|k| k.tag_type()), Some("regular"));
/// assert!(classify("Name").is_none());
/// assert!(classify("addr:street name").is_none());
/// ```
#[must_use]
pub fn classify(raw_key: &str) -> Option<TagKey<'_>> {
    if has_problem_chars(raw_key) {
        return None;
    }
    if !raw_key.split(':').all(is_lower_segment) {
        return None;
    }
    Some(match raw_key.split_once(':') {
        Some((prefix, key)) => TagKey {
            prefix: Some(prefix),
            key,
        },
        None => TagKey {
            prefix: None,
            key: raw_key,
        },
    })
}

/// Whether the key contains any of [`PROBLEM_CHARS`].
#[must_use]
pub fn has_problem_chars(raw_key: &str) -> bool {
    raw_key.contains(PROBLEM_CHARS)
}

fn is_lower_segment(segment: &str) -> bool {
    !segment.is_empty()
        && segment
            .bytes()
            .all(|byte| byte.is_ascii_lowercase() || byte.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("amenity", "regular", "amenity")]
    #[case("addr:street", "addr", "street")]
    #[case("addr:street:name", "addr", "street:name")]
    #[case("building:levels", "building", "levels")]
    #[case("name:de", "name", "de")]
    #[case("2nd:3rd", "2nd", "3rd")]
    fn accepts_and_splits(#[case] raw: &str, #[case] tag_type: &str, #[case] key: &str) {
        let split = classify(raw).unwrap_or_else(|| panic!("{raw:?} should be accepted"));
        assert_eq!(split.tag_type(), tag_type);
        assert_eq!(split.key(), key);
    }

    #[rstest]
    #[case("addr:street name")]
    #[case("name.en")]
    #[case("k=v")]
    #[case("a/b")]
    #[case("tab\there")]
    #[case("quote'd")]
    #[case("line\nbreak")]
    #[case("hash#tag")]
    fn rejects_problem_characters(#[case] raw: &str) {
        assert!(has_problem_chars(raw));
        assert_eq!(classify(raw), None);
    }

    #[rstest]
    #[case("Name")]
    #[case("building_id")]
    #[case("chicago:building_id")]
    #[case("addr:")]
    #[case(":street")]
    #[case("a::b")]
    #[case("")]
    #[case("straße")]
    fn rejects_segments_outside_lowercase_and_digits(#[case] raw: &str) {
        assert!(!has_problem_chars(raw));
        assert_eq!(classify(raw), None);
    }

    #[rstest]
    fn custom_default_only_applies_without_colon() {
        let plain = classify("amenity").expect("accepted");
        let prefixed = classify("addr:city").expect("accepted");
        assert!(!plain.has_prefix());
        assert_eq!(plain.tag_type_or("plain"), "plain");
        assert_eq!(prefixed.tag_type_or("plain"), "addr");
    }
}
