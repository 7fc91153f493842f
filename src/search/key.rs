//! Query normalizer and the canonical [`SearchKey`].
//!
//! Registration numbers are spoken and typed with arbitrary spacing and case
//! ("mh 12 ab 1234", "MH12 AB1234").  The registry stores them with all
//! whitespace removed and uppercased, so every lookup goes through
//! [`normalize`] first.

use std::fmt;

/// Strip every whitespace character from `text` and uppercase the rest.
///
/// Idempotent: `normalize(&normalize(t)) == normalize(t)`.
///
/// ```
/// use vehicle_voice_search::search::normalize;
///
/// assert_eq!(normalize("MH 12 AB 1234"), "MH12AB1234");
/// assert_eq!(normalize(" ka\t01\nab 0001 "), "KA01AB0001");
/// ```
pub fn normalize(text: &str) -> String {
    text.chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_uppercase)
        .collect()
}

/// A normalized, non-empty search key (usually a registration number).
///
/// The only way to build one is [`SearchKey::parse`], so holding a
/// `SearchKey` means the invariant already holds.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SearchKey(String);

impl SearchKey {
    /// Normalize `text`; `None` when nothing but whitespace was given.
    pub fn parse(text: &str) -> Option<Self> {
        let key = normalize(text);
        if key.is_empty() {
            None
        } else {
            Some(Self(key))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SearchKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for SearchKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spoken_registration_is_collapsed() {
        assert_eq!(normalize("MH 12 AB 1234"), "MH12AB1234");
    }

    #[test]
    fn lowercase_is_uppercased() {
        assert_eq!(normalize("dl3c aa 0420"), "DL3CAA0420");
    }

    #[test]
    fn all_kinds_of_whitespace_are_removed() {
        assert_eq!(normalize("\tKA 01\u{00A0}AB\r\n0001  "), "KA01AB0001");
    }

    #[test]
    fn normalize_is_idempotent() {
        let samples = [
            "",
            "   ",
            "MH 12 AB 1234",
            "mh12ab1234",
            "straße 9",
            "tn 22 \u{2003} cd 7",
            "ǅ 1",
            "already NORMAL",
        ];
        for sample in samples {
            let once = normalize(sample);
            assert_eq!(normalize(&once), once, "not idempotent for {sample:?}");
        }
    }

    #[test]
    fn parse_rejects_blank_input() {
        assert!(SearchKey::parse("").is_none());
        assert!(SearchKey::parse(" \t\n").is_none());
    }

    #[test]
    fn parse_normalizes() {
        let key = SearchKey::parse("xx 0000").unwrap();
        assert_eq!(key.as_str(), "XX0000");
        assert_eq!(key.to_string(), "XX0000");
    }
}
