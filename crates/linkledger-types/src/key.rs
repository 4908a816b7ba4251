//! The normalized (subject, url) lookup key.
//!
//! The ledger mints exactly one link id per (subject, url) pair, but clients
//! see those pairs in many superficially different spellings: checksummed vs
//! lowercase addresses, `HTTP://Example.com` vs `http://example.com`, and so
//! on. [`NormalizedKey`] collapses all logically-equal spellings into one
//! stable string so the resolution index has a single entry per pair.

use std::fmt;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::address::normalize_subject;

/// Canonicalize a URL by parsing and re-serializing it.
///
/// Scheme and host are lower-cased, default ports dropped and path structure
/// normalized. A string that does not parse as a URL is used verbatim as a
/// degraded fallback: a key is always produced.
pub fn canonicalize_url(raw: &str) -> String {
    match Url::parse(raw) {
        Ok(parsed) => parsed.to_string(),
        Err(_) => raw.to_string(),
    }
}

/// Stable lookup key for a (subject, url) pair.
///
/// Two pairs differing only in subject letter-casing or superficial URL
/// formatting produce the same key. Construction never fails and is
/// idempotent: building a key from already-normalized parts reproduces it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NormalizedKey(String);

impl NormalizedKey {
    pub fn new(subject: &str, url: &str) -> Self {
        Self(format!(
            "{}|{}",
            normalize_subject(subject),
            canonicalize_url(url)
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NormalizedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_case_insensitive_subject_and_url_formatting() {
        let a = NormalizedKey::new(
            "0xABC4135Cf8f25dA09e49bc8782676A84730c318b",
            "HTTP://Example.com/Path",
        );
        let b = NormalizedKey::new(
            "0xabc4135cf8f25da09e49bc8782676a84730c318b",
            "http://example.com/Path",
        );
        assert_eq!(a, b);
    }

    #[test]
    fn test_url_path_case_is_significant() {
        let a = NormalizedKey::new("0xabc", "http://example.com/Path");
        let b = NormalizedKey::new("0xabc", "http://example.com/path");
        assert_ne!(a, b);
    }

    #[test]
    fn test_default_port_and_trailing_structure() {
        let a = NormalizedKey::new("0xabc", "http://x.test:80");
        let b = NormalizedKey::new("0xabc", "http://x.test/");
        assert_eq!(a, b);
    }

    #[test]
    fn test_unparseable_url_falls_back_verbatim() {
        let key = NormalizedKey::new("0xabc", "not a url at all");
        assert!(key.as_str().ends_with("|not a url at all"));
    }

    #[test]
    fn test_normalization_is_idempotent() {
        let subject = normalize_subject("0xAbC");
        let url = canonicalize_url("HTTP://Example.com/Path");
        let once = NormalizedKey::new(&subject, &url);
        let twice = NormalizedKey::new("0xAbC", "HTTP://Example.com/Path");
        assert_eq!(once, twice);
        assert_eq!(canonicalize_url(&url), url);
    }
}
