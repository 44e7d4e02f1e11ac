//! Public URL slugs.
//!
//! A slug is the opaque path that grants anonymous, privacy-filtered read
//! access to a profile. Slugs look like `u/k3j9x0a2b` and are generated once
//! when a profile is first saved.

use std::fmt;
use std::sync::OnceLock;

use rand::Rng;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Prefix shared by every public slug.
pub const SLUG_PREFIX: &str = "u/";

/// Default number of random characters after the prefix.
pub const DEFAULT_SLUG_LENGTH: usize = 9;

const ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

fn segment_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[0-9A-Za-z_-]{1,64}$").expect("Invalid regex pattern"))
}

/// The public URL slug of a profile, including the `u/` prefix.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PublicSlug(String);

impl PublicSlug {
    /// Generate a fresh random slug with `length` base-36 characters.
    #[must_use]
    pub fn generate(length: usize) -> Self {
        let mut rng = rand::thread_rng();
        let suffix: String = (0..length.max(1))
            .map(|_| char::from(ALPHABET[rng.gen_range(0..ALPHABET.len())]))
            .collect();
        Self(format!("{SLUG_PREFIX}{suffix}"))
    }

    /// Reconstruct a slug from the path segment that follows `/u/`.
    ///
    /// Returns `None` for empty or malformed segments. Surrounding slashes
    /// and whitespace are ignored.
    #[must_use]
    pub fn from_segment(segment: &str) -> Option<Self> {
        let segment = segment.trim().trim_matches('/');
        if segment_pattern().is_match(segment) {
            Some(Self(format!("{SLUG_PREFIX}{segment}")))
        } else {
            None
        }
    }

    /// Wrap a stored slug value as-is.
    #[must_use]
    pub fn from_stored(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// The full slug, e.g. `u/k3j9x0a2b`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The part after the `u/` prefix.
    #[must_use]
    pub fn suffix(&self) -> &str {
        self.0.strip_prefix(SLUG_PREFIX).unwrap_or(&self.0)
    }

    /// The fully-qualified share URL (also the QR payload) under `base_url`.
    #[must_use]
    pub fn share_url(&self, base_url: &str) -> String {
        format!("{}/{}", base_url.trim_end_matches('/'), self.0)
    }
}

impl fmt::Display for PublicSlug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_shape() {
        let slug = PublicSlug::generate(DEFAULT_SLUG_LENGTH);
        assert!(slug.as_str().starts_with("u/"));
        assert_eq!(slug.suffix().len(), DEFAULT_SLUG_LENGTH);
        assert!(slug
            .suffix()
            .bytes()
            .all(|b| b.is_ascii_digit() || b.is_ascii_lowercase()));
    }

    #[test]
    fn test_generate_is_fresh() {
        let a = PublicSlug::generate(DEFAULT_SLUG_LENGTH);
        let b = PublicSlug::generate(DEFAULT_SLUG_LENGTH);
        assert_ne!(a, b);
    }

    #[test]
    fn test_generated_slug_round_trips_through_segment() {
        let slug = PublicSlug::generate(12);
        assert_eq!(PublicSlug::from_segment(slug.suffix()), Some(slug));
    }

    #[test]
    fn test_from_segment() {
        let slug = PublicSlug::from_segment("abc123").unwrap();
        assert_eq!(slug.as_str(), "u/abc123");
        assert_eq!(slug.suffix(), "abc123");
    }

    #[test]
    fn test_from_segment_trims_slashes() {
        let slug = PublicSlug::from_segment("/abc123/").unwrap();
        assert_eq!(slug.as_str(), "u/abc123");
    }

    #[test]
    fn test_from_segment_rejects_empty_and_malformed() {
        assert!(PublicSlug::from_segment("").is_none());
        assert!(PublicSlug::from_segment("   ").is_none());
        assert!(PublicSlug::from_segment("a/b").is_none());
        assert!(PublicSlug::from_segment("drop table;").is_none());
        assert!(PublicSlug::from_segment(&"x".repeat(65)).is_none());
    }

    #[test]
    fn test_share_url() {
        let slug = PublicSlug::from_stored("u/abc123");
        assert_eq!(
            slug.share_url("https://safeguard.example/"),
            "https://safeguard.example/u/abc123"
        );
    }

    #[test]
    fn test_serde_transparent() {
        let slug = PublicSlug::from_stored("u/abc");
        assert_eq!(serde_json::to_string(&slug).unwrap(), "\"u/abc\"");
    }
}
