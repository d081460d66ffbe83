//! Content Hash Value Object
//!
//! A validated, immutable fingerprint of a deployable unit.
//! Used by the redeploy planner for change detection.

use std::fmt;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Content hash value object
///
/// Wraps a SHA-256 hash string with the `sha256:` prefix.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct ContentHash(String);

impl ContentHash {
    /// Prefix for SHA-256 hashes
    pub const PREFIX: &'static str = "sha256:";

    /// Create a new ContentHash from a raw hash string (with or without prefix)
    pub fn new(raw_hash: &str) -> Self {
        if raw_hash.starts_with(Self::PREFIX) {
            Self(raw_hash.to_string())
        } else {
            Self(format!("{}{}", Self::PREFIX, raw_hash))
        }
    }

    /// Create a ContentHash by computing SHA-256 of bytes
    pub fn from_bytes(content: &[u8]) -> Self {
        Self::from_digest(Sha256::digest(content))
    }

    /// Create a ContentHash from a finished hasher
    pub fn from_hasher(hasher: Sha256) -> Self {
        Self::from_digest(hasher.finalize())
    }

    fn from_digest(digest: impl fmt::LowerHex) -> Self {
        Self(format!("{}{:x}", Self::PREFIX, digest))
    }

    /// Get the full hash string with prefix
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Get just the hex part without prefix
    pub fn hex(&self) -> &str {
        self.0.strip_prefix(Self::PREFIX).unwrap_or(&self.0)
    }
}

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for ContentHash {
    fn from(s: String) -> Self {
        Self::new(&s)
    }
}

impl From<&str> for ContentHash {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<ContentHash> for String {
    fn from(hash: ContentHash) -> Self {
        hash.0
    }
}

impl AsRef<str> for ContentHash {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_adds_prefix_if_missing() {
        let hash = ContentHash::new("abc123");
        assert_eq!(hash.as_str(), "sha256:abc123");
    }

    #[test]
    fn new_keeps_prefix_if_present() {
        let hash = ContentHash::new("sha256:abc123");
        assert_eq!(hash.as_str(), "sha256:abc123");
    }

    #[test]
    fn from_bytes_computes_sha256() {
        let hash = ContentHash::from_bytes(b"hello");
        assert_eq!(
            hash.hex(),
            "2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824"
        );
    }

    #[test]
    fn streaming_hasher_matches_one_shot() {
        let mut hasher = Sha256::new();
        hasher.update(b"hel");
        hasher.update(b"lo");
        assert_eq!(
            ContentHash::from_hasher(hasher),
            ContentHash::from_bytes(b"hello")
        );
    }

    #[test]
    fn different_content_different_hash() {
        let h1 = ContentHash::from_bytes(b"test1");
        let h2 = ContentHash::from_bytes(b"test2");
        assert_ne!(h1, h2);
    }

    #[test]
    fn serde_uses_plain_string() {
        let hash = ContentHash::new("abc");
        let json = serde_json::to_string(&hash).unwrap();
        assert_eq!(json, "\"sha256:abc\"");
        let back: ContentHash = serde_json::from_str("\"abc\"").unwrap();
        assert_eq!(back, hash);
    }
}
