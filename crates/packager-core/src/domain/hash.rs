//! SRI content hashes as consumed by the Nix fetchers.
//!
//! A [`ContentHash`] is always syntactically valid: `<algo>-<base64>` where
//! the decoded digest length matches the algorithm. The reserved
//! [`ContentHash::placeholder`] is valid too, which is what lets it be fed to
//! a build to provoke a mismatch report.

use std::fmt;
use std::str::FromStr;

use base64::{Engine as _, engine::general_purpose::STANDARD};
use serde::{Deserialize, Deserializer, Serialize};

use crate::domain::error::DomainError;

/// Same value as nixpkgs' `lib.fakeHash`.
pub const PLACEHOLDER_HASH: &str = "sha256-AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA=";

/// A validated SRI hash string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(into = "String")]
pub struct ContentHash(String);

impl ContentHash {
    /// Parse and validate an SRI string.
    pub fn parse(value: &str) -> Result<Self, DomainError> {
        let value = value.trim();
        let invalid = |reason: &str| DomainError::InvalidHash {
            value: value.to_string(),
            reason: reason.to_string(),
        };

        let (algo, body) = value
            .split_once('-')
            .ok_or_else(|| invalid("missing '<algo>-' prefix"))?;

        let expected_len = digest_len(algo).ok_or_else(|| invalid("unsupported algorithm"))?;

        let digest = STANDARD
            .decode(body)
            .map_err(|e| invalid(&format!("body is not base64: {e}")))?;

        if digest.len() != expected_len {
            return Err(invalid(&format!(
                "{algo} digest must be {expected_len} bytes, got {}",
                digest.len()
            )));
        }

        Ok(Self(value.to_string()))
    }

    /// The reserved "unresolved" value.
    pub fn placeholder() -> Self {
        Self(PLACEHOLDER_HASH.to_string())
    }

    pub fn is_placeholder(&self) -> bool {
        self.0 == PLACEHOLDER_HASH
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Lenient deserialisation for record files written by hand or by the
    /// template: anything that is not a valid hash reads back as the
    /// placeholder.
    pub(crate) fn deserialize_lenient<'de, D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(raw
            .as_deref()
            .and_then(|s| Self::parse(s).ok())
            .unwrap_or_else(Self::placeholder))
    }
}

fn digest_len(algo: &str) -> Option<usize> {
    match algo {
        "sha256" => Some(32),
        "sha512" => Some(64),
        _ => None,
    }
}

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for ContentHash {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl From<ContentHash> for String {
    fn from(hash: ContentHash) -> Self {
        hash.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const REAL: &str = "sha256-47DEQpj8HBSa+/TImW+5JCeuQeRkm5NMpJWZG3hSuFU=";

    #[test]
    fn placeholder_is_a_valid_hash() {
        let parsed = ContentHash::parse(PLACEHOLDER_HASH).unwrap();
        assert!(parsed.is_placeholder());
        assert_eq!(parsed, ContentHash::placeholder());
    }

    #[test]
    fn real_sha256_parses() {
        let hash: ContentHash = REAL.parse().unwrap();
        assert_eq!(hash.as_str(), REAL);
        assert!(!hash.is_placeholder());
    }

    #[test]
    fn surrounding_whitespace_is_trimmed() {
        let hash = ContentHash::parse(&format!("  {REAL}\n")).unwrap();
        assert_eq!(hash.as_str(), REAL);
    }

    #[test]
    fn nix32_digest_is_rejected() {
        // Raw `nix-prefetch-url` output, before conversion to SRI.
        let err = ContentHash::parse("0ig1v1b3bk2c5dxqfhsyqy4lb1p8fhxr2vb7bd2wnqj0lvpwfvcz")
            .unwrap_err();
        assert!(matches!(err, DomainError::InvalidHash { .. }));
    }

    #[test]
    fn wrong_digest_length_is_rejected() {
        assert!(ContentHash::parse("sha256-AAAA").is_err());
    }

    #[test]
    fn unknown_algorithm_is_rejected() {
        assert!(ContentHash::parse("md5-1B2M2Y8AsgTpgAmY7PhCfg==").is_err());
    }

    #[test]
    fn serializes_as_plain_string() {
        let json = serde_json::to_string(&ContentHash::placeholder()).unwrap();
        assert_eq!(json, format!("\"{PLACEHOLDER_HASH}\""));
    }
}
