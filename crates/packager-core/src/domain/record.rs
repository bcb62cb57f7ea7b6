//! The persisted package record.
//!
//! The JSON key names (`name, description, owner, repo, ref, sha256,
//! vendorHash`) are read directly by the Nix package definition, so they are
//! part of the wire format and must not be renamed.

use serde::{Deserialize, Serialize};

use crate::domain::{error::DomainError, hash::ContentHash, locator::SourceRef};

/// Name the shipped template uses before anyone has run the scaffolder.
pub const TEMPLATE_PACKAGE_NAME: &str = "my-go-service";

/// One package description, as stored in `.package-config.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigRecord {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub owner: String,
    #[serde(rename = "repo")]
    pub repo_name: String,
    #[serde(rename = "ref")]
    pub git_ref: String,
    #[serde(
        rename = "sha256",
        default = "ContentHash::placeholder",
        deserialize_with = "ContentHash::deserialize_lenient"
    )]
    pub source_hash: ContentHash,
    #[serde(
        rename = "vendorHash",
        default = "ContentHash::placeholder",
        deserialize_with = "ContentHash::deserialize_lenient"
    )]
    pub dependency_hash: ContentHash,
}

impl ConfigRecord {
    /// Build the candidate for a freshly hashed source. The dependency hash
    /// starts as the placeholder until the resolver replaces it.
    pub fn candidate(
        name: impl Into<String>,
        description: impl Into<String>,
        source: &SourceRef,
        source_hash: ContentHash,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            owner: source.locator.owner().to_string(),
            repo_name: source.locator.repo().to_string(),
            git_ref: source.git_ref.clone(),
            source_hash,
            dependency_hash: ContentHash::placeholder(),
        }
    }

    pub fn with_dependency_hash(mut self, hash: ContentHash) -> Self {
        self.dependency_hash = hash;
        self
    }

    /// Whether this is still the untouched template record.
    pub fn is_template(&self, template_name: &str) -> bool {
        self.name == template_name
    }

    /// Whether `other` pins the same upstream revision.
    pub fn same_revision(&self, other: &Self) -> bool {
        self.owner == other.owner && self.repo_name == other.repo_name && self.git_ref == other.git_ref
    }

    /// Nix flake attribute the package is exposed under.
    pub fn attribute(&self) -> &str {
        &self.name
    }

    /// Checks that must hold before a record may become the committed state.
    pub fn validate_for_commit(&self) -> Result<(), DomainError> {
        for (field, value) in [
            ("name", &self.name),
            ("owner", &self.owner),
            ("repo", &self.repo_name),
            ("ref", &self.git_ref),
        ] {
            if value.trim().is_empty() {
                return Err(DomainError::EmptyField { field });
            }
        }
        if self.source_hash.is_placeholder() {
            return Err(DomainError::InvalidRecord(
                "source hash is still the placeholder".into(),
            ));
        }
        Ok(())
    }

    /// Pretty JSON with two-space indentation and a trailing newline.
    ///
    /// Field order follows the struct, so identical records always serialise
    /// to identical bytes.
    pub fn to_json_pretty(&self) -> Result<String, DomainError> {
        let mut json = serde_json::to_string_pretty(self)
            .map_err(|e| DomainError::InvalidRecord(e.to_string()))?;
        json.push('\n');
        Ok(json)
    }

    pub fn from_json(raw: &str) -> Result<Self, DomainError> {
        serde_json::from_str(raw).map_err(|e| DomainError::InvalidRecord(e.to_string()))
    }

    /// Repository coordinates, without revalidating them against a forge.
    pub fn repo_summary(&self) -> String {
        format!("{}/{}", self.owner, self.repo_name)
    }
}
