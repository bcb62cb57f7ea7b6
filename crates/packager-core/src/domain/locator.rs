//! Repository coordinates and the forge they live on.
//!
//! Parsing is pure: no network access happens until a [`SourceRef`] is handed
//! to a `RefProbe`.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::error::DomainError;

pub const DEFAULT_FORGE_HOST: &str = "github.com";

/// The code-hosting service archives are fetched from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Forge {
    host: String,
}

impl Forge {
    pub fn new(host: impl Into<String>) -> Self {
        let host: String = host.into();
        Self {
            host: host.trim().trim_end_matches('/').to_ascii_lowercase(),
        }
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    /// Parse `<host>/<owner>/<name>` into repository coordinates.
    ///
    /// Accepted decorations: an `http://` or `https://` prefix, a trailing
    /// `.git`, and trailing slashes. The host must match this forge.
    pub fn parse_locator(&self, input: &str) -> Result<RepoLocator, DomainError> {
        let invalid = || DomainError::InvalidLocator {
            input: input.trim().to_string(),
            expected_host: self.host.clone(),
        };

        let mut rest = input.trim().trim_end_matches('/');
        for scheme in ["https://", "http://"] {
            if let Some(stripped) = strip_prefix_ignore_case(rest, scheme) {
                rest = stripped;
                break;
            }
        }
        let rest = rest.strip_suffix(".git").unwrap_or(rest);

        let mut segments = rest.split('/');
        let (Some(host), Some(owner), Some(repo), None) = (
            segments.next(),
            segments.next(),
            segments.next(),
            segments.next(),
        ) else {
            return Err(invalid());
        };

        if !host.eq_ignore_ascii_case(&self.host) {
            return Err(invalid());
        }
        if !is_segment(owner) || !is_segment(repo) {
            return Err(invalid());
        }

        Ok(RepoLocator {
            owner: owner.to_string(),
            repo: repo.to_string(),
        })
    }

    /// Tarball URL for a revision.
    pub fn archive_url(&self, source: &SourceRef) -> String {
        format!(
            "https://{}/{}/{}/archive/{}.tar.gz",
            self.host, source.locator.owner, source.locator.repo, source.git_ref
        )
    }
}

impl Default for Forge {
    fn default() -> Self {
        Self::new(DEFAULT_FORGE_HOST)
    }
}

fn strip_prefix_ignore_case<'a>(s: &'a str, prefix: &str) -> Option<&'a str> {
    let head = s.get(..prefix.len())?;
    head.eq_ignore_ascii_case(prefix)
        .then(|| &s[prefix.len()..])
}

fn is_segment(s: &str) -> bool {
    !s.is_empty() && !s.chars().any(char::is_whitespace)
}

/// Owner and repository name on a forge.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RepoLocator {
    owner: String,
    repo: String,
}

impl RepoLocator {
    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn repo(&self) -> &str {
        &self.repo
    }
}

impl fmt::Display for RepoLocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.repo)
    }
}

/// A repository pinned at a tag or commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceRef {
    pub locator: RepoLocator,
    pub git_ref: String,
}

impl SourceRef {
    pub fn new(locator: RepoLocator, git_ref: impl Into<String>) -> Self {
        Self {
            locator,
            git_ref: git_ref.into(),
        }
    }
}

impl fmt::Display for SourceRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} @ {}", self.locator, self.git_ref)
    }
}
