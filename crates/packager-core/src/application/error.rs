//! Application layer errors.
//!
//! These errors represent failures of the pipeline stages and of the ports
//! behind them, not input validation. Validation errors are `DomainError`
//! from `crate::domain`.

use std::path::PathBuf;
use thiserror::Error;

use crate::error::ErrorCategory;

/// Errors that occur while running a scaffold session.
#[derive(Debug, Error, Clone)]
pub enum ApplicationError {
    /// The archive probe did not answer `200 OK` or `302 Found`.
    #[error("could not resolve {owner}/{repo} at ref '{git_ref}'")]
    UnresolvableReference {
        owner: String,
        repo: String,
        git_ref: String,
        url: String,
    },

    /// Downloading, unpacking, or hashing the source archive failed.
    #[error("failed to hash source archive {url}: {diagnostic}")]
    FetchFailed { url: String, diagnostic: String },

    /// The discovery build failed for a reason other than the deliberate
    /// hash mismatch.
    #[error("build of '{attribute}' failed for a reason other than a hash mismatch:\n{excerpt}")]
    DependencyBuildFailed { attribute: String, excerpt: String },

    /// The post-commit build failed. The record stays committed.
    #[error("verification build of '{attribute}' failed: {reason}")]
    VerificationFailed {
        attribute: String,
        path: PathBuf,
        reason: String,
    },

    /// An external program could not be started or did not finish.
    #[error("failed to run '{program}': {reason}")]
    ProcessFailed { program: String, reason: String },

    /// An external program exceeded its time budget and was killed.
    #[error("'{program}' timed out after {seconds}s")]
    TimedOut { program: String, seconds: u64 },

    /// Reading or decoding the record file failed. Nothing was written.
    #[error("failed to read record {path}: {reason}")]
    StoreRead { path: PathBuf, reason: String },

    /// Writing the record file failed. `rolled_back` is set once the
    /// pre-session contents have been restored.
    #[error("failed to write record {path}: {reason}")]
    StoreWrite {
        path: PathBuf,
        reason: String,
        rolled_back: bool,
    },

    /// A staged write could not be rolled back.
    #[error("failed to restore {path} after abort: {reason}")]
    RestoreFailed { path: PathBuf, reason: String },

    /// `verify` was asked for but nothing has been committed yet.
    #[error("no package has been configured in {path}")]
    NotConfigured { path: PathBuf },

    /// Talking to the operator failed (closed stdin, broken terminal).
    #[error("operator interaction failed: {reason}")]
    Interaction { reason: String },
}

impl ApplicationError {
    /// Get user-actionable suggestions.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::UnresolvableReference { url, .. } => vec![
                format!("Probed: {url}"),
                "Check the repository URL and ref, then re-run `packager scaffold go`".into(),
            ],
            Self::FetchFailed { .. } => vec![
                "Check network access and that nix-prefetch-url is installed".into(),
                "Re-run `packager scaffold go` to retry".into(),
            ],
            Self::DependencyBuildFailed { attribute, .. } => vec![
                format!("The build output above explains why '{attribute}' failed"),
                "Fix the package definition, then re-run `packager scaffold go`".into(),
            ],
            Self::VerificationFailed { attribute, .. } => vec![
                format!("Inspect the output of `nix build .#{attribute}`"),
                "Re-run `packager verify` to retry the build alone".into(),
            ],
            Self::ProcessFailed { program, .. } | Self::TimedOut { program, .. } => vec![
                format!("Ensure '{program}' is installed and in your PATH"),
                "Timeouts can be raised in the configuration file".into(),
            ],
            Self::StoreRead { path, .. } => vec![
                format!("Check that {} is valid JSON, or restore it from version control", path.display()),
            ],
            Self::StoreWrite { path, .. } => vec![
                format!("Check permissions on {}", path.display()),
            ],
            Self::RestoreFailed { path, .. } => vec![
                format!("Restore {} from version control before retrying", path.display()),
            ],
            Self::NotConfigured { .. } => vec![
                "Run `packager scaffold go` first".into(),
            ],
            Self::Interaction { .. } => vec!["Run packager from an interactive terminal".into()],
        }
    }

    /// Get error category.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::UnresolvableReference { .. } => ErrorCategory::NotFound,
            Self::NotConfigured { .. } => ErrorCategory::NotFound,
            Self::FetchFailed { .. } | Self::ProcessFailed { .. } | Self::TimedOut { .. } => {
                ErrorCategory::External
            }
            Self::DependencyBuildFailed { .. } | Self::VerificationFailed { .. } => {
                ErrorCategory::External
            }
            Self::StoreRead { .. } | Self::StoreWrite { .. } | Self::RestoreFailed { .. } => {
                ErrorCategory::Internal
            }
            Self::Interaction { .. } => ErrorCategory::Internal,
        }
    }
}
