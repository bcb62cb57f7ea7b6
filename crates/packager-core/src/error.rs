//! Unified error handling for packager core.
//!
//! Wraps domain and application errors, and answers the one question the
//! operator needs before retrying: was the record file touched?

use thiserror::Error;

use crate::application::ApplicationError;
use crate::domain::DomainError;

/// Root error type for packager core operations.
#[derive(Debug, Error, Clone)]
pub enum PackagerError {
    /// Errors from the domain layer (invalid input or record).
    #[error("{0}")]
    Domain(#[from] DomainError),

    /// Errors from the application layer (stage or port failures).
    #[error("{0}")]
    Application(#[from] ApplicationError),

    /// Unexpected internal errors (bugs).
    #[error("Internal error: {message}. This is a bug, please report it.")]
    Internal { message: String },
}

impl PackagerError {
    /// Get user-actionable suggestions for fixing this error.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::Domain(e) => e.suggestions(),
            Self::Application(e) => e.suggestions(),
            Self::Internal { .. } => vec![
                "This appears to be a bug in packager".into(),
                "Please report this issue at: https://github.com/cosecruz/packager/issues".into(),
            ],
        }
    }

    /// Get error category for display/styling purposes.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Domain(e) => match e.category() {
                crate::domain::ErrorCategory::Validation => ErrorCategory::Validation,
                crate::domain::ErrorCategory::Internal => ErrorCategory::Internal,
            },
            Self::Application(e) => e.category(),
            Self::Internal { .. } => ErrorCategory::Internal,
        }
    }

    /// What this failure left on disk.
    pub fn file_state(&self) -> FileState {
        match self {
            Self::Application(ApplicationError::VerificationFailed { .. }) => {
                FileState::SavedUnverified
            }
            Self::Application(
                ApplicationError::StoreWrite {
                    rolled_back: false,
                    ..
                }
                | ApplicationError::RestoreFailed { .. },
            ) => FileState::Unknown,
            _ => FileState::Untouched,
        }
    }
}

/// Error categories for UI display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Validation,
    NotFound,
    External,
    Internal,
}

/// State of the record file after a failed session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileState {
    /// The record file is byte-identical to before the session.
    Untouched,
    /// The new record was committed but its build did not pass.
    SavedUnverified,
    /// A write or rollback failed part-way; the file needs inspection.
    Unknown,
}

impl FileState {
    /// Sentence appended to every error shown to the operator.
    pub fn describe(&self) -> &'static str {
        match self {
            Self::Untouched => "No files were modified.",
            Self::SavedUnverified => {
                "The record was saved but is unverified; `packager verify` retries the build alone."
            }
            Self::Unknown => "The record file may have been modified; inspect it before retrying.",
        }
    }
}

/// Convenient result type alias.
pub type PackagerResult<T> = Result<T, PackagerError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn verification_failure_is_saved_unverified() {
        let err: PackagerError = ApplicationError::VerificationFailed {
            attribute: "auth".into(),
            path: PathBuf::from(".package-config.json"),
            reason: "exit status 1".into(),
        }
        .into();
        assert_eq!(err.file_state(), FileState::SavedUnverified);
    }

    #[test]
    fn pre_commit_failures_leave_file_untouched() {
        let errors: Vec<PackagerError> = vec![
            DomainError::EmptyField { field: "name" }.into(),
            ApplicationError::UnresolvableReference {
                owner: "a".into(),
                repo: "b".into(),
                git_ref: "v1".into(),
                url: "https://github.com/a/b/archive/v1.tar.gz".into(),
            }
            .into(),
            ApplicationError::DependencyBuildFailed {
                attribute: "b".into(),
                excerpt: "boom".into(),
            }
            .into(),
        ];
        for err in errors {
            assert_eq!(err.file_state(), FileState::Untouched, "{err}");
        }
    }

    #[test]
    fn rollback_failure_is_unknown() {
        let err: PackagerError = ApplicationError::RestoreFailed {
            path: PathBuf::from("x"),
            reason: "denied".into(),
        }
        .into();
        assert_eq!(err.file_state(), FileState::Unknown);
        assert!(err.file_state().describe().contains("inspect"));
    }

    #[test]
    fn store_write_state_depends_on_rollback() {
        let write = |rolled_back| -> PackagerError {
            ApplicationError::StoreWrite {
                path: PathBuf::from(".package-config.json"),
                reason: "disk full".into(),
                rolled_back,
            }
            .into()
        };
        assert_eq!(write(false).file_state(), FileState::Unknown);
        assert_eq!(write(true).file_state(), FileState::Untouched);
    }

    #[test]
    fn store_read_failure_is_untouched() {
        let err: PackagerError = ApplicationError::StoreRead {
            path: PathBuf::from(".package-config.json"),
            reason: "expected value at line 1 column 1".into(),
        }
        .into();
        assert_eq!(err.file_state(), FileState::Untouched);
    }

    #[test]
    fn validation_category_comes_from_domain() {
        let err: PackagerError = DomainError::EmptyField { field: "ref" }.into();
        assert_eq!(err.category(), ErrorCategory::Validation);
    }
}
