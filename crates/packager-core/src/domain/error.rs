// ============================================================================
// domain/error.rs - PURE VALIDATION ERRORS
// ============================================================================

use thiserror::Error;

/// Root domain error type.
///
/// Domain errors never involve I/O. Every variant is recoverable by asking
/// the operator for better input, which is why the session re-prompts on
/// them instead of aborting.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    // ========================================================================
    // Input Errors (re-prompt)
    // ========================================================================
    #[error("invalid repository locator '{input}': expected {expected_host}/<owner>/<name>")]
    InvalidLocator {
        input: String,
        expected_host: String,
    },

    #[error("{field} cannot be empty")]
    EmptyField { field: &'static str },

    #[error("unsupported target kind '{kind}'")]
    UnsupportedTargetKind { kind: String },

    // ========================================================================
    // Record Errors
    // ========================================================================
    #[error("invalid content hash '{value}': {reason}")]
    InvalidHash { value: String, reason: String },

    #[error("invalid package record: {0}")]
    InvalidRecord(String),
}

impl DomainError {
    /// Get user-actionable suggestions for fixing this error.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::InvalidLocator { expected_host, .. } => vec![
                format!("Expected format: {expected_host}/<owner>/<repo>"),
                "A leading https:// and a trailing .git are both accepted".into(),
            ],
            Self::EmptyField { field } => vec![format!("Provide a value for {field}")],
            Self::UnsupportedTargetKind { .. } => vec![
                "Supported target kinds:".into(),
                "  • go  - Go module packaged with buildGoModule".into(),
                "Example: packager scaffold go".into(),
            ],
            Self::InvalidHash { .. } => vec![
                "Hashes must be SRI strings such as sha256-<base64>".into(),
            ],
            Self::InvalidRecord(_) => vec![
                "Inspect the record file, or re-run `packager scaffold go`".into(),
            ],
        }
    }

    /// Error category for CLI display styling.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::InvalidLocator { .. } | Self::EmptyField { .. } => ErrorCategory::Validation,
            Self::UnsupportedTargetKind { .. } => ErrorCategory::Validation,
            Self::InvalidHash { .. } | Self::InvalidRecord(_) => ErrorCategory::Internal,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Validation,
    Internal,
}
