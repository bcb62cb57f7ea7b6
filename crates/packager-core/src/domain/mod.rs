// ============================================================================
//  CLEAN MODULE BOUNDARIES
// ============================================================================

//! Core domain layer for packager.
//!
//! Pure logic only: parsing locators, validating hashes, classifying build
//! diagnostics, resolving operator answers against prior state.
//!
//! ## Hexagonal Architecture Compliance
//!
//! - **No I/O**: no filesystem, network, or subprocess calls
//! - **Immutable values**: all domain objects are Clone + PartialEq
//! - **Serde only for the wire format**: the record file is a contract with
//!   the Nix package definition
pub mod diagnosis;
pub mod error;
pub mod hash;
pub mod inputs;
pub mod locator;
pub mod record;
pub mod target;

// Re-exports for convenience
pub use diagnosis::{BuildDiagnosis, DIAGNOSTIC_EXCERPT_LIMIT, HASH_MISMATCH_MARKER};
pub use error::{DomainError, ErrorCategory};
pub use hash::{ContentHash, PLACEHOLDER_HASH};
pub use inputs::{Answers, Field, PromptDefaults, SessionInputs, accept_answer};
pub use locator::{DEFAULT_FORGE_HOST, Forge, RepoLocator, SourceRef};
pub use record::{ConfigRecord, TEMPLATE_PACKAGE_NAME};
pub use target::TargetKind;
