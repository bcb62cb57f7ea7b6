//! Application layer for packager.
//!
//! This layer contains:
//! - **Services**: Use case orchestration (ScaffoldSession, DependencyHashResolver)
//! - **Ports**: Interface definitions (traits) for external dependencies
//! - **Errors**: Stage and port failures
//!
//! The application layer sequences the domain layer but holds no parsing or
//! validation rules itself. Those live in `crate::domain`.

pub mod error;
pub mod ports;
pub mod services;

// Re-export main services
pub use services::{
    DependencyHash, DependencyHashResolver, ScaffoldSession, SessionOutcome, SessionSettings,
    SessionState,
};

// Re-export port traits (for adapter implementation)
pub use ports::{
    BuildReport, BuildRunner, ConfigStore, Operator, Progress, Prompt, RefProbe, SourceHasher,
};

pub use error::ApplicationError;
