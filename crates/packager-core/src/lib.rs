//! Packager Core - Hexagonal Architecture Implementation
//!
//! This crate provides the domain and application layers for the packager
//! tool, which fills in a Nix Go package record (`.package-config.json`)
//! from a repository URL and a ref.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │          packager-cli (CLI)             │
//! │   (TerminalOperator, subcommands)       │
//! └──────────────────┬──────────────────────┘
//!                    │ calls
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │         Application Services            │
//! │ (ScaffoldSession, DependencyHashResolver)│
//! └──────────────────┬──────────────────────┘
//!                    │ uses
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │      Application Ports (Traits)         │
//! │ (RefProbe, SourceHasher, BuildRunner,   │
//! │  ConfigStore, Operator)                 │
//! └──────────────────┬──────────────────────┘
//!                    │ implemented by
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │   packager-adapters (Infrastructure)    │
//! │ (HttpRefProbe, Nix runners, JSON store) │
//! └─────────────────────────────────────────┘
//!                    │
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │         Domain Layer (Pure Logic)       │
//! │ (Forge, ContentHash, ConfigRecord,      │
//! │  BuildDiagnosis, SessionInputs)         │
//! └─────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use packager_core::application::{ScaffoldSession, SessionSettings};
//!
//! let session = ScaffoldSession::new(probe, hasher, builder, store, SessionSettings::default());
//! match session.run(&operator)? {
//!     SessionOutcome::Committed(record) => println!("saved {}", record.name),
//!     SessionOutcome::AbortedByUser => println!("cancelled"),
//! }
//! ```

pub mod domain;

pub mod application;

pub mod error;

// Public API - what external crates should use
pub mod prelude {
    pub use crate::application::{
        ApplicationError, ScaffoldSession, SessionOutcome, SessionSettings,
        ports::{
            BuildReport, BuildRunner, ConfigStore, Operator, Progress, Prompt, RefProbe,
            SourceHasher,
        },
    };
    pub use crate::domain::{
        ConfigRecord, ContentHash, DomainError, Field, Forge, RepoLocator, SourceRef, TargetKind,
    };
    pub use crate::error::{FileState, PackagerError, PackagerResult};
}

// Version info
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
