//! Application ports (traits) for external dependencies.
//!
//! In hexagonal architecture, ports define interfaces that the application
//! needs from the outside world. Adapters in `packager-adapters` implement
//! these, and the CLI implements the [`Operator`].
//!
//! ## Port Types
//!
//! - **Driven (Output) Ports**: Called by application, implemented by infrastructure
//!   - `RefProbe`: revision existence check
//!   - `SourceHasher`: source archive content hash
//!   - `BuildRunner`: downstream build invocation
//!   - `ConfigStore`: the persisted record
//!   - `Operator`: prompts, confirmation, progress

pub mod output;

pub use output::{
    BuildReport, BuildRunner, ConfigStore, Operator, Progress, Prompt, RefProbe, SourceHasher,
};

#[cfg(test)]
pub use output::{MockBuildRunner, MockRefProbe, MockSourceHasher};
