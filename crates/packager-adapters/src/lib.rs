//! Infrastructure adapters for packager.
//!
//! This crate implements the ports defined in `packager_core::application::ports`.
//! It owns every side effect: HTTP, subprocesses and the record file.

pub mod nix;
pub mod probe;
pub mod process;
pub mod store;

// Re-export commonly used adapters
pub use nix::{NixBuildRunner, NixSourceHasher};
pub use probe::HttpRefProbe;
pub use store::{JsonConfigStore, MemoryConfigStore};
