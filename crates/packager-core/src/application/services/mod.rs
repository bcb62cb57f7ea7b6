//! Application services - orchestrate use cases.
//!
//! Services coordinate the domain layer and ports to accomplish the
//! high-level use cases: "scaffold a package record" and "verify it".

pub mod dependency_hash;
pub mod scaffold_session;

pub use dependency_hash::{DependencyHash, DependencyHashResolver};
pub use scaffold_session::{ScaffoldSession, SessionOutcome, SessionSettings, SessionState};
