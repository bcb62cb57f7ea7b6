//! Adapters that shell out to the Nix toolchain.
//!
//! - [`NixSourceHasher`]: `nix-prefetch-url --unpack` then `nix hash convert`
//! - [`NixBuildRunner`]: `nix build <flake>#<attr> --no-link`

mod build;
mod prefetch;

pub use build::NixBuildRunner;
pub use prefetch::NixSourceHasher;

/// Default program for `nix build` and `nix hash convert`.
pub const DEFAULT_NIX_PROGRAM: &str = "nix";
/// Default program for fetching and unpacking archives.
pub const DEFAULT_PREFETCH_PROGRAM: &str = "nix-prefetch-url";
/// Flake the package attribute is looked up in.
pub const DEFAULT_FLAKE: &str = ".";
