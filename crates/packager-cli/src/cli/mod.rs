//! CLI argument definitions using the clap derive API.
//!
//! This module is the *only* place that knows about argument names, aliases,
//! help text, and value enums.  No business logic lives here.

use clap::{Args, Parser, Subcommand, ValueEnum};

pub mod global;
pub use global::GlobalArgs;

// ── Top-level CLI ─────────────────────────────────────────────────────────────

/// Main CLI entry-point.
#[derive(Debug, Parser)]
#[command(
    name    = "packager",
    bin_name = "packager",
    version  = env!("CARGO_PKG_VERSION"),
    author   = env!("CARGO_PKG_AUTHORS"),
    about    = "Fill in a Nix Go package record from a repository and a ref",
    long_about = "packager asks for a package name, repository URL and ref, \
                  computes the source hash, discovers the vendor hash through \
                  a provoked build, and commits .package-config.json once \
                  you confirm.",
    after_help = "EXAMPLES:\n\
        \x20 packager scaffold go\n\
        \x20 packager scaffold go --yes\n\
        \x20 packager verify\n\
        \x20 packager show --json\n\
        \x20 packager completions bash > /usr/share/bash-completion/completions/packager",
    arg_required_else_help = true,
    subcommand_required    = true,
)]
pub struct Cli {
    /// Flags available on every subcommand.
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

// ── Subcommands ───────────────────────────────────────────────────────────────

/// All available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Interactively fill in and commit the package record.
    #[command(
        visible_alias = "s",
        about = "Scaffold a package record",
        after_help = "EXAMPLES:\n\
            \x20 packager scaffold go\n\
            \x20 packager scaffold go --record pkgs/auth/.package-config.json"
    )]
    Scaffold(ScaffoldArgs),

    /// Re-run the verification build against the committed record.
    #[command(about = "Re-run the verification build")]
    Verify,

    /// Print the committed record.
    #[command(
        about = "Show the committed record",
        after_help = "EXAMPLES:\n\
            \x20 packager show\n\
            \x20 packager show --json | jq .vendorHash"
    )]
    Show(ShowArgs),

    /// Generate shell completion scripts.
    #[command(
        about = "Generate shell completions",
        after_help = "EXAMPLES:\n\
            \x20 packager completions bash > ~/.local/share/bash-completion/completions/packager\n\
            \x20 packager completions zsh  > ~/.zfunc/_packager\n\
            \x20 packager completions fish > ~/.config/fish/completions/packager.fish"
    )]
    Completions(CompletionsArgs),

    /// Inspect the effective configuration.
    #[command(
        about = "Configuration inspection",
        subcommand,
        after_help = "EXAMPLES:\n\
            \x20 packager config get timeouts.build_secs\n\
            \x20 packager config list\n\
            \x20 packager config path"
    )]
    Config(ConfigCommands),
}

// ── scaffold ──────────────────────────────────────────────────────────────────

/// Arguments for `packager scaffold`.
#[derive(Debug, Args)]
pub struct ScaffoldArgs {
    /// Kind of package to scaffold. Validated after parsing so that an
    /// unsupported kind is a regular failure rather than a usage error.
    #[arg(value_name = "KIND", help = "Package kind (only `go` is supported)")]
    pub kind: String,

    /// Skip the confirmation prompt.
    #[arg(
        short = 'y',
        long = "yes",
        help = "Skip confirmation and commit immediately"
    )]
    pub yes: bool,
}

// ── show ──────────────────────────────────────────────────────────────────────

/// Arguments for `packager show`.
#[derive(Debug, Args)]
pub struct ShowArgs {
    /// Print the record exactly as stored.
    #[arg(long = "json", help = "Print the record as JSON")]
    pub json: bool,
}

// ── completions ───────────────────────────────────────────────────────────────

/// Arguments for `packager completions`.
#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Target shell.
    #[arg(value_enum, help = "Shell to generate completions for")]
    pub shell: Shell,
}

/// Supported shells for completion generation.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
    Elvish,
}

// ── config subcommands ────────────────────────────────────────────────────────

/// Subcommands for `packager config`.
#[derive(Debug, Subcommand)]
pub enum ConfigCommands {
    /// Print the value of a configuration key.
    Get {
        /// Dotted key path, e.g. `forge.host`.
        key: String,
    },
    /// Print all configuration values.
    List,
    /// Print the path to the default configuration file.
    Path,
}

// ── tests ─────────────────────────────────────────────────────────────────────
