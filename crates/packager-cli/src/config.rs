//! Application configuration.
//!
//! [`AppConfig`] is loaded once at startup and passed down by value.  The
//! CLI layer owns config; the core crate never sees it.
//!
//! # Resolution order (highest priority first)
//!
//! 1. CLI flags (`--record`, `--no-color`; applied at the call-site)
//! 2. Environment variables: `PACKAGER_<SECTION>__<KEY>`,
//!    e.g. `PACKAGER_TIMEOUTS__BUILD_SECS=900`
//! 3. Config file: `--config <FILE>`, else [`AppConfig::config_path`] if it exists
//! 4. Built-in defaults (always present)

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use config::{Config, Environment, File, FileFormat};
use packager_adapters::{
    nix::{DEFAULT_FLAKE, DEFAULT_NIX_PROGRAM, DEFAULT_PREFETCH_PROGRAM},
    store::DEFAULT_RECORD_PATH,
};
use packager_core::domain::{DEFAULT_FORGE_HOST, TEMPLATE_PACKAGE_NAME};
use serde::{Deserialize, Serialize};
use tracing::debug;

const ENV_PREFIX: &str = "PACKAGER";

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    pub record: RecordConfig,
    pub forge: ForgeConfig,
    pub build: BuildConfig,
    pub timeouts: TimeoutConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordConfig {
    /// Record file, relative to the working directory.
    pub path: PathBuf,
    /// Record name that means "not configured yet".
    pub template_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForgeConfig {
    pub host: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildConfig {
    /// `nix` executable, used for `nix build` and `nix hash convert`.
    pub program: String,
    pub prefetch_program: String,
    pub flake: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeoutConfig {
    pub probe_secs: u64,
    pub fetch_secs: u64,
    pub convert_secs: u64,
    pub build_secs: u64,
}

impl TimeoutConfig {
    pub fn probe(&self) -> Duration {
        Duration::from_secs(self.probe_secs)
    }

    pub fn fetch(&self) -> Duration {
        Duration::from_secs(self.fetch_secs)
    }

    pub fn convert(&self) -> Duration {
        Duration::from_secs(self.convert_secs)
    }

    pub fn build(&self) -> Duration {
        Duration::from_secs(self.build_secs)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputConfig {
    pub no_color: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            record: RecordConfig {
                path: PathBuf::from(DEFAULT_RECORD_PATH),
                template_name: TEMPLATE_PACKAGE_NAME.into(),
            },
            forge: ForgeConfig {
                host: DEFAULT_FORGE_HOST.into(),
            },
            build: BuildConfig {
                program: DEFAULT_NIX_PROGRAM.into(),
                prefetch_program: DEFAULT_PREFETCH_PROGRAM.into(),
                flake: DEFAULT_FLAKE.into(),
            },
            timeouts: TimeoutConfig {
                probe_secs: 30,
                fetch_secs: 300,
                convert_secs: 30,
                build_secs: 600,
            },
            output: OutputConfig { no_color: false },
        }
    }
}

impl AppConfig {
    /// Load configuration, layering file and environment over the defaults.
    ///
    /// An explicit `config_file` must exist; the default location is optional.
    pub fn load(config_file: Option<&Path>) -> anyhow::Result<Self> {
        let defaults =
            Config::try_from(&Self::default()).context("failed to encode built-in defaults")?;

        let file = match config_file {
            Some(path) => File::from(path).format(FileFormat::Toml).required(true),
            None => File::from(Self::config_path())
                .format(FileFormat::Toml)
                .required(false),
        };

        let config: Self = Config::builder()
            .add_source(defaults)
            .add_source(file)
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .context("failed to read configuration")?
            .try_deserialize()
            .context("invalid configuration")?;

        debug!(?config, "Configuration loaded");
        Ok(config)
    }

    /// Path to the default configuration file.
    ///
    /// Uses `directories::ProjectDirs` for cross-platform correctness,
    /// falling back to `.packager.toml` in the current directory.
    pub fn config_path() -> PathBuf {
        directories::ProjectDirs::from("org", "packager", "packager")
            .map(|d| d.config_dir().join("config.toml"))
            .unwrap_or_else(|| PathBuf::from(".packager.toml"))
    }
}
