use std::process::Command;
use std::time::Duration;

use packager_core::{
    application::{ApplicationError, ports::SourceHasher},
    domain::{ContentHash, DIAGNOSTIC_EXCERPT_LIMIT, Forge, SourceRef, diagnosis::excerpt},
    error::PackagerResult,
};
use tracing::{debug, info, instrument};

use super::{DEFAULT_NIX_PROGRAM, DEFAULT_PREFETCH_PROGRAM};
use crate::process::{ProcessOutput, run_with_timeout};

/// Hashes an unpacked source archive in two steps: fetch the base32 digest,
/// then convert it to SRI form.
#[derive(Debug, Clone)]
pub struct NixSourceHasher {
    forge: Forge,
    prefetch_program: String,
    nix_program: String,
    fetch_timeout: Duration,
    convert_timeout: Duration,
}

impl NixSourceHasher {
    pub fn new(forge: Forge) -> Self {
        Self {
            forge,
            prefetch_program: DEFAULT_PREFETCH_PROGRAM.into(),
            nix_program: DEFAULT_NIX_PROGRAM.into(),
            fetch_timeout: Duration::from_secs(300),
            convert_timeout: Duration::from_secs(30),
        }
    }

    pub fn with_programs(mut self, prefetch: impl Into<String>, nix: impl Into<String>) -> Self {
        self.prefetch_program = prefetch.into();
        self.nix_program = nix.into();
        self
    }

    pub fn with_timeouts(mut self, fetch: Duration, convert: Duration) -> Self {
        self.fetch_timeout = fetch;
        self.convert_timeout = convert;
        self
    }

    fn fetch_digest(&self, url: &str) -> PackagerResult<String> {
        let mut cmd = Command::new(&self.prefetch_program);
        cmd.args(["--unpack", "--type", "sha256", url]);
        let out = self.run(cmd, self.fetch_timeout, url)?;

        last_line(&out.stdout)
            .map(str::to_string)
            .ok_or_else(|| fetch_failed(url, "no digest on standard output".into()).into())
    }

    fn convert(&self, url: &str, digest: &str) -> PackagerResult<ContentHash> {
        let mut cmd = Command::new(&self.nix_program);
        cmd.args(["hash", "convert", "--to", "sri", "--hash-algo", "sha256", digest]);
        let out = self.run(cmd, self.convert_timeout, url)?;

        let converted = last_line(&out.stdout).unwrap_or_default();
        ContentHash::parse(converted)
            .map_err(|e| fetch_failed(url, format!("unexpected conversion output: {e}")).into())
    }

    /// Every failure in this adapter is a fetch failure for `url`.
    fn run(&self, cmd: Command, timeout: Duration, url: &str) -> PackagerResult<ProcessOutput> {
        let out = run_with_timeout(cmd, timeout, false)
            .map_err(|e| fetch_failed(url, e.to_string()))?;
        if !out.success() {
            return Err(fetch_failed(url, excerpt(&out.stderr, DIAGNOSTIC_EXCERPT_LIMIT)).into());
        }
        Ok(out)
    }
}

impl SourceHasher for NixSourceHasher {
    #[instrument(skip(self), fields(source = %source))]
    fn hash(&self, source: &SourceRef) -> PackagerResult<ContentHash> {
        let url = self.forge.archive_url(source);
        let digest = self.fetch_digest(&url)?;
        debug!(%digest, "Prefetched archive");
        let hash = self.convert(&url, &digest)?;
        info!(%hash, "Source hashed");
        Ok(hash)
    }
}

fn fetch_failed(url: &str, diagnostic: String) -> ApplicationError {
    ApplicationError::FetchFailed {
        url: url.to_string(),
        diagnostic,
    }
}

/// Last non-blank line, trimmed. Prefetch tools print progress before the
/// digest.
fn last_line(stdout: &str) -> Option<&str> {
    stdout.lines().map(str::trim).rfind(|line| !line.is_empty())
}
