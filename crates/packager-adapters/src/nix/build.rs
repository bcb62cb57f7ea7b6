use std::process::Command;
use std::time::Duration;

use packager_core::{
    application::ports::{BuildReport, BuildRunner},
    error::PackagerResult,
};
use tracing::{debug, instrument};

use super::{DEFAULT_FLAKE, DEFAULT_NIX_PROGRAM};
use crate::process::run_with_timeout;

/// Runs `nix build <flake>#<attribute> --no-link`.
#[derive(Debug, Clone)]
pub struct NixBuildRunner {
    program: String,
    flake: String,
    timeout: Duration,
}

impl NixBuildRunner {
    pub fn new() -> Self {
        Self {
            program: DEFAULT_NIX_PROGRAM.into(),
            flake: DEFAULT_FLAKE.into(),
            timeout: Duration::from_secs(600),
        }
    }

    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    pub fn with_flake(mut self, flake: impl Into<String>) -> Self {
        self.flake = flake.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn installable(&self, attribute: &str) -> String {
        format!("{}#{}", self.flake, attribute)
    }
}

impl Default for NixBuildRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl BuildRunner for NixBuildRunner {
    #[instrument(skip(self))]
    fn build(&self, attribute: &str, echo: bool) -> PackagerResult<BuildReport> {
        let mut cmd = Command::new(&self.program);
        cmd.args(["build", &self.installable(attribute), "--no-link"]);

        let out = run_with_timeout(cmd, self.timeout, echo)?;
        debug!(status = %out.status, "Build finished");

        // The mismatch report lives on stderr; stdout is kept for excerpts.
        let mut diagnostics = out.stderr;
        diagnostics.push_str(&out.stdout);
        Ok(BuildReport {
            succeeded: out.status.success(),
            diagnostics,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn installable_joins_flake_and_attribute() {
        assert_eq!(NixBuildRunner::new().installable("auth"), ".#auth");
        assert_eq!(
            NixBuildRunner::new().with_flake("./pkgs").installable("auth"),
            "./pkgs#auth"
        );
    }
}
