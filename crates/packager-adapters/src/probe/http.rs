//! HEAD probe against the forge's archive endpoint.

use std::time::Duration;

use packager_core::{
    application::ports::RefProbe,
    domain::{Forge, SourceRef},
    error::{PackagerError, PackagerResult},
};
use reqwest::{StatusCode, blocking::Client, redirect::Policy};
use tracing::{debug, instrument};

/// Checks that `<host>/<owner>/<repo>/archive/<ref>.tar.gz` answers a HEAD
/// request with `200 OK` or `302 Found`. Redirects are not followed and the
/// body is never downloaded.
#[derive(Debug, Clone)]
pub struct HttpRefProbe {
    client: Client,
    forge: Forge,
}

impl HttpRefProbe {
    pub fn new(forge: Forge, timeout: Duration) -> PackagerResult<Self> {
        let client = Client::builder()
            .redirect(Policy::none())
            .timeout(timeout)
            .user_agent(concat!("packager/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| PackagerError::Internal {
                message: format!("failed to build HTTP client: {e}"),
            })?;
        Ok(Self { client, forge })
    }

    /// Probe an arbitrary URL.
    pub fn probe_url(&self, url: &str) -> bool {
        match self.client.head(url).send() {
            Ok(response) => {
                let status = response.status();
                debug!(%url, %status, "Probe answered");
                matches!(status, StatusCode::OK | StatusCode::FOUND)
            }
            Err(e) => {
                debug!(%url, error = %e, "Probe failed");
                false
            }
        }
    }
}

impl RefProbe for HttpRefProbe {
    #[instrument(skip(self), fields(source = %source))]
    fn ref_exists(&self, source: &SourceRef) -> bool {
        self.probe_url(&self.forge.archive_url(source))
    }
}
