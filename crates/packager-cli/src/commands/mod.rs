//! Command handlers, one module per subcommand.

pub mod completions;
pub mod config;
pub mod scaffold;
pub mod show;
pub mod verify;

use packager_adapters::{HttpRefProbe, JsonConfigStore, NixBuildRunner, NixSourceHasher};
use packager_core::{
    application::{ScaffoldSession, SessionSettings},
    domain::Forge,
};

use crate::{config::AppConfig, error::CliResult};

/// Wire the production adapters into a session.
pub(crate) fn build_session(config: &AppConfig, assume_yes: bool) -> CliResult<ScaffoldSession> {
    let forge = Forge::new(config.forge.host.as_str());
    let timeouts = &config.timeouts;

    let probe = HttpRefProbe::new(forge.clone(), timeouts.probe())?;
    let hasher = NixSourceHasher::new(forge.clone())
        .with_programs(config.build.prefetch_program.as_str(), config.build.program.as_str())
        .with_timeouts(timeouts.fetch(), timeouts.convert());
    let builder = NixBuildRunner::new()
        .with_program(config.build.program.as_str())
        .with_flake(config.build.flake.as_str())
        .with_timeout(timeouts.build());
    let store = JsonConfigStore::new(&config.record.path);

    Ok(ScaffoldSession::new(
        Box::new(probe),
        Box::new(hasher),
        Box::new(builder),
        Box::new(store),
        SessionSettings {
            forge,
            template_name: config.record.template_name.clone(),
            assume_yes,
        },
    ))
}
