//! `packager verify`: retry the verification build on its own.

use tracing::instrument;

use crate::{
    commands::build_session, config::AppConfig, error::CliResult, operator::TerminalOperator,
    output::OutputManager,
};

#[instrument(skip_all)]
pub fn execute(config: AppConfig, output: OutputManager) -> CliResult<()> {
    let session = build_session(&config, false)?;
    let operator = TerminalOperator::new(&output);
    let record = session.verify(&operator)?;
    output.success(&format!("{} is verified", config.record.path.display()))?;
    output.field("package", &record.name)?;
    Ok(())
}
