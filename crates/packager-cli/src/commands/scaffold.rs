//! Implementation of the `packager scaffold` command.
//!
//! Responsibility: validate the package kind, wire adapters into a
//! `ScaffoldSession`, run it against the terminal, and report the outcome.
//! No business logic lives here.

use packager_core::{
    application::SessionOutcome,
    domain::TargetKind,
    error::PackagerError,
};
use tracing::{info, instrument};

use crate::{
    cli::ScaffoldArgs, commands::build_session, config::AppConfig, error::CliResult,
    operator::TerminalOperator, output::OutputManager,
};

/// Execute `packager scaffold <kind>`.
///
/// The kind is checked before anything else so that an unsupported kind
/// fails without a single prompt.
#[instrument(skip_all, fields(kind = %args.kind))]
pub fn execute(args: ScaffoldArgs, config: AppConfig, output: OutputManager) -> CliResult<()> {
    let kind: TargetKind = args.kind.parse().map_err(PackagerError::from)?;

    let session = build_session(&config, args.yes)?;
    output.header(&format!(
        "Scaffolding a {kind} package record in {}",
        config.record.path.display()
    ))?;

    let operator = TerminalOperator::new(&output);
    match session.run(&operator)? {
        SessionOutcome::Committed(record) => {
            info!(package = %record.name, "Scaffold completed");
            output.success(&format!(
                "'{}' is configured for {} at {}",
                record.name,
                record.repo_summary(),
                record.git_ref
            ))?;
        }
        SessionOutcome::AbortedByUser => {
            output.info("Cancelled. No files were modified.")?;
        }
    }

    Ok(())
}
