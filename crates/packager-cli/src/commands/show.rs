//! `packager show`: print the committed record.

use packager_adapters::JsonConfigStore;
use packager_core::{application::ports::ConfigStore, error::PackagerError};

use crate::{
    cli::ShowArgs,
    config::AppConfig,
    error::{CliError, CliResult},
    output::OutputManager,
};

pub fn execute(args: ShowArgs, config: AppConfig, output: OutputManager) -> CliResult<()> {
    let store = JsonConfigStore::new(&config.record.path);
    let Some(record) = store.load(&config.record.template_name)? else {
        output.info(&format!(
            "No package configured yet in {}. Run `packager scaffold go`.",
            config.record.path.display()
        ))?;
        return Ok(());
    };

    if args.json {
        let json = record
            .to_json_pretty()
            .map_err(|e| CliError::Core(PackagerError::from(e)))?;
        output.data(json.trim_end())?;
        return Ok(());
    }

    output.header(&config.record.path.display().to_string())?;
    output.field("name", &record.name)?;
    output.field("description", &record.description)?;
    output.field("repository", &record.repo_summary())?;
    output.field("ref", &record.git_ref)?;
    output.field("sha256", record.source_hash.as_str())?;
    output.field("vendorHash", record.dependency_hash.as_str())?;
    if record.dependency_hash.is_placeholder() {
        output.info("vendorHash is the placeholder: the package has no Go dependencies, or was never resolved")?;
    }
    Ok(())
}
