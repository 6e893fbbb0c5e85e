//! Configuration management commands.

use crate::cli::ConfigCommand;
use crate::config::OutputFormat;
use crate::output::{info, output_single, success};
use crate::CliConfig;

/// Runs a config command.
///
/// # Errors
///
/// Returns an error if the key or value is invalid or the file cannot be
/// written.
pub fn run_config(
    cmd: ConfigCommand,
    config: &mut CliConfig,
    output_format: OutputFormat,
) -> crate::CliResult<()> {
    match cmd {
        ConfigCommand::Show => show_config(config, output_format),
        ConfigCommand::Set { key, value } => {
            config.set(&key, &value)?;
            config.save()?;
            success(&format!("Set {key} = {value}"));
            Ok(())
        }
        ConfigCommand::Path => {
            println!("{}", CliConfig::config_path()?.display());
            Ok(())
        }
    }
}

/// Shows the current configuration.
fn show_config(config: &CliConfig, output_format: OutputFormat) -> crate::CliResult<()> {
    if output_format == OutputFormat::Table {
        info(&format!(
            "Configuration file: {}",
            CliConfig::config_path()?.display()
        ));
        println!();
    }
    output_single(config, output_format)?;

    if output_format == OutputFormat::Table && !config.directory.bind_password.is_empty() {
        println!("bind_password: ****");
    }
    Ok(())
}
