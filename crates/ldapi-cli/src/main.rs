//! # ldapi
//!
//! Command-line directory client.

#![forbid(unsafe_code)]

use clap::Parser;
use ldapi_cli::{
    cli::{Cli, Command},
    commands::{
        run_add, run_config, run_delete, run_dn, run_modify, run_passwd, run_search, run_user,
        run_verify_password,
    },
    config::CliConfig,
    output::{error, warning},
};
use ldapi_client::{logging, ClientRegistry};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Load configuration
    let mut config = match CliConfig::load() {
        Ok(c) => c,
        Err(e) => {
            error(&format!("Failed to load configuration: {e}"));
            std::process::exit(1);
        }
    };

    let directory = config.effective_directory(cli.overlay());
    let output = cli.output.unwrap_or(config.output_format);

    let log_guard = match logging::init(&directory.log) {
        Ok(guard) => guard,
        Err(e) => {
            warning(&format!("Logging disabled: {e}"));
            None
        }
    };

    // Execute command
    let result = match cli.command {
        Command::Search(args) => run_search(args, &directory, output).await,
        Command::Add { dn, attrs } => run_add(&dn, &attrs, &directory, output).await,
        Command::Modify { dn, attrs, mode } => {
            run_modify(&dn, &attrs, mode.into(), &directory, output).await
        }
        Command::Delete { dn, force } => run_delete(&dn, force, &directory, output).await,
        Command::User(cmd) => run_user(cmd, &directory, output).await,
        Command::Passwd {
            password,
            scheme,
            pre_hashed,
        } => run_passwd(password, scheme, pre_hashed),
        Command::VerifyPassword { stored, password } => {
            run_verify_password(&stored, password, output)
        }
        Command::Dn(cmd) => run_dn(cmd, output),
        Command::Config(cmd) => run_config(cmd, &mut config, output),
    };

    ClientRegistry::global().close_all().await;

    if let Err(e) = result {
        error(&e.to_string());
        // exit() skips destructors; flush the log file first.
        drop(log_guard);
        std::process::exit(e.exit_code());
    }
}
