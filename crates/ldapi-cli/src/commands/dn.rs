//! DN utility commands.

use ldapi_client::dn::{escape_dn_value, explode_dn, ou_rdn, parse_dn};

use crate::cli::DnCommand;
use crate::config::OutputFormat;
use crate::output::output_single;

/// Runs a DN command. These work offline.
///
/// # Errors
///
/// Returns an error if the DN is malformed.
pub fn run_dn(cmd: DnCommand, output_format: OutputFormat) -> crate::CliResult<()> {
    match cmd {
        DnCommand::Parse { dn } => output_single(&parse_dn(&dn)?, output_format),
        DnCommand::Ou { dn } => {
            if let Some(ou) = ou_rdn(&dn)? {
                println!("{ou}");
            }
            Ok(())
        }
        DnCommand::Explode { dn } => {
            let rdns = explode_dn(&dn)?;
            match output_format {
                OutputFormat::Json => output_single(&rdns, output_format),
                _ => {
                    for rdn in rdns {
                        println!("{rdn}");
                    }
                    Ok(())
                }
            }
        }
        DnCommand::Escape { value } => {
            println!("{}", escape_dn_value(&value));
            Ok(())
        }
    }
}
