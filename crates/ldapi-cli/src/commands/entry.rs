//! Add, modify and delete commands.

use ldapi_client::{DirectoryConfig, ModifyKind};

use crate::config::OutputFormat;
use crate::output::{confirm, success};
use crate::CliError;

use super::{connect, parse_attributes};

/// Adds an entry.
///
/// # Errors
///
/// Returns an error if the attributes are malformed or the add fails.
pub async fn run_add(
    dn: &str,
    attrs: &[String],
    config: &DirectoryConfig,
    output_format: OutputFormat,
) -> crate::CliResult<()> {
    let attributes = parse_attributes(attrs)?;
    let client = connect(config).await?;
    client.add(dn, &attributes).await?;

    if output_format != OutputFormat::Quiet {
        success(&format!("Added {dn}"));
    }
    Ok(())
}

/// Modifies an entry.
///
/// # Errors
///
/// Returns an error if the attributes are malformed or the modify fails.
pub async fn run_modify(
    dn: &str,
    attrs: &[String],
    kind: ModifyKind,
    config: &DirectoryConfig,
    output_format: OutputFormat,
) -> crate::CliResult<()> {
    let attributes = parse_attributes(attrs)?;
    if kind != ModifyKind::Delete && attributes.values().any(Vec::is_empty) {
        return Err(CliError::InvalidArgument(
            "empty values are only allowed with --mode delete".to_string(),
        ));
    }

    let client = connect(config).await?;
    client.modify_with(dn, &attributes, kind).await?;

    if output_format != OutputFormat::Quiet {
        success(&format!("Modified {dn}"));
    }
    Ok(())
}

/// Deletes an entry, asking first unless `force` is set.
///
/// # Errors
///
/// Returns [`CliError::Cancelled`] if the user declines, or an error if
/// the delete fails.
pub async fn run_delete(
    dn: &str,
    force: bool,
    config: &DirectoryConfig,
    output_format: OutputFormat,
) -> crate::CliResult<()> {
    if !force && !confirm(&format!("Delete {dn}?"))? {
        return Err(CliError::Cancelled);
    }

    let client = connect(config).await?;
    client.delete(dn).await?;

    if output_format != OutputFormat::Quiet {
        success(&format!("Deleted {dn}"));
    }
    Ok(())
}
