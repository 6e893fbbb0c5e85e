//! Search command.

use ldapi_client::DirectoryConfig;

use crate::cli::SearchArgs;
use crate::config::OutputFormat;
use crate::output::output_entries;

use super::connect;

/// Runs a search.
///
/// # Errors
///
/// Returns an error if the connect or the search fails.
pub async fn run_search(
    args: SearchArgs,
    config: &DirectoryConfig,
    output_format: OutputFormat,
) -> crate::CliResult<()> {
    let client = connect(config).await?;

    let filter = args.filter.unwrap_or_else(|| config.person_filter());
    let mut attrs: Vec<&str> = args.attrs.iter().map(String::as_str).collect();
    if args.dn_only {
        attrs = vec!["1.1"];
    }

    let mut entries = client.search(&filter, args.base.as_deref(), &attrs).await?;
    if args.first {
        entries.truncate(1);
    }

    let format = if args.dn_only {
        OutputFormat::Quiet
    } else {
        output_format
    };
    output_entries(&entries, format)
}
