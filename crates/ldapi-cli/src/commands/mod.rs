//! Command implementations.

pub mod config;
pub mod dn;
pub mod entry;
pub mod password;
pub mod search;
pub mod user;

pub use config::run_config;
pub use dn::run_dn;
pub use entry::{run_add, run_delete, run_modify};
pub use password::{run_passwd, run_verify_password};
pub use search::run_search;
pub use user::run_user;

use std::sync::Arc;

use ldapi_client::{Attributes, ClientRegistry, DirectoryClient, DirectoryConfig};

use crate::output::prompt_password;
use crate::{CliError, CliResult};

/// Returns the shared bound client for `config`.
///
/// Prompts for the bind password when a bind DN is set without one.
///
/// # Errors
///
/// Returns an error if the prompt fails or the connect/bind fails.
pub async fn connect(config: &DirectoryConfig) -> CliResult<Arc<DirectoryClient>> {
    if config.host.is_empty() {
        return Err(CliError::Config(
            "no host configured; use --host, LDAPI_HOST or `ldapi config set host`".to_string(),
        ));
    }
    tracing::debug!(host = %config.host, bind_dn = %config.bind_dn, "connecting");
    if !config.bind_dn.is_empty() && config.bind_password.is_empty() {
        let mut config = config.clone();
        config.bind_password = prompt_password(&format!("Password for {}: ", config.bind_dn))?;
        return Ok(ClientRegistry::global().get_or_connect(&config).await?);
    }
    Ok(ClientRegistry::global().get_or_connect(config).await?)
}

/// Parses `name=value` arguments into attributes.
///
/// Repeated names collect multiple values. `name=` gives an empty value
/// list, which a delete-mode modify uses to remove the whole attribute.
///
/// # Errors
///
/// Returns an error for an argument without `=` or with an empty name.
pub fn parse_attributes(args: &[String]) -> CliResult<Attributes> {
    let mut attributes = Attributes::new();
    for arg in args {
        let (name, value) = arg.split_once('=').ok_or_else(|| {
            CliError::InvalidArgument(format!("attribute '{arg}' must be name=value"))
        })?;
        let name = name.trim();
        if name.is_empty() {
            return Err(CliError::InvalidArgument(format!(
                "attribute '{arg}' has an empty name"
            )));
        }
        let values = attributes.entry(name.to_string()).or_default();
        if !value.is_empty() {
            values.push(value.to_string());
        }
    }
    Ok(attributes)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn parse_attributes_collects_values() {
        let attrs = parse_attributes(&args(&[
            "objectClass=inetOrgPerson",
            "objectClass=top",
            "cn=John Doe",
            "description=a=b",
            "mail=",
        ]))
        .unwrap();

        assert_eq!(attrs["objectClass"], ["inetOrgPerson", "top"]);
        assert_eq!(attrs["cn"], ["John Doe"]);
        assert_eq!(attrs["description"], ["a=b"]);
        assert!(attrs["mail"].is_empty());
    }

    #[test]
    fn parse_attributes_rejects_malformed() {
        assert!(parse_attributes(&args(&["cn"])).is_err());
        assert!(parse_attributes(&args(&["=value"])).is_err());
    }

    #[tokio::test]
    async fn connect_requires_host() {
        let err = connect(&DirectoryConfig::default()).await.unwrap_err();
        assert!(matches!(err, CliError::Config(_)));
    }
}
