//! CLI configuration.
//!
//! Stored as TOML at `~/.ldapi/ldapi.toml`:
//!
//! ```toml
//! output_format = "table"
//!
//! [directory]
//! host = "ldap://localhost:389"
//! base_dn = "dc=example,dc=com"
//! bind_dn = "cn=admin,dc=example,dc=com"
//! ```
//!
//! The bind password is read from the file if present but never written
//! back; pass it with `--bind-password` or `LDAPI_BIND_PASSWORD`.

use std::path::{Path, PathBuf};

use ldapi_client::{ConfigOverlay, DirectoryConfig};
use serde::{Deserialize, Serialize};

use crate::{CliError, CliResult};

/// CLI configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    /// Output format.
    pub output_format: OutputFormat,

    /// Directory connection settings.
    pub directory: DirectoryConfig,
}

impl CliConfig {
    /// Loads configuration from the default file, or defaults if absent.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load() -> CliResult<Self> {
        Self::load_from(&Self::config_path()?)
    }

    /// Loads configuration from `path`, or defaults if absent.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load_from(path: &Path) -> CliResult<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content)
            .map_err(|e| CliError::Config(format!("failed to parse {}: {e}", path.display())))
    }

    /// Saves configuration to the default file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn save(&self) -> CliResult<()> {
        self.save_to(&Self::config_path()?)
    }

    /// Saves configuration to `path`, creating parent directories.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn save_to(&self, path: &Path) -> CliResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| CliError::Config(format!("failed to serialize config: {e}")))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Gets the configuration file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the home directory cannot be determined.
    pub fn config_path() -> CliResult<PathBuf> {
        let home = dirs_next::home_dir()
            .ok_or_else(|| CliError::Config("could not determine home directory".to_string()))?;
        Ok(home.join(".ldapi").join("ldapi.toml"))
    }

    /// Directory settings with command-line overrides applied.
    #[must_use]
    pub fn effective_directory(&self, overlay: ConfigOverlay) -> DirectoryConfig {
        self.directory.merged(overlay)
    }

    /// Sets one configuration value by key.
    ///
    /// # Errors
    ///
    /// Returns an error for unknown keys, unparsable values, or the bind
    /// password (which is never stored).
    pub fn set(&mut self, key: &str, value: &str) -> CliResult<()> {
        let dir = &mut self.directory;
        match key {
            "host" => dir.host = value.to_string(),
            "base_dn" => dir.base_dn = value.to_string(),
            "bind_dn" => dir.bind_dn = value.to_string(),
            "bind_password" => {
                return Err(CliError::InvalidArgument(
                    "bind_password is not stored; use --bind-password or LDAPI_BIND_PASSWORD"
                        .to_string(),
                ));
            }
            "login_attribute" => dir.login_attribute = value.to_string(),
            "fullname_attribute" => dir.fullname_attribute = value.to_string(),
            "filter" => {
                dir.filter = (!value.is_empty() && value != "none").then(|| value.to_string());
            }
            "objectclass_org" => dir.objectclass_org = parse_list(value),
            "objectclass_person" => dir.objectclass_person = parse_list(value),
            "require_tls" => dir.require_tls = parse_bool(key, value)?,
            "starttls" => dir.starttls = parse_bool(key, value)?,
            "no_tls_verify" => dir.no_tls_verify = parse_bool(key, value)?,
            "connection_timeout" => dir.connection_timeout_secs = parse_secs(key, value)?,
            "operation_timeout" => dir.operation_timeout_secs = parse_secs(key, value)?,
            "log.enable" => dir.log.enable = parse_bool(key, value)?,
            "log.debug" => dir.log.debug = parse_bool(key, value)?,
            "log.path" => dir.log.path = PathBuf::from(value),
            "output_format" | "output" => {
                self.output_format = value.parse()?;
            }
            _ => {
                return Err(CliError::InvalidArgument(format!(
                    "Unknown configuration key: {key}. Known keys: {}",
                    KNOWN_KEYS.join(", ")
                )));
            }
        }
        Ok(())
    }
}

/// Keys accepted by [`CliConfig::set`].
pub const KNOWN_KEYS: &[&str] = &[
    "host",
    "base_dn",
    "bind_dn",
    "login_attribute",
    "fullname_attribute",
    "filter",
    "objectclass_org",
    "objectclass_person",
    "require_tls",
    "starttls",
    "no_tls_verify",
    "connection_timeout",
    "operation_timeout",
    "log.enable",
    "log.debug",
    "log.path",
    "output_format",
];

fn parse_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

fn parse_bool(key: &str, value: &str) -> CliResult<bool> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Ok(true),
        "false" | "no" | "off" | "0" => Ok(false),
        _ => Err(CliError::InvalidArgument(format!(
            "{key} expects true or false, got '{value}'"
        ))),
    }
}

fn parse_secs(key: &str, value: &str) -> CliResult<u64> {
    value.parse().map_err(|_| {
        CliError::InvalidArgument(format!("{key} expects a number of seconds, got '{value}'"))
    })
}

/// Output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable table format.
    #[default]
    Table,
    /// JSON format.
    Json,
    /// Quiet (minimal output).
    Quiet,
}

impl std::str::FromStr for OutputFormat {
    type Err = CliError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "table" => Ok(Self::Table),
            "json" => Ok(Self::Json),
            "quiet" => Ok(Self::Quiet),
            _ => Err(CliError::InvalidArgument(format!(
                "Unknown output format: {s}. Supported: table, json, quiet"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = CliConfig::load_from(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config.output_format, OutputFormat::Table);
        assert_eq!(config.directory, DirectoryConfig::default());
    }

    #[test]
    fn save_and_reload_drops_password() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".ldapi").join("ldapi.toml");

        let mut config = CliConfig::default();
        config.set("host", "ldap://localhost:389").unwrap();
        config.set("objectclass_person", "person, top").unwrap();
        config.set("log.enable", "yes").unwrap();
        config.set("output", "json").unwrap();
        config.directory.bind_password = "secret".to_string();
        config.save_to(&path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(!content.contains("secret"));

        let loaded = CliConfig::load_from(&path).unwrap();
        assert_eq!(loaded.output_format, OutputFormat::Json);
        assert_eq!(loaded.directory.host, "ldap://localhost:389");
        assert_eq!(loaded.directory.objectclass_person, ["person", "top"]);
        assert!(loaded.directory.log.enable);
        assert!(loaded.directory.bind_password.is_empty());
    }

    #[test]
    fn set_rejects_bad_input() {
        let mut config = CliConfig::default();
        assert!(config.set("bind_password", "x").is_err());
        assert!(config.set("colour", "red").is_err());
        assert!(config.set("starttls", "maybe").is_err());
        assert!(config.set("connection_timeout", "soon").is_err());
        assert!(config.set("output_format", "yaml").is_err());

        config.set("filter", "(active=TRUE)").unwrap();
        assert_eq!(config.directory.filter.as_deref(), Some("(active=TRUE)"));
        config.set("filter", "none").unwrap();
        assert!(config.directory.filter.is_none());
    }

    #[test]
    fn overrides_apply_on_top_of_file() {
        let mut config = CliConfig::default();
        config.set("host", "ldap://file:389").unwrap();
        let overlay = ConfigOverlay {
            host: Some("ldaps://flag:636".to_string()),
            bind_password: Some("pw".to_string()),
            ..ConfigOverlay::default()
        };
        let effective = config.effective_directory(overlay);
        assert_eq!(effective.host, "ldaps://flag:636");
        assert_eq!(effective.bind_password, "pw");
    }
}
