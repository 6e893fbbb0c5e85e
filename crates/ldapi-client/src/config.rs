//! Directory client configuration.
//!
//! A [`DirectoryConfig`] is built with [`DirectoryConfig::builder`] or
//! deserialized from TOML/JSON, and can be layered with a
//! [`ConfigOverlay`] whose present fields replace the current values.

use std::path::{Path, PathBuf};
use std::time::Duration;

use md5::{Digest, Md5};
use serde::{Deserialize, Serialize};

use crate::dn::is_valid_dn;
use crate::error::{DirectoryError, DirectoryResult};

// ============================================================================
// Logging options
// ============================================================================

/// Logging options carried with the connection settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Write events to a daily log file under `path`.
    pub enable: bool,
    /// Echo events to stderr as well.
    pub debug: bool,
    /// Directory for log files.
    pub path: PathBuf,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            enable: false,
            debug: false,
            path: PathBuf::from("/tmp"),
        }
    }
}

// ============================================================================
// Directory Configuration
// ============================================================================

/// Connection and schema settings for one directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DirectoryConfig {
    // === Connection ===
    /// Server URL (`ldap://`, `ldaps://` or `ldapi://`).
    pub host: String,

    /// Default search base.
    pub base_dn: String,

    /// Bind DN for the service account. Empty for an anonymous bind.
    pub bind_dn: String,

    /// Bind password.
    #[serde(skip_serializing)]
    pub bind_password: String,

    // === TLS ===
    /// Reject hosts that would send credentials in cleartext.
    pub require_tls: bool,

    /// Upgrade a plain `ldap://` connection with STARTTLS.
    pub starttls: bool,

    /// Skip server certificate verification.
    pub no_tls_verify: bool,

    // === Attributes ===
    /// Attribute holding the login name.
    pub login_attribute: String,

    /// Attribute holding the display name.
    pub fullname_attribute: String,

    /// Extra filter ANDed into person searches.
    pub filter: Option<String>,

    /// Object classes of organizational units.
    pub objectclass_org: Vec<String>,

    /// Object classes of person entries.
    pub objectclass_person: Vec<String>,

    // === Timeouts ===
    /// Connection timeout in seconds.
    pub connection_timeout_secs: u64,

    /// Per-operation timeout in seconds.
    pub operation_timeout_secs: u64,

    // === Logging ===
    /// Log file options.
    pub log: LogConfig,
}

impl Default for DirectoryConfig {
    fn default() -> Self {
        Self {
            host: String::new(),
            base_dn: String::new(),
            bind_dn: String::new(),
            bind_password: String::new(),
            require_tls: false,
            starttls: false,
            no_tls_verify: false,
            login_attribute: "uid".to_string(),
            fullname_attribute: "cn".to_string(),
            filter: None,
            objectclass_org: vec!["organizationalUnit".to_string(), "top".to_string()],
            objectclass_person: vec![
                "inetOrgPerson".to_string(),
                "posixAccount".to_string(),
                "top".to_string(),
            ],
            connection_timeout_secs: 5,
            operation_timeout_secs: 30,
            log: LogConfig::default(),
        }
    }
}

impl DirectoryConfig {
    /// Creates a new configuration builder.
    #[must_use]
    pub fn builder() -> DirectoryConfigBuilder {
        DirectoryConfigBuilder::new()
    }

    /// Loads a configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or the
    /// result does not validate.
    pub fn from_toml_file(path: &Path) -> DirectoryResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            DirectoryError::config(format!("failed to read {}: {e}", path.display()))
        })?;
        let config: Self = toml::from_str(&content)
            .map_err(|e| DirectoryError::config(format!("failed to parse config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Connection timeout.
    #[must_use]
    pub const fn connection_timeout(&self) -> Duration {
        Duration::from_secs(self.connection_timeout_secs)
    }

    /// Per-operation timeout.
    #[must_use]
    pub const fn operation_timeout(&self) -> Duration {
        Duration::from_secs(self.operation_timeout_secs)
    }

    /// Returns true if the host URL uses implicit TLS.
    #[must_use]
    pub fn is_ldaps(&self) -> bool {
        self.host.to_ascii_lowercase().starts_with("ldaps://")
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the host is missing or has an unknown scheme,
    /// TLS is required but not used, or a DN is malformed.
    pub fn validate(&self) -> DirectoryResult<()> {
        let host = self.host.to_ascii_lowercase();
        let scheme_len = ["ldap://", "ldaps://", "ldapi://"]
            .iter()
            .find(|s| host.starts_with(*s))
            .map(|s| s.len())
            .ok_or_else(|| {
                DirectoryError::config(format!(
                    "host '{}' must start with ldap://, ldaps:// or ldapi://",
                    self.host
                ))
            })?;

        if host.len() <= scheme_len && !host.starts_with("ldapi://") {
            return Err(DirectoryError::config("host URL is missing a server name"));
        }

        if self.require_tls && !self.is_ldaps() && !self.starttls {
            return Err(DirectoryError::InsecureProtocol);
        }

        if !self.base_dn.is_empty() && !is_valid_dn(&self.base_dn) {
            return Err(DirectoryError::invalid_dn(format!("base_dn '{}'", self.base_dn)));
        }

        if !self.bind_dn.is_empty() && !is_valid_dn(&self.bind_dn) {
            return Err(DirectoryError::invalid_dn(format!("bind_dn '{}'", self.bind_dn)));
        }

        if self.login_attribute.is_empty() {
            return Err(DirectoryError::config("login_attribute cannot be empty"));
        }

        Ok(())
    }

    /// Applies every field present in `overlay`.
    pub fn merge(&mut self, overlay: ConfigOverlay) {
        macro_rules! take {
            ($($field:ident),* $(,)?) => {
                $(if let Some(value) = overlay.$field {
                    self.$field = value;
                })*
            };
        }
        take!(
            host,
            base_dn,
            bind_dn,
            bind_password,
            require_tls,
            starttls,
            no_tls_verify,
            login_attribute,
            fullname_attribute,
            objectclass_org,
            objectclass_person,
            connection_timeout_secs,
            operation_timeout_secs,
        );
        if overlay.filter.is_some() {
            self.filter = overlay.filter;
        }
        if let Some(enable) = overlay.log_enable {
            self.log.enable = enable;
        }
        if let Some(debug) = overlay.log_debug {
            self.log.debug = debug;
        }
        if let Some(path) = overlay.log_path {
            self.log.path = path;
        }
    }

    /// Returns a copy with `overlay` applied.
    #[must_use]
    pub fn merged(&self, overlay: ConfigOverlay) -> Self {
        let mut config = self.clone();
        config.merge(overlay);
        config
    }

    /// Fingerprint identifying this configuration, credentials included.
    ///
    /// Hex MD5 of the configuration's JSON form with keys sorted.
    #[must_use]
    pub fn fingerprint(&self) -> String {
        let mut value = serde_json::to_value(self).unwrap_or_default();
        if let serde_json::Value::Object(map) = &mut value {
            map.insert(
                "bind_password".to_string(),
                serde_json::Value::String(self.bind_password.clone()),
            );
        }
        hex::encode(Md5::digest(value.to_string().as_bytes()))
    }

    /// Filter matching entries of all the given object classes.
    fn object_class_filter(classes: &[String]) -> String {
        let parts: Vec<String> = classes
            .iter()
            .map(|c| format!("(objectClass={c})"))
            .collect();
        match parts.len() {
            0 => "(objectClass=*)".to_string(),
            1 => parts[0].clone(),
            _ => format!("(&{})", parts.join("")),
        }
    }

    /// Filter for person entries, including the configured extra filter.
    #[must_use]
    pub fn person_filter(&self) -> String {
        let base = Self::object_class_filter(&self.objectclass_person);
        match &self.filter {
            Some(extra) if !extra.is_empty() => format!("(&{base}{extra})"),
            _ => base,
        }
    }

    /// Filter for organizational unit entries.
    #[must_use]
    pub fn org_filter(&self) -> String {
        Self::object_class_filter(&self.objectclass_org)
    }

    /// Filter for the person with the given login name.
    #[must_use]
    pub fn user_by_login_filter(&self, login: &str) -> String {
        format!(
            "(&{}({}={}))",
            self.person_filter(),
            self.login_attribute,
            ldap3::ldap_escape(login)
        )
    }
}

// ============================================================================
// Overlay
// ============================================================================

/// Partial configuration; present fields replace the base values.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
#[allow(missing_docs)]
pub struct ConfigOverlay {
    pub host: Option<String>,
    pub base_dn: Option<String>,
    pub bind_dn: Option<String>,
    #[serde(skip_serializing)]
    pub bind_password: Option<String>,
    pub require_tls: Option<bool>,
    pub starttls: Option<bool>,
    pub no_tls_verify: Option<bool>,
    pub login_attribute: Option<String>,
    pub fullname_attribute: Option<String>,
    pub filter: Option<String>,
    pub objectclass_org: Option<Vec<String>>,
    pub objectclass_person: Option<Vec<String>>,
    pub connection_timeout_secs: Option<u64>,
    pub operation_timeout_secs: Option<u64>,
    pub log_enable: Option<bool>,
    pub log_debug: Option<bool>,
    pub log_path: Option<PathBuf>,
}

impl ConfigOverlay {
    /// Parses an overlay from a JSON object.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON does not describe an overlay.
    pub fn from_json(json: &str) -> DirectoryResult<Self> {
        serde_json::from_str(json)
            .map_err(|e| DirectoryError::config(format!("invalid overlay: {e}")))
    }
}

// ============================================================================
// Configuration Builder
// ============================================================================

/// Builder for [`DirectoryConfig`].
#[derive(Debug, Default)]
pub struct DirectoryConfigBuilder {
    config: DirectoryConfig,
}

impl DirectoryConfigBuilder {
    /// Creates a new builder with defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the server URL.
    #[must_use]
    pub fn host(mut self, url: impl Into<String>) -> Self {
        self.config.host = url.into();
        self
    }

    /// Sets the default search base.
    #[must_use]
    pub fn base_dn(mut self, dn: impl Into<String>) -> Self {
        self.config.base_dn = dn.into();
        self
    }

    /// Sets the bind DN.
    #[must_use]
    pub fn bind_dn(mut self, dn: impl Into<String>) -> Self {
        self.config.bind_dn = dn.into();
        self
    }

    /// Sets the bind password.
    #[must_use]
    pub fn bind_password(mut self, password: impl Into<String>) -> Self {
        self.config.bind_password = password.into();
        self
    }

    /// Requires TLS (ldaps:// or STARTTLS).
    #[must_use]
    pub const fn require_tls(mut self, require: bool) -> Self {
        self.config.require_tls = require;
        self
    }

    /// Enables STARTTLS on plain connections.
    #[must_use]
    pub const fn starttls(mut self, enabled: bool) -> Self {
        self.config.starttls = enabled;
        self
    }

    /// Disables certificate verification.
    #[must_use]
    pub const fn no_tls_verify(mut self, skip: bool) -> Self {
        self.config.no_tls_verify = skip;
        self
    }

    /// Sets the login attribute.
    #[must_use]
    pub fn login_attribute(mut self, attr: impl Into<String>) -> Self {
        self.config.login_attribute = attr.into();
        self
    }

    /// Sets the display name attribute.
    #[must_use]
    pub fn fullname_attribute(mut self, attr: impl Into<String>) -> Self {
        self.config.fullname_attribute = attr.into();
        self
    }

    /// Sets the extra person filter.
    #[must_use]
    pub fn filter(mut self, filter: impl Into<String>) -> Self {
        self.config.filter = Some(filter.into());
        self
    }

    /// Sets the organizational unit object classes.
    #[must_use]
    pub fn objectclass_org(mut self, classes: Vec<String>) -> Self {
        self.config.objectclass_org = classes;
        self
    }

    /// Sets the person object classes.
    #[must_use]
    pub fn objectclass_person(mut self, classes: Vec<String>) -> Self {
        self.config.objectclass_person = classes;
        self
    }

    /// Sets the connection timeout.
    #[must_use]
    pub const fn connection_timeout(mut self, timeout: Duration) -> Self {
        self.config.connection_timeout_secs = timeout.as_secs();
        self
    }

    /// Sets the per-operation timeout.
    #[must_use]
    pub const fn operation_timeout(mut self, timeout: Duration) -> Self {
        self.config.operation_timeout_secs = timeout.as_secs();
        self
    }

    /// Sets the logging options.
    #[must_use]
    pub fn log(mut self, log: LogConfig) -> Self {
        self.config.log = log;
        self
    }

    /// Builds and validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if validation fails.
    pub fn build(self) -> DirectoryResult<DirectoryConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}
