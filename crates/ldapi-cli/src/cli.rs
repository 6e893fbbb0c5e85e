//! CLI argument parsing.

use clap::{Args, Parser, Subcommand, ValueEnum};
use ldapi_client::{ConfigOverlay, ModifyKind};
use ldapi_crypto::PasswordScheme;

use crate::config::OutputFormat;

/// ldapi - directory (LDAP) client.
#[derive(Debug, Parser)]
#[command(name = "ldapi")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Server URL, e.g. ldap://localhost:389 (overrides config).
    #[arg(short = 'H', long, env = "LDAPI_HOST", global = true)]
    pub host: Option<String>,

    /// Default search base (overrides config).
    #[arg(short, long, env = "LDAPI_BASE_DN", global = true)]
    pub base_dn: Option<String>,

    /// Bind DN (overrides config).
    #[arg(short = 'D', long, env = "LDAPI_BIND_DN", global = true)]
    pub bind_dn: Option<String>,

    /// Bind password (prompted for when a bind DN is set without one).
    #[arg(
        short = 'w',
        long,
        env = "LDAPI_BIND_PASSWORD",
        hide_env_values = true,
        global = true
    )]
    pub bind_password: Option<String>,

    /// Output format (overrides config).
    #[arg(short, long, value_enum, global = true)]
    pub output: Option<OutputFormat>,

    /// Echo log events to stderr.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Directory settings given on the command line.
    #[must_use]
    pub fn overlay(&self) -> ConfigOverlay {
        ConfigOverlay {
            host: self.host.clone(),
            base_dn: self.base_dn.clone(),
            bind_dn: self.bind_dn.clone(),
            bind_password: self.bind_password.clone(),
            log_debug: self.verbose.then_some(true),
            ..ConfigOverlay::default()
        }
    }
}

/// CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Search the directory.
    Search(SearchArgs),

    /// Add an entry.
    Add {
        /// DN of the new entry.
        dn: String,

        /// Attribute as name=value; repeat for more values.
        #[arg(short, long = "attr", required = true)]
        attrs: Vec<String>,
    },

    /// Modify an entry.
    Modify {
        /// DN of the entry.
        dn: String,

        /// Attribute as name=value; repeat for more values.
        #[arg(short, long = "attr", required = true)]
        attrs: Vec<String>,

        /// How values are applied.
        #[arg(short, long, value_enum, default_value = "replace")]
        mode: ModifyMode,
    },

    /// Delete an entry.
    Delete {
        /// DN of the entry.
        dn: String,

        /// Skip confirmation.
        #[arg(long)]
        force: bool,
    },

    /// Person entries looked up by login.
    #[command(subcommand)]
    User(UserCommand),

    /// Hash a password as a userPassword value.
    Passwd {
        /// Password (will prompt if not provided).
        #[arg(long)]
        password: Option<String>,

        /// Hash scheme: sha, ssha or md5.
        #[arg(short, long, default_value = "ssha")]
        scheme: PasswordScheme,

        /// The password is already a hex MD5 digest (md5 only).
        #[arg(long)]
        pre_hashed: bool,
    },

    /// Check a password against a stored userPassword value.
    VerifyPassword {
        /// Stored value, e.g. {SSHA}....
        #[arg(long)]
        stored: String,

        /// Password (will prompt if not provided).
        #[arg(long)]
        password: Option<String>,
    },

    /// DN utilities.
    #[command(subcommand)]
    Dn(DnCommand),

    /// Configuration management.
    #[command(subcommand)]
    Config(ConfigCommand),
}

/// Search arguments.
#[derive(Debug, Args)]
pub struct SearchArgs {
    /// LDAP filter (defaults to the person filter).
    pub filter: Option<String>,

    /// Search base (defaults to the configured base DN).
    #[arg(long)]
    pub base: Option<String>,

    /// Attribute to return; repeat for more (default: all).
    #[arg(short, long = "attr")]
    pub attrs: Vec<String>,

    /// Only show the first entry.
    #[arg(long)]
    pub first: bool,

    /// Only print DNs.
    #[arg(long)]
    pub dn_only: bool,
}

/// How modify applies attribute values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ModifyMode {
    /// Add values.
    Add,
    /// Remove values (no value removes the attribute).
    Delete,
    /// Replace all values.
    Replace,
}

impl From<ModifyMode> for ModifyKind {
    fn from(mode: ModifyMode) -> Self {
        match mode {
            ModifyMode::Add => Self::Add,
            ModifyMode::Delete => Self::Delete,
            ModifyMode::Replace => Self::Replace,
        }
    }
}

/// User commands.
#[derive(Debug, Subcommand)]
pub enum UserCommand {
    /// Show a person entry.
    Show {
        /// Login name.
        login: String,
    },

    /// Check a person's password by binding as them.
    Auth {
        /// Login name.
        login: String,

        /// Password (will prompt if not provided).
        #[arg(long)]
        password: Option<String>,
    },

    /// Set a person's password.
    SetPassword {
        /// Login name.
        login: String,

        /// New password (will prompt if not provided).
        #[arg(long)]
        password: Option<String>,

        /// Hash scheme: sha, ssha or md5.
        #[arg(short, long, default_value = "ssha")]
        scheme: PasswordScheme,
    },
}

/// DN commands.
#[derive(Debug, Subcommand)]
pub enum DnCommand {
    /// Group a DN's values by attribute type.
    Parse {
        /// Distinguished name.
        dn: String,
    },

    /// Print the first ou value of a DN.
    Ou {
        /// Distinguished name.
        dn: String,
    },

    /// Split a DN into its RDNs.
    Explode {
        /// Distinguished name.
        dn: String,
    },

    /// Escape a value for use in a DN.
    Escape {
        /// Attribute value.
        value: String,
    },
}

/// Config commands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration.
    Show,

    /// Set a configuration value.
    Set {
        /// Configuration key.
        key: String,

        /// Configuration value.
        value: String,
    },

    /// Print the configuration file path.
    Path,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "ldapi",
            "search",
            "(uid=jdoe)",
            "-a",
            "cn",
            "-a",
            "mail",
            "-H",
            "ldap://localhost:389",
            "-o",
            "json",
            "-v",
        ])
        .unwrap();

        assert_eq!(cli.host.as_deref(), Some("ldap://localhost:389"));
        assert_eq!(cli.output, Some(OutputFormat::Json));
        let Command::Search(args) = &cli.command else {
            panic!("expected search");
        };
        assert_eq!(args.filter.as_deref(), Some("(uid=jdoe)"));
        assert_eq!(args.attrs, ["cn", "mail"]);

        let overlay = cli.overlay();
        assert_eq!(overlay.host.as_deref(), Some("ldap://localhost:389"));
        assert_eq!(overlay.log_debug, Some(true));
        assert!(overlay.base_dn.is_none());
    }

    #[test]
    fn parses_password_scheme() {
        let cli = Cli::try_parse_from(["ldapi", "passwd", "--scheme", "MD5", "--pre-hashed"])
            .unwrap();
        let Command::Passwd {
            scheme, pre_hashed, ..
        } = cli.command
        else {
            panic!("expected passwd");
        };
        assert_eq!(scheme, PasswordScheme::Md5);
        assert!(pre_hashed);

        assert!(Cli::try_parse_from(["ldapi", "passwd", "--scheme", "crypt"]).is_err());
    }

    #[test]
    fn modify_requires_attributes() {
        assert!(Cli::try_parse_from(["ldapi", "modify", "uid=a,dc=x"]).is_err());

        let cli = Cli::try_parse_from([
            "ldapi", "modify", "uid=a,dc=x", "--attr", "mail=a@x", "--mode", "add",
        ])
        .unwrap();
        let Command::Modify { mode, .. } = cli.command else {
            panic!("expected modify");
        };
        assert_eq!(ModifyKind::from(mode), ModifyKind::Add);
    }
}
