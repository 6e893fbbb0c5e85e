//! Password hashing commands.

use ldapi_crypto::{ldap_password, verify_password, PasswordScheme};

use crate::config::OutputFormat;
use crate::output::{error, password_or_prompt, success};
use crate::CliError;

/// Prints the `userPassword` value for a password.
///
/// # Errors
///
/// Returns an error if the prompt fails or a pre-hashed digest is not
/// valid hex.
pub fn run_passwd(
    password: Option<String>,
    scheme: PasswordScheme,
    pre_hashed: bool,
) -> crate::CliResult<()> {
    if pre_hashed && scheme != PasswordScheme::Md5 {
        return Err(CliError::InvalidArgument(
            "--pre-hashed only applies to --scheme md5".to_string(),
        ));
    }
    let prompt = if pre_hashed {
        "MD5 digest (hex): "
    } else {
        "Password: "
    };
    let password = password_or_prompt(password, prompt)?;

    println!("{}", ldap_password(&password, scheme.tag(), pre_hashed)?);
    Ok(())
}

/// Checks a password against a stored value.
///
/// # Errors
///
/// Returns an error if the stored value is malformed or the password
/// does not match.
pub fn run_verify_password(
    stored: &str,
    password: Option<String>,
    output_format: OutputFormat,
) -> crate::CliResult<()> {
    let password = password_or_prompt(password, "Password: ")?;

    if verify_password(&password, stored)? {
        if output_format != OutputFormat::Quiet {
            success("Password matches");
        }
        Ok(())
    } else {
        error("Password does not match");
        Err(CliError::InvalidArgument("password mismatch".to_string()))
    }
}
