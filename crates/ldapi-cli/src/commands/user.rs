//! Person lookups by login name.

use ldapi_client::DirectoryConfig;
use ldapi_crypto::PasswordScheme;

use crate::cli::UserCommand;
use crate::config::OutputFormat;
use crate::output::{error, output_entries, password_or_prompt, success};
use crate::CliError;

use super::connect;

/// Runs a user command.
///
/// # Errors
///
/// Returns an error if the user is unknown or a directory operation fails.
pub async fn run_user(
    cmd: UserCommand,
    config: &DirectoryConfig,
    output_format: OutputFormat,
) -> crate::CliResult<()> {
    match cmd {
        UserCommand::Show { login } => show_user(&login, config, output_format).await,
        UserCommand::Auth { login, password } => {
            let password = password_or_prompt(password, &format!("Password for {login}: "))?;
            auth_user(&login, &password, config, output_format).await
        }
        UserCommand::SetPassword {
            login,
            password,
            scheme,
        } => {
            let password =
                password_or_prompt(password, &format!("New password for {login}: "))?;
            set_password(&login, &password, scheme, config, output_format).await
        }
    }
}

fn not_found(login: &str) -> CliError {
    CliError::NotFound {
        resource_type: "User".to_string(),
        id: login.to_string(),
    }
}

async fn show_user(
    login: &str,
    config: &DirectoryConfig,
    output_format: OutputFormat,
) -> crate::CliResult<()> {
    let client = connect(config).await?;
    let entry = client.find_user(login).await?.ok_or_else(|| not_found(login))?;
    output_entries(&[entry], output_format)
}

async fn auth_user(
    login: &str,
    password: &str,
    config: &DirectoryConfig,
    output_format: OutputFormat,
) -> crate::CliResult<()> {
    let client = connect(config).await?;
    if client.authenticate(login, password).await? {
        if output_format != OutputFormat::Quiet {
            success(&format!("Credentials valid for {login}"));
        }
        Ok(())
    } else {
        error(&format!("Invalid credentials for {login}"));
        Err(CliError::InvalidArgument("authentication failed".to_string()))
    }
}

async fn set_password(
    login: &str,
    password: &str,
    scheme: PasswordScheme,
    config: &DirectoryConfig,
    output_format: OutputFormat,
) -> crate::CliResult<()> {
    let client = connect(config).await?;
    let dn = client
        .get_dn(&config.user_by_login_filter(login))
        .await?
        .ok_or_else(|| not_found(login))?;

    client.set_password(&dn, password, scheme).await?;

    if output_format != OutputFormat::Quiet {
        success(&format!("Password set for {dn} ({scheme})"));
    }
    Ok(())
}
