//! Output formatting utilities.

use colored::Colorize;
use ldapi_client::DirectoryEntry;
use serde::Serialize;
use tabled::{settings::Style, Table, Tabled};

use crate::config::OutputFormat;

/// Prints a success message.
pub fn success(message: &str) {
    println!("{} {}", "✓".green().bold(), message);
}

/// Prints an error message.
pub fn error(message: &str) {
    eprintln!("{} {}", "✗".red().bold(), message);
}

/// Prints a warning message.
pub fn warning(message: &str) {
    eprintln!("{} {}", "⚠".yellow().bold(), message);
}

/// Prints an info message.
pub fn info(message: &str) {
    println!("{} {}", "ℹ".blue().bold(), message);
}

/// One attribute of an entry, as a table row.
#[derive(Debug, Clone, Serialize, Tabled)]
pub struct AttributeRow {
    /// Entry DN.
    #[tabled(rename = "DN")]
    pub dn: String,
    /// Attribute name.
    #[tabled(rename = "Attribute")]
    pub attribute: String,
    /// Values, one per line.
    #[tabled(rename = "Values")]
    pub values: String,
}

/// Flattens entries into rows, attributes sorted by name.
#[must_use]
pub fn attribute_rows(entries: &[DirectoryEntry]) -> Vec<AttributeRow> {
    let mut rows = Vec::new();
    for entry in entries {
        let mut names: Vec<&String> = entry.attributes.keys().collect();
        names.sort_unstable_by_key(|n| n.to_ascii_lowercase());
        if names.is_empty() {
            rows.push(AttributeRow {
                dn: entry.dn.clone(),
                attribute: String::new(),
                values: String::new(),
            });
        }
        for name in names {
            rows.push(AttributeRow {
                dn: entry.dn.clone(),
                attribute: name.clone(),
                values: entry.attributes[name].join("\n"),
            });
        }
        let mut binary: Vec<&String> = entry.binary_attributes.keys().collect();
        binary.sort_unstable();
        for name in binary {
            let sizes: Vec<String> = entry.binary_attributes[name]
                .iter()
                .map(|v| format!("<{} bytes>", v.len()))
                .collect();
            rows.push(AttributeRow {
                dn: entry.dn.clone(),
                attribute: name.clone(),
                values: sizes.join("\n"),
            });
        }
    }
    rows
}

/// Outputs search results in the specified format.
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn output_entries(entries: &[DirectoryEntry], format: OutputFormat) -> crate::CliResult<()> {
    match format {
        OutputFormat::Table => {
            if entries.is_empty() {
                info("No entries found.");
            } else {
                let table = Table::new(attribute_rows(entries))
                    .with(Style::rounded())
                    .to_string();
                println!("{table}");
                info(&format!("{} entries", entries.len()));
            }
        }
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(entries)?;
            println!("{json}");
        }
        OutputFormat::Quiet => {
            for entry in entries {
                println!("{}", entry.dn);
            }
        }
    }
    Ok(())
}

/// Outputs a single item.
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn output_single<T: Serialize>(item: &T, format: OutputFormat) -> crate::CliResult<()> {
    match format {
        OutputFormat::Table => {
            let json = serde_json::to_value(item)?;
            print_value(&json, 0);
        }
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(item)?;
            println!("{json}");
        }
        OutputFormat::Quiet => {}
    }
    Ok(())
}

/// Prints a JSON value as indented `key: value` lines.
fn print_value(value: &serde_json::Value, indent: usize) {
    let prefix = "  ".repeat(indent);

    match value {
        serde_json::Value::Array(arr) => {
            for item in arr {
                print!("{prefix}- ");
                print_value(item, indent + 1);
            }
        }
        serde_json::Value::Object(map) => {
            for (key, val) in map {
                if val.is_object() || val.is_array() {
                    println!("{prefix}{key}:");
                    print_value(val, indent + 1);
                } else {
                    println!("{prefix}{key}: {}", scalar(val));
                }
            }
        }
        scalar_value => println!("{}", scalar(scalar_value)),
    }
}

fn scalar(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Prompts for confirmation.
///
/// # Errors
///
/// Returns an error if stdin cannot be read.
pub fn confirm(message: &str) -> crate::CliResult<bool> {
    print!("{message} [y/N]: ");
    std::io::Write::flush(&mut std::io::stdout())?;

    let mut input = String::new();
    std::io::stdin().read_line(&mut input)?;

    Ok(input.trim().eq_ignore_ascii_case("y") || input.trim().eq_ignore_ascii_case("yes"))
}

/// Prompts for password input (hidden).
///
/// # Errors
///
/// Returns an error if the terminal cannot be read.
pub fn prompt_password(prompt: &str) -> crate::CliResult<String> {
    Ok(rpassword::prompt_password(prompt)?)
}

/// Uses `given` or prompts for a password.
///
/// # Errors
///
/// Returns an error if the terminal cannot be read.
pub fn password_or_prompt(given: Option<String>, prompt: &str) -> crate::CliResult<String> {
    match given {
        Some(password) => Ok(password),
        None => prompt_password(prompt),
    }
}
