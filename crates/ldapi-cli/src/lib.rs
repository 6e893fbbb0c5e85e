//! # ldapi-cli
//!
//! Command-line front end for the ldapi directory client.
//!
//! This crate provides:
//! - Search, add, modify and delete against a directory server
//! - Person lookup, password check and password change by login name
//! - `userPassword` hashing and verification ({SHA}, {SSHA}, {MD5})
//! - Offline DN parsing and escaping
//! - A TOML configuration file at `~/.ldapi/ldapi.toml`

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::missing_errors_doc)]

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod output;

pub use cli::Cli;
pub use config::CliConfig;
pub use error::{CliError, CliResult};
