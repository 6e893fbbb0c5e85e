//! End-to-End Integration Tests
//!
//! These tests run the client against an ephemeral OpenLDAP server
//! started with testcontainers. They need Docker and are ignored by
//! default: `cargo test -p ldapi-integration-tests -- --ignored`.

mod common;
mod operations;
mod registry;
