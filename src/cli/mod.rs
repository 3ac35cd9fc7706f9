//! CLI command handlers

pub mod commands;

pub use commands::{cmd_run, cmd_validate, CliResult};
