//! CLI module
//!
//! Command-line interface over the client.
//!
//! # Commands
//!
//! - `stream` - Stream entities of one kind as JSON lines
//! - `get` - Fetch one API path
//! - `config` - Show the effective configuration

mod commands;
mod runner;

pub use commands::{Cli, Commands, OutputFormat};
pub use runner::Runner;
