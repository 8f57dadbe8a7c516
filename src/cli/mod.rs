//! CLI module
//!
//! Command-line interface over a configured connector.
//!
//! # Commands
//!
//! - `validate` - Check the configuration and model definitions
//! - `models` - List registered models
//! - `fields` - Show the field declarations of a model
//! - `list` - Fetch objects page by page
//! - `load` - Fetch one object
//! - `delete` - Delete one object
//! - `ping` - Reach the API endpoint

mod commands;
mod runner;

pub use commands::{Cli, Commands, OutputFormat};
pub use runner::Runner;
