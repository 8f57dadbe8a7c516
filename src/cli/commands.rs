//! CLI commands and argument parsing

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Metadata-driven REST/JSON and JSON-HAL connector
#[derive(Parser, Debug)]
#[command(name = "openapi-connector")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Connector configuration file (YAML or JSON)
    #[arg(short, long, global = true, default_value = "connector.yaml")]
    pub config: PathBuf,

    /// Additional model definitions file (YAML)
    #[arg(short, long, global = true)]
    pub models: Option<PathBuf>,

    /// Output format
    #[arg(short, long, global = true, default_value = "json")]
    pub format: OutputFormat,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Validate configuration and model definitions
    Validate,

    /// List registered models
    Models,

    /// Show the field declarations of a model
    Fields {
        model: String,
    },

    /// Fetch objects of a model
    List {
        model: String,

        /// Filter string sent with each page
        #[arg(long)]
        filter: Option<String>,

        /// Items requested per page
        #[arg(long, default_value = "50")]
        page_size: usize,

        /// Maximum number of items
        #[arg(long, default_value = "1000")]
        max: usize,
    },

    /// Fetch one object
    Load {
        model: String,
        id: String,
    },

    /// Delete one object
    Delete {
        model: String,
        id: String,
    },

    /// Reach the API endpoint
    Ping,
}

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// One JSON document per line
    Json,
    /// Indented JSON
    Pretty,
}
