//! CLI command definitions using clap.
//!
//! Defines the main CLI structure and subcommands:
//! - serve: run the JSON-RPC host on stdin/stdout (default)
//! - tools: print the advertised tool descriptors
//! - catalog: list catalog entries
//! - call: run one tool call and print its content

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// kqlgate - tool gateway for catalog-driven KQL queries
#[derive(Parser, Debug)]
#[command(name = "kqlgate")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Optional config file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Catalog file, overriding the configured path
    #[arg(long, global = true)]
    pub catalog: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

impl Cli {
    /// Check if verbose mode is enabled
    pub fn is_verbose(&self) -> bool {
        self.verbose
    }
}

/// Main subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Serve tool calls over stdio
    Serve,

    /// List the advertised tools
    Tools {
        /// Print descriptors as JSON
        #[arg(long)]
        json: bool,
    },

    /// List catalog entries
    Catalog {
        /// Only entries of this type (schema, query)
        #[arg(short = 't', long)]
        entry_type: Option<String>,
    },

    /// Run a single tool call
    Call {
        /// Tool name (fetch, schema, querykql, math)
        tool: String,

        /// Arguments as a JSON object
        #[arg(short, long, default_value = "{}")]
        args: String,

        /// Print rendered queries instead of executing them
        #[arg(long)]
        dry_run: bool,
    },
}
