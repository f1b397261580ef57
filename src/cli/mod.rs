//! CLI module for kqlgate - command-line interface and subcommands.
//!
//! Serves the stdio protocol by default; the other subcommands inspect the
//! tool list and catalog or run one tool call from the shell.

pub mod commands;

pub use commands::Cli;
