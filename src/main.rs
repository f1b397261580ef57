use clap::Parser;
use colored::*;
use eyre::{Context, Result, eyre};
use log::info;
use serde_json::{Map, Value};
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

mod cli;

use cli::Cli;
use cli::commands::Commands;
use kqlgate::catalog::{Catalog, EntryType};
use kqlgate::config::Config;
use kqlgate::kql::DryRunBackend;
use kqlgate::mcp::McpServer;
use kqlgate::tools::{ToolDispatcher, advertised};

fn setup_logging(config: &Config) -> Result<()> {
    // Create log directory
    let log_dir = dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("kqlgate")
        .join("logs");

    fs::create_dir_all(&log_dir).context("Failed to create log directory")?;

    let log_file = log_dir.join("kqlgate.log");

    // stdout carries the protocol, so logs only go to the file
    let target = Box::new(
        fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_file)
            .context("Failed to open log file")?,
    );

    let mut builder = env_logger::Builder::new();
    match std::env::var("RUST_LOG") {
        Ok(filters) => builder.parse_filters(&filters),
        Err(_) => builder.parse_filters(config.log_level.as_deref().unwrap_or("info")),
    };
    builder.target(env_logger::Target::Pipe(target)).init();

    info!("Logging initialized, writing to: {}", log_file.display());
    Ok(())
}

async fn run_application(cli: &Cli, config: &Config) -> Result<()> {
    info!("Starting application");

    if cli.is_verbose() {
        eprintln!("{}", "Verbose mode enabled".yellow());
    }

    match &cli.command {
        None | Some(Commands::Serve) => run_server(cli, config).await,
        Some(Commands::Tools { json }) => handle_tools_command(*json),
        Some(Commands::Catalog { entry_type }) => handle_catalog_command(entry_type.as_deref(), config),
        Some(Commands::Call { tool, args, dry_run }) => handle_call_command(tool, args, *dry_run, config).await,
    }
}

async fn run_server(cli: &Cli, config: &Config) -> Result<()> {
    info!("Serving on stdio, catalog: {}", config.catalog.path.display());
    if cli.is_verbose() {
        eprintln!("{} {}", "Catalog:".cyan(), config.catalog.path.display());
    }

    let dispatcher = ToolDispatcher::from_config(config).await.context("Failed to initialize tools")?;
    let server = Arc::new(McpServer::new(Arc::new(dispatcher)));
    server.serve_stdio().await.context("Server failed")?;

    info!("Server stopped");
    Ok(())
}

fn handle_tools_command(json: bool) -> Result<()> {
    let tools = advertised();
    if json {
        println!("{}", serde_json::to_string_pretty(&tools)?);
        return Ok(());
    }

    for tool in &tools {
        println!("{} - {}", tool.name.green().bold(), tool.description);
        println!("  {} {}", "required:".dimmed(), tool.required().join(", "));
    }
    Ok(())
}

fn handle_catalog_command(entry_type: Option<&str>, config: &Config) -> Result<()> {
    info!("Listing catalog: {} (type: {:?})", config.catalog.path.display(), entry_type);

    let filter = entry_type
        .map(|t| EntryType::from_str(t).ok_or_else(|| eyre!("Unknown entry type: {}", t)))
        .transpose()?;

    let catalog = Catalog::from_file(&config.catalog.path)
        .context(format!("Failed to load catalog from {}", config.catalog.path.display()))?;

    let entries = match filter {
        Some(t) => catalog.by_type(t),
        None => catalog.entries().iter().collect(),
    };

    for entry in entries {
        let label = match entry.entry_type() {
            EntryType::Schema => entry.entry_type().as_str().cyan(),
            EntryType::Query => entry.entry_type().as_str().magenta(),
        };
        println!(
            "{:<8} {} ({}/{})",
            label,
            entry.key.bold(),
            entry.cluster(),
            entry.database()
        );
        println!("         {}", entry.command());
        if entry.as_schema().is_some_and(|s| s.cached_schema.is_some()) {
            println!("         {}", "cached schema".dimmed());
        }
        if !entry.description().is_empty() {
            println!("         {}", entry.description().dimmed());
        }
    }

    for (t, key) in catalog.shadowed() {
        println!("{} {} '{}' is shadowed by an earlier entry", "warning:".yellow(), t, key);
    }
    Ok(())
}

async fn handle_call_command(tool: &str, args: &str, dry_run: bool, config: &Config) -> Result<()> {
    info!("Calling tool: {} (dry run: {})", tool, dry_run);

    let arguments: Map<String, Value> = match serde_json::from_str(args).context("Failed to parse --args")? {
        Value::Object(map) => map,
        other => return Err(eyre!("--args must be a JSON object, got {}", other)),
    };

    let mut dispatcher = ToolDispatcher::from_config(config).await.context("Failed to initialize tools")?;
    if dry_run {
        dispatcher = dispatcher.with_backend(Arc::new(DryRunBackend));
    }

    match dispatcher.dispatch(tool, &arguments).await {
        Ok(content) => {
            for block in &content {
                println!("{}", block.as_text());
            }
            Ok(())
        }
        Err(e) => {
            eprintln!("{} {}", "Error:".red(), e);
            Err(e).context(format!("Tool '{}' failed", tool))
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Load configuration
    let mut config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;
    if let Some(path) = &cli.catalog {
        config.catalog.path = path.clone();
    }

    setup_logging(&config).context("Failed to setup logging")?;

    info!("Starting with config from: {:?}", cli.config);

    // Run the main application logic
    run_application(&cli, &config).await.context("Application failed")?;

    Ok(())
}
