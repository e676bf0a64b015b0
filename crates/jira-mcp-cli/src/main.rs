//! jira-mcp - MCP server exposing Jira to AI assistants.

use std::io::IsTerminal;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use jira_mcp_client::JiraClient;
use jira_mcp_core::config::FileConfig;
use jira_mcp_core::{Config, TransportMode};
use jira_mcp_server::{serve_sse, serve_stdio, tools, RequestHandler};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "jira-mcp")]
#[command(author, version, about = "MCP server for Jira issues", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to the config file (default: <config dir>/jira-mcp/config.toml)
    #[arg(long = "config", global = true, value_name = "PATH")]
    config_path: Option<PathBuf>,

    /// Transport to serve on (overrides MCP_TRANSPORT)
    #[arg(long, global = true, value_name = "stdio|sse")]
    transport: Option<TransportMode>,

    /// Port for the SSE transport (overrides PORT)
    #[arg(short, long, global = true)]
    port: Option<u16>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug, PartialEq)]
enum Commands {
    /// Start the MCP server (default)
    Serve,

    /// Print the tool and resource registry as JSON
    Tools,

    /// Inspect configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Subcommand, Debug, PartialEq)]
enum ConfigCommands {
    /// Show the resolved configuration (API token masked)
    Show,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let code = match run(cli).await {
        Ok(()) => 0,
        Err(e) => {
            tracing::error!(error = %e, "jira-mcp failed");
            eprintln!("Error: {:#}", e);
            1
        }
    };

    // Exit explicitly: a blocked stdin read must not keep the runtime alive.
    std::process::exit(code);
}

/// Logs always go to stderr; stdout belongs to the stdio transport.
fn init_logging(verbose: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new("debug")
        } else {
            EnvFilter::new("info")
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .init();
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        None | Some(Commands::Serve) => {
            let config = Config::load(cli.config_path.as_deref())?;
            serve(config, cli.transport, cli.port).await
        }
        Some(Commands::Tools) => print_registry(),
        Some(Commands::Config {
            command: ConfigCommands::Show,
        }) => {
            let config = Config::load(cli.config_path.as_deref())?;
            show_config(&config, cli.config_path, cli.transport, cli.port);
            Ok(())
        }
    }
}

async fn serve(
    config: Config,
    transport: Option<TransportMode>,
    port: Option<u16>,
) -> anyhow::Result<()> {
    let port = port.or(config.port);
    let mode = TransportMode::select(
        transport.or(config.transport),
        std::io::stdin().is_terminal(),
        port.is_some(),
    );

    let client = JiraClient::from_settings(&config.jira)?;
    tracing::info!(
        jira = %config.jira.base_url,
        transport = %mode,
        "Starting jira-mcp"
    );

    let handler = Arc::new(RequestHandler::new(Arc::new(client)));

    match mode {
        TransportMode::Stdio => serve_stdio(handler).await?,
        TransportMode::Sse => {
            let port = port.unwrap_or(jira_mcp_core::config::DEFAULT_PORT);
            serve_sse(handler, port).await?
        }
    }

    Ok(())
}

fn print_registry() -> anyhow::Result<()> {
    let registry = serde_json::json!({
        "tools": tools::tool_definitions(),
        "resources": tools::resource_definitions(),
        "resourceTemplates": tools::resource_templates(),
    });
    let text = serde_json::to_string_pretty(&registry).context("Failed to render registry")?;
    println!("{}", text);
    Ok(())
}

fn show_config(
    config: &Config,
    path: Option<PathBuf>,
    transport: Option<TransportMode>,
    port: Option<u16>,
) {
    let path = path.or_else(|| FileConfig::config_path().ok());
    let port = port.or(config.port);
    let transport = transport.or(config.transport);

    println!("Configuration:");
    match path {
        Some(path) => println!("  File:      {}", path.display()),
        None => println!("  File:      (none)"),
    }
    println!("  Jira URL:  {}", config.jira.base_url);
    println!("  Email:     {}", config.jira.email);
    println!("  API token: ***");
    match port {
        Some(port) => println!("  Port:      {}", port),
        None => println!(
            "  Port:      {} (default)",
            jira_mcp_core::config::DEFAULT_PORT
        ),
    }
    match transport {
        Some(mode) => println!("  Transport: {}", mode),
        None => println!("  Transport: auto"),
    }
}
