//! memory-bridge: Command-line interface for the memory service MCP adapter

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use memory_bridge::config::{path_resolver, AppConfig};
use memory_bridge::logging::{init_logging, LoggingConfig};
use memory_bridge::mcp::MemoryBridgeServer;
use memory_bridge::redact::scrub_log_text;
use memory_bridge::tools::{self, ToolDispatcher};
use memory_bridge::MemoryClient;
use rmcp::ServiceExt;
use std::path::PathBuf;
use tokio::io::{stdin, stdout};

// ============================================================================
// CLI Definition
// ============================================================================

/// memory-bridge: MCP server for persistent agent memory
#[derive(Parser)]
#[command(name = "memory-bridge")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to the config file (default: $XDG_CONFIG_HOME/memory-bridge/config.toml)
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// Memory service base URL (overrides env and config file)
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// Agent identifier attached to stored memories
    #[arg(long, global = true)]
    agent_id: Option<String>,

    /// Per-request timeout in milliseconds
    #[arg(long, global = true)]
    timeout_ms: Option<u64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the MCP server on stdio
    Serve,
    /// Write a default configuration file
    Init {
        /// Force overwrite existing configuration
        #[arg(short, long)]
        force: bool,
    },
    /// Check memory service health
    Health,
    /// List the available tools
    Tools,
    /// Call a single tool (for testing)
    Call {
        /// Tool name, e.g. memory_search
        tool: String,

        /// Tool arguments as a JSON object
        #[arg(short, long, default_value = "{}")]
        args: String,
    },
}

// ============================================================================
// Helpers
// ============================================================================

fn config_path(explicit: Option<&str>) -> Result<PathBuf> {
    match explicit {
        Some(path) => Ok(path_resolver::resolve_path(path)?),
        None => Ok(path_resolver::get_default_config_path()),
    }
}

/// Load configuration: environment overrides the config file, which
/// overrides defaults. An explicitly named config file must exist.
fn load_config(explicit: Option<&str>) -> Result<AppConfig> {
    let path = config_path(explicit)?;
    let env_config = AppConfig::from_env()?;

    if explicit.is_none() && !path.exists() {
        return Ok(env_config);
    }

    let file_config = AppConfig::from_file(&path)?;
    Ok(file_config.merge_with(&env_config))
}

/// Apply command-line flags on top of the loaded configuration
fn apply_cli_overrides(mut config: AppConfig, cli: &Cli) -> AppConfig {
    if let Some(url) = &cli.base_url {
        config = config.with_base_url(url);
    }
    if let Some(agent_id) = &cli.agent_id {
        config = config.with_agent_id(agent_id);
    }
    if let Some(timeout_ms) = cli.timeout_ms {
        config = config.with_timeout_ms(timeout_ms);
    }
    config
}

fn build_client(config: &AppConfig) -> Result<MemoryClient> {
    let client_config = config.client_config()?;
    Ok(MemoryClient::new(client_config)?)
}

fn init_config(explicit: Option<&str>, force: bool) -> Result<()> {
    let config_path = config_path(explicit)?;

    eprintln!("Initializing memory-bridge configuration...");

    if let Some(dir) = config_path.parent() {
        if !dir.exists() {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create {}", dir.display()))?;
            eprintln!("Created config directory: {}", dir.display());
        }
    }

    if config_path.exists() && !force {
        eprintln!("Configuration file already exists: {}", config_path.display());
        eprintln!("Use --force to overwrite");
        return Ok(());
    }

    let toml_content = AppConfig::default().to_toml()?;
    std::fs::write(&config_path, &toml_content)
        .with_context(|| format!("Failed to write {}", config_path.display()))?;

    eprintln!("Created configuration file: {}", config_path.display());
    eprintln!("Set MEMORY_API_KEY in the environment or add api_key to the file.");
    Ok(())
}

async fn serve(config: &AppConfig) -> Result<()> {
    let client = build_client(config)?;
    tracing::info!(
        base_url = client.config().base_url(),
        agent_id = client.config().agent_id(),
        "Starting MCP server on stdio"
    );

    let server = MemoryBridgeServer::new(ToolDispatcher::new(client));
    let transport = (stdin(), stdout());
    let service = server
        .serve(transport)
        .await
        .context("Failed to start MCP stdio transport")?;

    let quit_reason = service
        .waiting()
        .await
        .context("MCP server terminated unexpectedly")?;
    tracing::info!("MCP server stopped: {:?}", quit_reason);
    Ok(())
}

async fn run(cli: Cli) -> Result<()> {
    if let Commands::Init { force } = cli.command {
        return init_config(cli.config.as_deref(), force);
    }

    let config = apply_cli_overrides(load_config(cli.config.as_deref())?, &cli);
    init_logging(&LoggingConfig {
        level: config.log_level(),
        verbose: cli.verbose,
        redactor: config.redactor(),
    });
    tracing::debug!("Loaded configuration: {:?}", config);

    match cli.command {
        Commands::Serve => serve(&config).await,
        Commands::Health => {
            let client = build_client(&config)?;
            let status = client.health_check().await;
            println!("{}", serde_json::to_string_pretty(&status)?);
            if status.is_healthy() {
                Ok(())
            } else {
                Err(anyhow!("Memory service is unhealthy"))
            }
        }
        Commands::Tools => {
            println!("{}", serde_json::to_string_pretty(&tools::catalog())?);
            Ok(())
        }
        Commands::Call { tool, args } => {
            let args: serde_json::Value =
                serde_json::from_str(&args).context("--args must be a JSON object")?;
            let dispatcher = ToolDispatcher::new(build_client(&config)?);
            let outcome = dispatcher.dispatch(&tool, args).await;
            println!("{}", outcome.to_text());
            if outcome.is_error() {
                Err(anyhow!("Tool call '{}' failed", tool))
            } else {
                Ok(())
            }
        }
        Commands::Init { .. } => Ok(()),
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        eprintln!("Error: {}", scrub_log_text(&format!("{:#}", e)));
        std::process::exit(1);
    }
}
