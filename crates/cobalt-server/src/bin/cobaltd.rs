//! Cobalt Server Daemon
//!
//! The `cobaltd` binary is the main Cobalt server process that:
//! - Loads the engine state from the data file
//! - Serves client sessions over TCP
//! - Stops on `stop`/`quit`/`exit` typed on stdin or on Ctrl+C, then saves
//!
//! # Usage
//!
//! ```bash
//! # Start server with default settings
//! cobaltd
//!
//! # Start with a custom data file
//! cobaltd --data-file /var/lib/cobalt/dbdata.json
//!
//! # Start on custom port
//! cobaltd --port 7879
//!
//! # Use configuration file
//! cobaltd --config /etc/cobalt/cobaltd.toml
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use cobalt_server::config::ServerConfig;
use cobalt_server::database::Database;
use cobalt_server::server::{console, Server};

/// Cobalt Server Daemon
#[derive(Parser, Debug)]
#[command(
    name = "cobaltd",
    version,
    about = "Cobalt database server",
    long_about = "Cobalt is a small embedded SQL-like database.\n\n\
                  This daemon serves client sessions over TCP and persists \
                  state to a JSON data file on shutdown."
)]
struct Args {
    /// Host address to bind to
    #[arg(short = 'H', long, env = "COBALT_HOST")]
    host: Option<String>,

    /// Port to listen on
    #[arg(short = 'p', long, env = "COBALT_PORT")]
    port: Option<u16>,

    /// JSON data file for persistent storage
    #[arg(short = 'd', long, value_name = "FILE", env = "COBALT_DATA_FILE")]
    data_file: Option<PathBuf>,

    /// Configuration file path
    #[arg(short = 'c', long, value_name = "FILE", env = "COBALT_CONFIG")]
    config: Option<PathBuf>,

    /// Run in memory-only mode (no persistence)
    #[arg(long, env = "COBALT_MEMORY")]
    memory: bool,

    /// Enable verbose logging
    #[arg(short = 'v', long, env = "COBALT_VERBOSE")]
    verbose: bool,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, default_value = "info", env = "COBALT_LOG_LEVEL")]
    log_level: String,

    /// Maximum number of connections
    #[arg(long, env = "COBALT_MAX_CONNECTIONS")]
    max_connections: Option<usize>,

    /// Print configuration and exit
    #[arg(long, env = "COBALT_PRINT_CONFIG")]
    print_config: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    init_logging(&args);

    // Load configuration
    let config = load_config(&args)?;

    // Print config and exit if requested
    if args.print_config {
        println!("{}", config.to_toml()?);
        return Ok(());
    }

    run_server(config).await
}

fn init_logging(args: &Args) {
    let level = if args.verbose {
        "debug"
    } else {
        &args.log_level
    };

    let filter = EnvFilter::try_new(format!("cobaltd={level},cobalt_server={level},cobalt_sql={level}"))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .init();
}

fn load_config(args: &Args) -> Result<ServerConfig> {
    // Start with defaults
    let mut config = if let Some(path) = &args.config {
        ServerConfig::from_file(path)
            .with_context(|| format!("Failed to load config file {}", path.display()))?
    } else {
        ServerConfig::default()
    };

    // Override with command-line arguments
    if let Some(host) = &args.host {
        config.host = host.clone();
    }
    if let Some(port) = args.port {
        config.port = port;
    }
    if let Some(path) = &args.data_file {
        config.data_file = path.clone();
    }
    if args.memory {
        config.memory_mode = true;
    }
    if let Some(max) = args.max_connections {
        config.max_connections = max;
    }

    Ok(config)
}

async fn run_server(config: ServerConfig) -> Result<()> {
    match config.effective_data_file() {
        Some(path) => info!("Data file: {}", path.display()),
        None => info!("Starting in memory-only mode (data will not be persisted)"),
    }

    let db = Arc::new(Database::open(config.database_config()).context("Failed to open database")?);

    let server = Server::bind(Arc::clone(&db), &config)
        .await
        .with_context(|| format!("Failed to bind {}", config.socket_addr()))?;

    info!("Server configuration:");
    info!("  Listen address: {}", server.local_addr()?);
    info!("  Max connections: {}", config.max_connections);
    info!("  Memory mode: {}", config.memory_mode);
    info!("Type 'stop' to shutdown server");

    if let Err(e) = server.serve_with_shutdown(shutdown_signal()).await {
        error!("Server error: {}", e);
        return Err(anyhow::anyhow!("Server error: {}", e));
    }

    info!("Shutting down gracefully...");

    let stats = db.stats();
    if stats.active_sessions > 0 {
        warn!("Closing {} active sessions", stats.active_sessions);
    }
    info!(
        "Served {} sessions, {} statements",
        stats.total_sessions, stats.total_statements
    );

    db.close().context("Failed to save data file")?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Shutdown signal received"),
        _ = terminate => info!("Shutdown signal received"),
        _ = console::stdin_stop() => {},
    }
}
