//! secure-headers
//!
//! Serves a small Axum app behind the security headers middleware, or prints
//! the headers a configuration produces.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request           ┌──────────────────────────────────────────────┐
//!     ─────────────────────────┼─▶ request id ─▶ trace ─▶ timeout ─┐          │
//!                              │                                   ▼          │
//!                              │                        secure headers        │
//!                              │                        (build values)        │
//!                              │                                   │          │
//!                              │                                   ▼          │
//!     Client Response          │                               handler        │
//!     ◀────────────────────────┼── append headers ◀────────────────┘          │
//!                              │                                              │
//!                              │  config file ─▶ watcher ─▶ ArcSwap snapshot  │
//!                              └──────────────────────────────────────────────┘
//! ```

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use serde_json::json;
use tokio::net::TcpListener;

use secure_headers::config::loader::load_config;
use secure_headers::config::watcher::ConfigWatcher;
use secure_headers::observability::{logging, metrics};
use secure_headers::{AppConfig, HeaderInjector, HttpServer, SecureHeadersConfig};

#[derive(Parser)]
#[command(name = "secure-headers")]
#[command(about = "Security response headers for HTTP services", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the demo app with security headers applied
    Serve {
        /// TOML configuration file; watched for changes
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Override server.bind_address
        #[arg(short, long)]
        bind: Option<String>,
    },
    /// Print the headers a configuration produces, as JSON
    Print {
        /// TOML configuration file; the recommended set is used when omitted
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

fn load_or_recommended(path: Option<&Path>) -> Result<AppConfig, Box<dyn std::error::Error>> {
    match path {
        Some(path) => Ok(load_config(path)?),
        None => Ok(AppConfig {
            headers: SecureHeadersConfig::recommended(),
            ..Default::default()
        }),
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Serve { config, bind } => serve(config, bind).await,
        Commands::Print { config } => print(config.as_deref()),
    }
}

async fn serve(path: Option<PathBuf>, bind: Option<String>) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = load_or_recommended(path.as_deref())?;
    if let Some(bind) = bind {
        config.server.bind_address = bind;
    }

    logging::init_logging(&config.observability.log_level)?;
    tracing::info!("secure-headers v{} starting", env!("CARGO_PKG_VERSION"));

    tracing::info!(
        bind_address = %config.server.bind_address,
        request_timeout_secs = config.server.request_timeout_secs,
        hsts = config.headers.use_hsts,
        csp = config.headers.use_content_security_policy,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr)?,
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let listener = TcpListener::bind(&config.server.bind_address).await?;
    let server = HttpServer::new(config);

    // Keep the watcher alive for the lifetime of the server.
    let _watcher = match path {
        Some(path) => {
            let (watcher, updates) = ConfigWatcher::new(&path);
            server.spawn_reloader(updates);
            Some(watcher.run()?)
        }
        None => None,
    };

    server.run(listener).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}

fn print(path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_or_recommended(path)?;
    let headers = HeaderInjector::new(config.headers).describe()?;

    let entries: Vec<_> = headers
        .into_iter()
        .map(|(name, value)| json!({ "header": name, "value": value }))
        .collect();
    println!("{}", serde_json::to_string_pretty(&entries)?);
    Ok(())
}
