//! Cluster node health check (v1)
//!
//! HTTP endpoint polled by load balancers to decide whether a Galera /
//! Percona XtraDB Cluster node may receive traffic.
//!
//! # Architecture Overview
//!
//! ```text
//!                          ┌──────────────────────────────────────────────┐
//!                          │                 CLUSTERCHECK                  │
//!     Load balancer poll   │  ┌─────────┐    ┌──────────────────────────┐ │
//!     ─────────────────────┼─▶│  http   │───▶│      health::check       │ │
//!                          │  │ server  │    │                          │ │
//!                          │  └─────────┘    │  probe: tcp → open → ping│─┼──▶ MySQL / Galera
//!                          │       ▲         │  evaluator: wsrep state  │ │      node
//!     200 synced / 503     │       │         │  + read_only policy      │ │
//!     ◀────────────────────┼───────┘         └──────────────────────────┘ │
//!                          │                                              │
//!                          │  config · resilience · observability ·       │
//!                          │  lifecycle                                   │
//!                          └──────────────────────────────────────────────┘
//! ```

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tokio::net::TcpListener;

use clustercheck::config::{load_config, validation::validate_config, ConfigError};
use clustercheck::http::HttpServer;
use clustercheck::lifecycle::{signals, Shutdown};
use clustercheck::observability::{logging, metrics};
use clustercheck::session::MySqlConnector;

const ENV_HELP: &str = "\
Environment variables:

  MYSQL_ROOT_PASSWORD      password to connect to MySQL
  MYSQL_CHECK_HOST         host to connect, defaults to 127.0.0.1:3306
  AVAILABLE_WHEN_DONNOR    any non-empty value reports donor/desynced nodes as available (default: empty)
  AVAILABLE_WHEN_READONLY  0 reports read-only nodes as available (default: -1, not available)
  RUST_LOG                 log filter, overrides observability.log_level";

#[derive(Parser)]
#[command(name = "clustercheck")]
#[command(about = "Galera / Percona XtraDB Cluster node health check", long_about = None)]
#[command(after_help = ENV_HELP)]
struct Cli {
    /// Optional TOML config file; environment variables override it
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Listen address, overrides listener.bind_address
    #[arg(short, long)]
    listen: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = load_config(cli.config.as_deref())?;
    if let Some(listen) = cli.listen {
        config.listener.bind_address = listen;
        validate_config(&config).map_err(ConfigError::Validation)?;
    }

    logging::init_logging(&config.observability);

    tracing::info!("clustercheck v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address,
        database = %config.database.host,
        available_when_donor = config.policy.available_when_donor,
        available_when_read_only = config.policy.available_when_read_only,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        let addr: SocketAddr = config.observability.metrics_address.parse()?;
        metrics::init_metrics(addr);
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(signals::shutdown_on_signal(shutdown.clone()));

    let server = HttpServer::new(config, Arc::new(MySqlConnector::new()));
    server.run(listener, server_shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
