//! Round-robin HTTP load balancer.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request
//!     ──────────────▶ http::server (catch-all route)
//!                          │
//!                          ▼
//!                   load_balancer::dispatcher ──── round_robin cursor
//!                          │  is_alive? in rotation order
//!                          ▼
//!                   load_balancer::backend ◀──── health (inline probe or cached flag)
//!                          │
//!                          ▼
//!                   http::proxy ─────────────────▶ Backend Server
//!     Client Response ◀────┘
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use roundrobin_lb::config::{self, ProxyConfig};
use roundrobin_lb::lifecycle::bootstrap;
use roundrobin_lb::observability::{logging, metrics};

#[derive(Parser)]
#[command(name = "roundrobin-lb")]
#[command(about = "Round-robin HTTP load balancer", long_about = None)]
struct Cli {
    /// TOML configuration file; built-in defaults are used when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the listening port.
    #[arg(short, long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => match config::load_config(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Error: {}: {}", path.display(), e);
                return ExitCode::FAILURE;
            }
        },
        None => ProxyConfig::default(),
    };
    if let Some(port) = cli.port {
        config.listener.port = port;
    }

    logging::init(&config.observability);
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "roundrobin-lb starting");

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let ready = match bootstrap(config).await {
        Ok(ready) => ready,
        Err(e) => {
            tracing::error!(error = %e, "Startup failed");
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = ready.server.run(ready.listener).await {
        tracing::error!(error = %e, "Server error");
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}
