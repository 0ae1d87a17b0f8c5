//! Startup orchestration.
//!
//! # Responsibilities
//! - Validate configuration
//! - Build the backend pool and dispatcher
//! - Populate liveness before traffic arrives (background mode)
//! - Bind the listener
//!
//! Any error here is fatal; there is no partial startup.

use std::sync::Arc;
use std::time::Duration;

use tokio::net::TcpListener;

use crate::config::loader::join_errors;
use crate::config::{validate_config, HealthMode, ProxyConfig, ValidationError};
use crate::health::HealthMonitor;
use crate::http::{build_client, HttpServer};
use crate::load_balancer::{BuildError, Dispatcher};

/// Fatal startup failure.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error("invalid configuration: {}", join_errors(.0))]
    Config(Vec<ValidationError>),

    #[error(transparent)]
    Build(#[from] BuildError),

    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },
}

/// A server ready to run and the listener it will accept on.
pub struct Bootstrapped {
    pub server: HttpServer,
    pub listener: TcpListener,
}

/// Build everything from `config` and bind the listener.
pub async fn bootstrap(config: ProxyConfig) -> Result<Bootstrapped, StartupError> {
    validate_config(&config).map_err(StartupError::Config)?;

    let client = build_client(&config.timeouts);
    let dispatcher = Arc::new(Dispatcher::from_config(&config, client)?);

    tracing::info!(
        backends = dispatcher.backends().len(),
        mode = ?config.health_check.mode,
        "Backend pool ready"
    );

    if config.health_check.mode == HealthMode::Background {
        let monitor = HealthMonitor::new(
            dispatcher.backends().to_vec(),
            Duration::from_secs(config.health_check.interval_secs),
        );
        let alive = monitor.check_all().await;
        tracing::info!(alive, total = dispatcher.backends().len(), "Initial health sweep complete");
    }

    let addr = config
        .listener
        .socket_addr()
        .map_err(|e| StartupError::Bind {
            addr: format!("{}:{}", config.listener.host, config.listener.port),
            source: std::io::Error::new(std::io::ErrorKind::InvalidInput, e),
        })?;
    let listener = TcpListener::bind(addr).await.map_err(|source| StartupError::Bind {
        addr: addr.to_string(),
        source,
    })?;

    Ok(Bootstrapped {
        server: HttpServer::new(dispatcher, config.health_check),
        listener,
    })
}
