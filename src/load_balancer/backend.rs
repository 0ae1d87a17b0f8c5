//! Backend abstraction.
//!
//! # Responsibilities
//! - Represent a single upstream server
//! - Answer liveness queries (probing or cached, per `HealthMode`)
//! - Serialise concurrent probes of the same backend
//! - Forward requests through the reverse proxy

use std::fmt;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, Response, Uri};
use futures_util::future::{self, BoxFuture, FutureExt};
use tokio::sync::Mutex;
use url::Url;

use crate::config::{HealthCheckConfig, HealthMode};
use crate::config::validation::check_http_url;
use crate::health::probe::HealthProbe;
use crate::health::state::{HealthCell, HealthState};
use crate::http::client::HttpClient;
use crate::http::proxy::ReverseProxy;

/// An upstream that can be probed and can serve requests.
///
/// Futures are boxed so the pool can hold `Arc<dyn Backend>`.
pub trait Backend: Send + Sync + fmt::Debug {
    /// Forwarding destination, as configured.
    fn address(&self) -> &str;

    /// Whether this backend may receive the next request.
    fn is_alive(&self) -> BoxFuture<'_, bool>;

    /// Probe now and refresh the cached state.
    fn check(&self) -> BoxFuture<'_, bool>;

    /// Last observed state, without I/O.
    fn health(&self) -> HealthState;

    /// Forward the request and produce the response for the original caller.
    fn serve(&self, request: Request<Body>) -> BoxFuture<'_, Response<Body>>;
}

/// Error building a backend from configuration.
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    #[error("invalid backend address {address:?}: {reason}")]
    InvalidAddress { address: String, reason: String },

    #[error("invalid health check target {target:?}: {reason}")]
    InvalidHealthCheck { target: String, reason: String },
}

/// A single backend server reached through a reverse proxy.
pub struct SimpleBackend {
    address: String,
    health_check: Uri,
    proxy: ReverseProxy,
    probe: HealthProbe,
    mode: HealthMode,
    state: HealthCell,
    /// Held for the duration of a probe.
    probe_lock: Mutex<()>,
}

impl SimpleBackend {
    /// Create a new backend. Both URLs must be absolute http(s) URLs.
    pub fn new(
        address: &str,
        health_check: &str,
        client: HttpClient,
        config: &HealthCheckConfig,
    ) -> Result<Self, BackendError> {
        let target: Url = check_http_url(address).map_err(|reason| BackendError::InvalidAddress {
            address: address.to_string(),
            reason,
        })?;

        let health_check: Uri = check_http_url(health_check)
            .and_then(|url| url.as_str().parse::<Uri>().map_err(|e| e.to_string()))
            .map_err(|reason| BackendError::InvalidHealthCheck {
                target: health_check.to_string(),
                reason,
            })?;

        Ok(Self {
            address: address.to_string(),
            health_check,
            proxy: ReverseProxy::new(target, client.clone()),
            probe: HealthProbe::new(client, Duration::from_secs(config.timeout_secs)),
            mode: config.mode,
            state: HealthCell::new(),
            probe_lock: Mutex::new(()),
        })
    }

    pub fn health_check(&self) -> &Uri {
        &self.health_check
    }

    pub fn target(&self) -> &Url {
        self.proxy.target()
    }

    async fn run_check(&self) -> bool {
        let _guard = self.probe_lock.lock().await;
        let alive = self.probe.probe(&self.health_check).await;
        self.state.set(alive);
        alive
    }
}

impl fmt::Debug for SimpleBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SimpleBackend")
            .field("address", &self.address)
            .field("health_check", &self.health_check)
            .field("mode", &self.mode)
            .field("state", &self.state.get())
            .finish()
    }
}

impl Backend for SimpleBackend {
    fn address(&self) -> &str {
        &self.address
    }

    fn is_alive(&self) -> BoxFuture<'_, bool> {
        match self.mode {
            HealthMode::Inline => self.run_check().boxed(),
            HealthMode::Background => future::ready(self.state.get().is_routable()).boxed(),
        }
    }

    fn check(&self) -> BoxFuture<'_, bool> {
        self.run_check().boxed()
    }

    fn health(&self) -> HealthState {
        self.state.get()
    }

    fn serve(&self, request: Request<Body>) -> BoxFuture<'_, Response<Body>> {
        self.proxy.forward(request).boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TimeoutConfig;
    use crate::http::client::build_client;

    fn build(address: &str, health_check: &str, mode: HealthMode) -> Result<SimpleBackend, BackendError> {
        let config = HealthCheckConfig {
            mode,
            timeout_secs: 1,
            ..HealthCheckConfig::default()
        };
        SimpleBackend::new(address, health_check, build_client(&TimeoutConfig::default()), &config)
    }

    #[tokio::test]
    async fn test_new_keeps_address_verbatim() {
        let backend = build("http://127.0.0.1:9001", "http://127.0.0.1:9001/health", HealthMode::Inline).unwrap();
        assert_eq!(backend.address(), "http://127.0.0.1:9001");
        assert_eq!(backend.health_check().path(), "/health");
        assert_eq!(backend.health(), HealthState::Unknown);
    }

    #[tokio::test]
    async fn test_new_rejects_unparseable_address() {
        let err = build("::not-a-url", "http://127.0.0.1:9001/health", HealthMode::Inline).unwrap_err();
        assert!(matches!(err, BackendError::InvalidAddress { .. }));

        let err = build("http://127.0.0.1:9001", "health", HealthMode::Inline).unwrap_err();
        assert!(matches!(err, BackendError::InvalidHealthCheck { .. }));
    }

    #[tokio::test]
    async fn test_background_mode_reads_cache_without_probing() {
        // Nothing listens on port 1; a probe would record Down.
        let backend = build("http://127.0.0.1:1", "http://127.0.0.1:1/health", HealthMode::Background).unwrap();
        assert!(!backend.is_alive().await);
        assert_eq!(backend.health(), HealthState::Unknown);

        backend.state.set(true);
        assert!(backend.is_alive().await);
    }

    #[tokio::test]
    async fn test_inline_mode_probes_and_records() {
        let backend = build("http://127.0.0.1:1", "http://127.0.0.1:1/health", HealthMode::Inline).unwrap();
        assert!(!backend.is_alive().await);
        assert_eq!(backend.health(), HealthState::Down);
    }
}
