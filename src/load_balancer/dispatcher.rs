//! Request dispatcher.
//!
//! # Responsibilities
//! - Own the fixed, ordered backend pool and the rotation cursor
//! - Select the next live backend in round-robin order
//! - Hand the request to the selected backend
//!
//! # Selection
//! ```text
//! start = cursor++            (atomic)
//! for i in 0..len:
//!     b = backends[(start + i) % len]
//!     if b.is_alive(): cursor += i; return b
//! no live backend in this sweep → back off, sweep again (≤ max_rounds)
//! ```

use std::sync::Arc;
use std::time::Instant;

use axum::body::Body;
use axum::http::{Request, Response, StatusCode};
use axum::response::IntoResponse;

use crate::config::{DispatchConfig, ProxyConfig};
use crate::http::client::HttpClient;
use crate::load_balancer::backend::{Backend, BackendError, SimpleBackend};
use crate::load_balancer::round_robin::RoundRobin;
use crate::observability::metrics;
use crate::resilience::backoff::calculate_backoff;

/// Dispatch failures.
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error("backend pool is empty")]
    EmptyPool,

    #[error("no live backend after {rounds} sweep(s)")]
    NoLiveBackend { rounds: u32 },
}

impl IntoResponse for DispatchError {
    fn into_response(self) -> Response<Body> {
        let status = match self {
            DispatchError::EmptyPool => StatusCode::INTERNAL_SERVER_ERROR,
            DispatchError::NoLiveBackend { .. } => StatusCode::SERVICE_UNAVAILABLE,
        };
        (status, self.to_string()).into_response()
    }
}

/// Error building a dispatcher from configuration.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("backend #{index}: {source}")]
    Backend {
        index: usize,
        #[source]
        source: BackendError,
    },

    #[error(transparent)]
    Dispatch(#[from] DispatchError),
}

/// Selects a live backend per request and delegates to it.
#[derive(Debug)]
pub struct Dispatcher {
    backends: Vec<Arc<dyn Backend>>,
    rotation: RoundRobin,
    port: u16,
    policy: DispatchConfig,
}

impl Dispatcher {
    /// Create a dispatcher over `backends`, in rotation order. The pool must not be empty.
    pub fn new(
        backends: Vec<Arc<dyn Backend>>,
        port: u16,
        policy: DispatchConfig,
    ) -> Result<Self, DispatchError> {
        if backends.is_empty() {
            return Err(DispatchError::EmptyPool);
        }
        Ok(Self {
            backends,
            rotation: RoundRobin::new(),
            port,
            policy,
        })
    }

    /// Build every configured backend, in configuration order.
    pub fn from_config(config: &ProxyConfig, client: HttpClient) -> Result<Self, BuildError> {
        let backends = config
            .backends
            .iter()
            .enumerate()
            .map(|(index, backend)| {
                SimpleBackend::new(&backend.address, &backend.health_check, client.clone(), &config.health_check)
                    .map(|b| Arc::new(b) as Arc<dyn Backend>)
                    .map_err(|source| BuildError::Backend { index, source })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self::new(backends, config.listener.port, config.dispatch.clone())?)
    }

    pub fn backends(&self) -> &[Arc<dyn Backend>] {
        &self.backends
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// Current rotation counter.
    pub fn cursor(&self) -> usize {
        self.rotation.position()
    }

    /// One sweep over the pool starting at the cursor.
    /// Returns the first backend that reports alive, or `None`.
    pub async fn select(&self) -> Option<Arc<dyn Backend>> {
        let len = self.backends.len();
        let start = self.rotation.start();

        for skipped in 0..len {
            let backend = &self.backends[RoundRobin::index(start.wrapping_add(skipped), len)];
            if backend.is_alive().await {
                self.rotation.advance(skipped);
                return Some(backend.clone());
            }
            tracing::debug!(address = %backend.address(), "Skipping backend that is not alive");
        }
        None
    }

    /// Select with up to `max_rounds` sweeps, backing off between sweeps.
    pub async fn next_available(&self) -> Result<Arc<dyn Backend>, DispatchError> {
        let rounds = self.policy.max_rounds.max(1);

        for round in 1..=rounds {
            if let Some(backend) = self.select().await {
                return Ok(backend);
            }
            if round < rounds {
                let delay = calculate_backoff(round, self.policy.base_delay_ms, self.policy.max_delay_ms);
                tracing::debug!(round, delay = ?delay, "No live backend, sweeping again");
                tokio::time::sleep(delay).await;
            }
        }
        Err(DispatchError::NoLiveBackend { rounds })
    }

    /// Route one request to the next live backend.
    pub async fn dispatch(&self, request: Request<Body>) -> Response<Body> {
        let start = Instant::now();

        let backend = match self.next_available().await {
            Ok(backend) => backend,
            Err(e) => {
                tracing::warn!(
                    method = %request.method(),
                    path = %request.uri().path(),
                    error = %e,
                    "Rejecting request"
                );
                metrics::record_no_live_backend();
                return e.into_response();
            }
        };

        tracing::info!(address = %backend.address(), "Forwarding request to backend");
        let response = backend.serve(request).await;
        metrics::record_request(backend.address(), response.status().as_u16(), start);
        response
    }
}
