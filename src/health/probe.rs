//! Liveness probe.
//!
//! # Responsibilities
//! - Issue a GET against a backend's health-check target
//! - Map the outcome to a single boolean
//!
//! # Design Decisions
//! - Exactly `200 OK` means alive; every other status, 2xx included, means down
//! - Connection, DNS, TLS and timeout failures all collapse to "down"
//! - Never returns an error to the caller

use std::time::Duration;

use axum::body::Body;
use axum::http::{header, Request, StatusCode, Uri};
use tokio::time;

use crate::http::client::HttpClient;

const USER_AGENT: &str = concat!("roundrobin-lb-health-check/", env!("CARGO_PKG_VERSION"));

/// Performs HTTP liveness probes.
#[derive(Debug, Clone)]
pub struct HealthProbe {
    client: HttpClient,
    timeout: Duration,
}

impl HealthProbe {
    pub fn new(client: HttpClient, timeout: Duration) -> Self {
        Self { client, timeout }
    }

    /// Probe `target`, returning true iff it answered `200 OK` within the timeout.
    pub async fn probe(&self, target: &Uri) -> bool {
        let request = match Request::get(target.clone())
            .header(header::USER_AGENT, USER_AGENT)
            .body(Body::empty())
        {
            Ok(req) => req,
            Err(e) => {
                tracing::debug!(url = %target, error = %e, "Failed to build health check request");
                return false;
            }
        };

        match time::timeout(self.timeout, self.client.request(request)).await {
            Ok(Ok(response)) => {
                let status = response.status();
                if status != StatusCode::OK {
                    tracing::debug!(url = %target, status = %status, "Health check failed: status");
                }
                status == StatusCode::OK
            }
            Ok(Err(e)) => {
                tracing::debug!(url = %target, error = %e, "Health check failed: connection error");
                false
            }
            Err(_) => {
                tracing::debug!(url = %target, "Health check failed: timeout");
                false
            }
        }
    }
}
