//! Background health checking.
//!
//! # Responsibilities
//! - Periodically probe every backend
//! - Refresh each backend's cached liveness
//! - Log state transitions and export them as a gauge

use std::sync::Arc;
use std::time::Duration;

use futures_util::future::join_all;
use tokio::time;

use crate::health::state::HealthState;
use crate::load_balancer::backend::Backend;
use crate::observability::metrics;

pub struct HealthMonitor {
    backends: Vec<Arc<dyn Backend>>,
    interval: Duration,
}

impl HealthMonitor {
    pub fn new(backends: Vec<Arc<dyn Backend>>, interval: Duration) -> Self {
        Self { backends, interval }
    }

    /// Probe forever at the configured interval. The first sweep runs immediately.
    pub async fn run(self) {
        tracing::info!(
            interval_secs = self.interval.as_secs(),
            backends = self.backends.len(),
            "Health monitor starting"
        );

        let mut ticker = time::interval(self.interval);
        ticker.set_missed_tick_behavior(time::MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            self.check_all().await;
        }
    }

    /// Probe every backend concurrently; returns how many are alive.
    pub async fn check_all(&self) -> usize {
        let results = join_all(self.backends.iter().map(|backend| async move {
            let before = backend.health();
            let alive = backend.check().await;
            log_transition(backend.address(), before, alive);
            metrics::record_backend_health(backend.address(), alive);
            alive
        }))
        .await;

        let alive = results.into_iter().filter(|alive| *alive).count();
        tracing::debug!(alive, total = self.backends.len(), "Health sweep complete");
        alive
    }
}

fn log_transition(address: &str, before: HealthState, alive: bool) {
    match (before, alive) {
        (HealthState::Alive, true) | (HealthState::Down, false) => {}
        (_, true) => tracing::info!(address = %address, "Backend is alive"),
        (_, false) => tracing::warn!(address = %address, previous = ?before, "Backend is down"),
    }
}
