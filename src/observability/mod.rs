//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (structured log events via `tracing`)
//!     → metrics.rs (counters, gauges, histograms)
//!
//! Consumers:
//!     → stdout (pretty or JSON)
//!     → Metrics endpoint (Prometheus scrape), when enabled
//! ```
//!
//! # Design Decisions
//! - Every dispatch logs the chosen backend address
//! - Failed probes are not errors; they log at debug and flip a gauge
//! - Request ID flows through the HTTP layer's spans

pub mod logging;
pub mod metrics;
