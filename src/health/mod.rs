//! Health checking subsystem.
//!
//! # Data Flow
//! ```text
//! Inline mode:
//!     Dispatcher asks backend.is_alive()
//!     → probe.rs (GET health-check target, under the backend's probe lock)
//!     → state.rs (record result)
//!
//! Background mode:
//!     Periodic timer (active.rs)
//!     → probe.rs for every backend, concurrently
//!     → state.rs (record result)
//!     Dispatcher reads state.rs without I/O
//! ```
//!
//! # Design Decisions
//! - A probe is alive iff it returned exactly 200 OK
//! - Probe failures never propagate as errors
//! - At most one probe per backend in flight

pub mod active;
pub mod probe;
pub mod state;

pub use active::HealthMonitor;
pub use probe::HealthProbe;
pub use state::{HealthCell, HealthState};
