//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Dispatch sweep finds no live backend
//!     → backoff.rs (delay before the next sweep)
//!     → after max_rounds sweeps: 503 Service Unavailable
//! ```
//!
//! # Design Decisions
//! - Selection is bounded; a request never spins forever on a dead pool
//! - Forwarding is never retried once a backend has been chosen

pub mod backoff;
