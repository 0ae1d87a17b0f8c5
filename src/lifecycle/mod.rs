//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Validate config → Build pool → Initial health sweep → Bind listener
//! ```
//!
//! # Design Decisions
//! - Fail fast: configuration errors abort before the listener is bound
//! - No graceful shutdown; the process runs until it is killed

pub mod startup;

pub use startup::{bootstrap, Bootstrapped, StartupError};
