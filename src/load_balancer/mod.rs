//! Load balancing subsystem.
//!
//! # Data Flow
//! ```text
//! Inbound request
//!     → dispatcher.rs (reserve start index from round_robin.rs)
//!     → backend.rs (is_alive? in rotation order)
//!     → first live backend serves the request
//!     → none alive: back off and sweep again, then 503
//! ```
//!
//! # Design Decisions
//! - Pool is fixed at startup, non-empty, in configuration order
//! - Cursor is a single atomic counter; callers never share a start index
//! - Backends are trait objects so other kinds can join the same pool

pub mod backend;
pub mod dispatcher;
pub mod round_robin;

pub use backend::{Backend, BackendError, SimpleBackend};
pub use dispatcher::{BuildError, DispatchError, Dispatcher};
pub use round_robin::RoundRobin;
