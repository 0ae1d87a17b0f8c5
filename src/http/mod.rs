//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, catch-all route)
//!     → request.rs (assign request ID)
//!     → [dispatcher picks a live backend]
//!     → proxy.rs (rewrite onto the backend, stream the response back)
//!     → Send to client
//! ```

pub mod client;
pub mod proxy;
pub mod request;
pub mod server;

pub use client::{build_client, HttpClient};
pub use proxy::ReverseProxy;
pub use request::{UuidRequestId, X_REQUEST_ID};
pub use server::HttpServer;
