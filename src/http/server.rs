//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with a single catch-all route
//! - Wire up middleware (request ID, tracing)
//! - Start background health monitoring when configured
//! - Serve on the bound listener until the process is killed

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    extract::State,
    http::Request,
    response::Response,
    routing::any,
    Router,
};
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use crate::config::{HealthCheckConfig, HealthMode};
use crate::health::HealthMonitor;
use crate::http::request::{request_id, UuidRequestId, X_REQUEST_ID};
use crate::load_balancer::Dispatcher;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub dispatcher: Arc<Dispatcher>,
}

/// HTTP front end of the load balancer.
pub struct HttpServer {
    router: Router,
    dispatcher: Arc<Dispatcher>,
    health_check: HealthCheckConfig,
}

impl HttpServer {
    pub fn new(dispatcher: Arc<Dispatcher>, health_check: HealthCheckConfig) -> Self {
        let router = Self::build_router(AppState {
            dispatcher: dispatcher.clone(),
        });
        Self {
            router,
            dispatcher,
            health_check,
        }
    }

    /// Every path and method goes to the dispatcher.
    fn build_router(state: AppState) -> Router {
        Router::new()
            .route("/", any(proxy_handler))
            .route("/{*path}", any(proxy_handler))
            .with_state(state)
            .layer(
                ServiceBuilder::new()
                    .layer(SetRequestIdLayer::new(X_REQUEST_ID, UuidRequestId))
                    .layer(TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
                        tracing::info_span!(
                            "request",
                            method = %request.method(),
                            uri = %request.uri(),
                            request_id = request_id(request).unwrap_or("-"),
                        )
                    }))
                    .layer(PropagateRequestIdLayer::new(X_REQUEST_ID)),
            )
    }

    pub fn router(&self) -> Router {
        self.router.clone()
    }

    pub fn dispatcher(&self) -> &Arc<Dispatcher> {
        &self.dispatcher
    }

    /// Run the server, accepting connections on the given listener.
    pub async fn run(self, listener: TcpListener) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;

        if self.health_check.mode == HealthMode::Background {
            let monitor = HealthMonitor::new(
                self.dispatcher.backends().to_vec(),
                Duration::from_secs(self.health_check.interval_secs),
            );
            tokio::spawn(monitor.run());
        }

        tracing::info!(
            address = %addr,
            backends = self.dispatcher.backends().len(),
            "Serving requests"
        );

        let app = self.router.into_make_service_with_connect_info::<SocketAddr>();
        axum::serve(listener, app).await
    }
}

/// Catch-all handler.
async fn proxy_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    state.dispatcher.dispatch(request).await
}
