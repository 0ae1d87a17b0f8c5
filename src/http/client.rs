//! Outbound HTTP client shared by forwarding and health probes.

use std::time::Duration;

use axum::body::Body;
use hyper_tls::HttpsConnector;
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};

use crate::config::TimeoutConfig;

/// Pooled client able to reach both `http://` and `https://` upstreams.
pub type HttpClient = Client<HttpsConnector<HttpConnector>, Body>;

/// Build the outbound client.
pub fn build_client(timeouts: &TimeoutConfig) -> HttpClient {
    let mut http = HttpConnector::new();
    http.enforce_http(false);
    http.set_connect_timeout(Some(Duration::from_secs(timeouts.connect_secs)));

    Client::builder(TokioExecutor::new()).build(HttpsConnector::new_with_connector(http))
}
