//! Single-upstream reverse proxy.
//!
//! # Responsibilities
//! - Rewrite an inbound request onto one fixed upstream base URL
//! - Strip hop-by-hop headers in both directions
//! - Record the client address in `X-Forwarded-For`
//! - Stream the upstream response back unbuffered
//!
//! # Design Decisions
//! - Upstream path = target path + request path, joined by exactly one slash
//! - Query strings are concatenated with `&`
//! - Inbound `Host` is dropped; the client derives it from the upstream URI
//! - Upstream failures become `502 Bad Gateway`; nothing is retried here

use std::net::SocketAddr;

use axum::body::Body;
use axum::extract::ConnectInfo;
use axum::http::{header, HeaderMap, HeaderName, HeaderValue, Request, Response, StatusCode, Uri, Version};
use axum::response::IntoResponse;
use url::{Position, Url};

use crate::http::client::HttpClient;

const X_FORWARDED_FOR: HeaderName = HeaderName::from_static("x-forwarded-for");

/// Headers that describe a single connection and must not be forwarded.
const HOP_BY_HOP: [HeaderName; 8] = [
    header::CONNECTION,
    HeaderName::from_static("keep-alive"),
    HeaderName::from_static("proxy-connection"),
    header::PROXY_AUTHENTICATE,
    header::PROXY_AUTHORIZATION,
    header::TE,
    header::TRAILER,
    header::TRANSFER_ENCODING,
];

/// Forwards requests to a single upstream.
#[derive(Debug, Clone)]
pub struct ReverseProxy {
    target: Url,
    client: HttpClient,
}

impl ReverseProxy {
    pub fn new(target: Url, client: HttpClient) -> Self {
        Self { target, client }
    }

    pub fn target(&self) -> &Url {
        &self.target
    }

    /// Forward `request` upstream and return the upstream response.
    pub async fn forward(&self, request: Request<Body>) -> Response<Body> {
        let peer = request
            .extensions()
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| *addr);

        let (mut parts, body) = request.into_parts();

        let uri = match self.rewrite_uri(&parts.uri) {
            Ok(uri) => uri,
            Err(e) => {
                tracing::warn!(upstream = %self.target, path = %parts.uri, error = %e, "Failed to rewrite request URI");
                return StatusCode::BAD_GATEWAY.into_response();
            }
        };

        parts.uri = uri;
        parts.version = Version::HTTP_11;
        strip_hop_by_hop(&mut parts.headers);
        parts.headers.remove(header::HOST);
        if let Some(peer) = peer {
            append_forwarded_for(&mut parts.headers, peer);
        }

        match self.client.request(Request::from_parts(parts, body)).await {
            Ok(response) => {
                let (mut parts, body): (_, hyper::body::Incoming) = response.into_parts();
                strip_hop_by_hop(&mut parts.headers);
                Response::from_parts(parts, Body::new(body))
            }
            Err(e) => {
                tracing::warn!(upstream = %self.target, error = %e, "Upstream request failed");
                StatusCode::BAD_GATEWAY.into_response()
            }
        }
    }

    /// Map an inbound URI onto the target.
    pub fn rewrite_uri(&self, inbound: &Uri) -> Result<Uri, axum::http::uri::InvalidUri> {
        let mut rewritten = String::from(&self.target[..Position::BeforePath]);
        rewritten.push_str(&join_paths(self.target.path(), inbound.path()));

        let query = match (self.target.query().unwrap_or(""), inbound.query().unwrap_or("")) {
            ("", q) | (q, "") => q.to_string(),
            (target_q, inbound_q) => format!("{}&{}", target_q, inbound_q),
        };
        if !query.is_empty() {
            rewritten.push('?');
            rewritten.push_str(&query);
        }

        rewritten.parse()
    }
}

fn join_paths(base: &str, path: &str) -> String {
    match (base.ends_with('/'), path.starts_with('/')) {
        (true, true) => format!("{}{}", base, &path[1..]),
        (false, false) => format!("{}/{}", base, path),
        _ => format!("{}{}", base, path),
    }
}

fn strip_hop_by_hop(headers: &mut HeaderMap) {
    let named: Vec<HeaderName> = headers
        .get_all(header::CONNECTION)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(','))
        .filter_map(|name| HeaderName::from_bytes(name.trim().as_bytes()).ok())
        .collect();

    for name in named.iter().chain(HOP_BY_HOP.iter()) {
        headers.remove(name);
    }
    // Protocol upgrades are not proxied.
    headers.remove(header::UPGRADE);
}

fn append_forwarded_for(headers: &mut HeaderMap, peer: SocketAddr) {
    let ip = peer.ip().to_string();
    let value = match headers.get(&X_FORWARDED_FOR).and_then(|v| v.to_str().ok()) {
        Some(prior) => format!("{}, {}", prior, ip),
        None => ip,
    };
    if let Ok(value) = HeaderValue::from_str(&value) {
        headers.insert(X_FORWARDED_FOR, value);
    }
}
