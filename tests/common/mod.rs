//! Shared utilities for integration testing.

#![allow(dead_code)]

use std::future::Future;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU16, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::http::StatusCode;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

use roundrobin_lb::config::{BackendConfig, HealthMode, ProxyConfig};
use roundrobin_lb::lifecycle::bootstrap;

/// What the mock saw of an inbound request.
#[derive(Debug, Clone)]
pub struct MockRequest {
    pub path: String,
    pub headers: Vec<(String, String)>,
}

impl MockRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Start a programmable mock backend on an ephemeral port.
pub async fn start_programmable_backend<F, Fut>(f: F) -> SocketAddr
where
    F: Fn(MockRequest) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = (u16, String)> + Send + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let f = Arc::new(f);

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    let f = f.clone();
                    tokio::spawn(async move {
                        let Some(request) = read_request(&mut socket).await else {
                            return;
                        };
                        let (status, body) = f(request).await;
                        let reason = StatusCode::from_u16(status)
                            .ok()
                            .and_then(|s| s.canonical_reason())
                            .unwrap_or("Unknown");

                        let response_str = if status == 204 {
                            format!("HTTP/1.1 204 {}\r\nConnection: close\r\n\r\n", reason)
                        } else {
                            format!(
                                "HTTP/1.1 {} {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                                status,
                                reason,
                                body.len(),
                                body
                            )
                        };
                        let _ = socket.write_all(response_str.as_bytes()).await;
                        let _ = socket.shutdown().await;
                        tokio::time::sleep(Duration::from_millis(10)).await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    addr
}

async fn read_request(socket: &mut tokio::net::TcpStream) -> Option<MockRequest> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];
    while !buf.windows(4).any(|w| w == b"\r\n\r\n") {
        let n = socket.read(&mut chunk).await.ok()?;
        if n == 0 {
            return None;
        }
        buf.extend_from_slice(&chunk[..n]);
    }

    let head = String::from_utf8_lossy(&buf).into_owned();
    let mut lines = head.split("\r\n");
    let path = lines.next()?.split_whitespace().nth(1)?.to_string();
    let headers = lines
        .take_while(|line| !line.is_empty())
        .filter_map(|line| line.split_once(':'))
        .map(|(k, v)| (k.trim().to_string(), v.trim().to_string()))
        .collect();

    Some(MockRequest { path, headers })
}

/// A backend whose `/health` answers with a switchable status and whose
/// other paths answer `200` with `"<name> <path>"`.
pub struct MockBackend {
    pub addr: SocketAddr,
    health: Arc<AtomicU16>,
}

impl MockBackend {
    pub async fn start(name: &'static str, health_status: u16) -> Self {
        let health = Arc::new(AtomicU16::new(health_status));
        let h = health.clone();
        let addr = start_programmable_backend(move |request| {
            let h = h.clone();
            async move {
                if request.path == "/health" {
                    (h.load(Ordering::SeqCst), "health".into())
                } else {
                    (200, format!("{} {}", name, request.path))
                }
            }
        })
        .await;
        Self { addr, health }
    }

    pub fn set_health(&self, status: u16) {
        self.health.store(status, Ordering::SeqCst);
    }

    pub fn config(&self) -> BackendConfig {
        BackendConfig {
            address: format!("http://{}", self.addr),
            health_check: format!("http://{}/health", self.addr),
        }
    }
}

/// Proxy config on an ephemeral localhost port with fast health checks.
pub fn proxy_config(backends: Vec<BackendConfig>, mode: HealthMode) -> ProxyConfig {
    let mut config = ProxyConfig::default();
    config.listener.host = "127.0.0.1".into();
    config.listener.port = 0;
    config.backends = backends;
    config.health_check.mode = mode;
    config.health_check.interval_secs = 1;
    config.health_check.timeout_secs = 1;
    config.dispatch.max_rounds = 2;
    config.dispatch.base_delay_ms = 10;
    config.dispatch.max_delay_ms = 20;
    config
}

/// Bootstrap and run the proxy, returning its address.
pub async fn start_proxy(config: ProxyConfig) -> SocketAddr {
    let ready = bootstrap(config).await.expect("bootstrap failed");
    let addr = ready.listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = ready.server.run(ready.listener).await;
    });
    addr
}

/// Client that opens a fresh connection per request.
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}

pub async fn get_text(client: &reqwest::Client, url: &str) -> (u16, String) {
    let res = client.get(url).send().await.expect("Proxy unreachable");
    let status = res.status().as_u16();
    (status, res.text().await.unwrap())
}
