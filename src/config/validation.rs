//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Reject an empty backend pool
//! - Check that every address and health-check target is a usable URL
//! - Validate value ranges (timeouts > 0, rounds > 0)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ProxyConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use url::Url;

use crate::config::schema::{HealthMode, ProxyConfig};

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("backend pool is empty")]
    EmptyPool,

    #[error("backend #{index}: invalid address {address:?}: {reason}")]
    InvalidAddress {
        index: usize,
        address: String,
        reason: String,
    },

    #[error("backend #{index}: invalid health check target {target:?}: {reason}")]
    InvalidHealthCheck {
        index: usize,
        target: String,
        reason: String,
    },

    #[error("listener host {0:?} is not an IP address")]
    InvalidListenerHost(String),

    #[error("{field} must be greater than zero")]
    Zero { field: &'static str },

    #[error("invalid metrics address {0:?}")]
    InvalidMetricsAddress(String),
}

/// Validate a configuration, collecting every problem found.
pub fn validate_config(config: &ProxyConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.socket_addr().is_err() {
        errors.push(ValidationError::InvalidListenerHost(config.listener.host.clone()));
    }

    if config.backends.is_empty() {
        errors.push(ValidationError::EmptyPool);
    }

    for (index, backend) in config.backends.iter().enumerate() {
        if let Err(reason) = check_http_url(&backend.address) {
            errors.push(ValidationError::InvalidAddress {
                index,
                address: backend.address.clone(),
                reason,
            });
        }
        if let Err(reason) = check_http_url(&backend.health_check) {
            errors.push(ValidationError::InvalidHealthCheck {
                index,
                target: backend.health_check.clone(),
                reason,
            });
        }
    }

    if config.dispatch.max_rounds == 0 {
        errors.push(ValidationError::Zero { field: "dispatch.max_rounds" });
    }
    if config.health_check.timeout_secs == 0 {
        errors.push(ValidationError::Zero { field: "health_check.timeout_secs" });
    }
    if config.health_check.mode == HealthMode::Background && config.health_check.interval_secs == 0 {
        errors.push(ValidationError::Zero { field: "health_check.interval_secs" });
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::InvalidMetricsAddress(
            config.observability.metrics_address.clone(),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Absolute http(s) URL with a host.
pub(crate) fn check_http_url(raw: &str) -> Result<Url, String> {
    let url = Url::parse(raw).map_err(|e| e.to_string())?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(format!("unsupported scheme {:?}", url.scheme()));
    }
    if url.host_str().map_or(true, str::is_empty) {
        return Err("missing host".to_string());
    }
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::BackendConfig;

    fn backend(address: &str, health_check: &str) -> BackendConfig {
        BackendConfig {
            address: address.to_string(),
            health_check: health_check.to_string(),
        }
    }

    #[test]
    fn test_default_config_is_valid() {
        assert_eq!(validate_config(&ProxyConfig::default()), Ok(()));
    }

    #[test]
    fn test_empty_pool_rejected() {
        let mut config = ProxyConfig::default();
        config.backends.clear();
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors, vec![ValidationError::EmptyPool]);
    }

    #[test]
    fn test_collects_all_errors() {
        let mut config = ProxyConfig::default();
        config.backends = vec![
            backend("not a url", "http://127.0.0.1:9001/health"),
            backend("http://127.0.0.1:9002", "ftp://127.0.0.1/health"),
        ];
        config.dispatch.max_rounds = 0;

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 3);
        assert!(matches!(errors[0], ValidationError::InvalidAddress { index: 0, .. }));
        assert!(matches!(errors[1], ValidationError::InvalidHealthCheck { index: 1, .. }));
        assert_eq!(errors[2], ValidationError::Zero { field: "dispatch.max_rounds" });
    }

    #[test]
    fn test_interval_only_checked_in_background_mode() {
        let mut config = ProxyConfig::default();
        config.health_check.interval_secs = 0;
        assert!(validate_config(&config).is_err());

        config.health_check.mode = HealthMode::Inline;
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_check_http_url() {
        assert!(check_http_url("http://127.0.0.1:8080").is_ok());
        assert!(check_http_url("https://example.com/base").is_ok());
        assert!(check_http_url("127.0.0.1:8080").is_err());
        assert!(check_http_url("mailto:ops@example.com").is_err());
    }
}
