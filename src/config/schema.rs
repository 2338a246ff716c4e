//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the relay.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the traffic relay.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct RelayConfig {
    /// Proxy listener and forwarding settings.
    pub proxy: ProxyConfig,

    /// Delivery to the logging backend.
    pub delivery: DeliveryConfig,

    /// What gets logged and how it is redacted.
    pub logging: LoggingConfig,

    /// Companion web UI.
    pub web: WebConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Proxy listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ProxyConfig {
    /// Host or IP to bind (port comes from `port`).
    pub bind_host: String,

    /// Proxy listen port.
    pub port: u16,

    /// Largest request or response body buffered for logging and forwarding.
    pub max_body_bytes: usize,

    /// Upstream request timeout in seconds.
    pub upstream_timeout_secs: u64,
}

impl ProxyConfig {
    /// Socket address string the proxy binds to.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.bind_host, self.port)
    }
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            bind_host: "0.0.0.0".to_string(),
            port: 9080,
            max_body_bytes: 8 * 1024 * 1024,
            upstream_timeout_secs: 60,
        }
    }
}

/// Delivery configuration for the logging backend.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DeliveryConfig {
    /// Base endpoint. Creates go here, updates go to `{endpoint}/update`.
    pub logger_endpoint: String,

    /// Retries after the first attempt (total attempts = max_retries + 1).
    pub max_retries: u32,

    /// Base delay for exponential backoff in milliseconds.
    pub retry_delay_ms: u64,

    /// Per-attempt HTTP timeout in seconds.
    pub request_timeout_secs: u64,

    /// Bounded queue size between flow callbacks and delivery tasks.
    pub queue_capacity: usize,

    /// Maximum deliveries running concurrently.
    pub max_in_flight: usize,

    /// How long shutdown waits for in-flight deliveries.
    pub drain_timeout_secs: u64,
}

impl Default for DeliveryConfig {
    fn default() -> Self {
        Self {
            logger_endpoint: "http://localhost:8080/api/logs".to_string(),
            max_retries: 3,
            retry_delay_ms: 500,
            request_timeout_secs: 30,
            queue_capacity: 1024,
            max_in_flight: 64,
            drain_timeout_secs: 10,
        }
    }
}

/// Header names masked by default.
pub const DEFAULT_MASK_HEADERS: &[&str] = &["authorization", "password", "token", "api-key"];

/// Logging scope and redaction configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// URL substrings that exempt a flow from logging (case-sensitive).
    pub excluded_routes: Vec<String>,

    /// Header names whose values are masked (case-insensitive).
    pub mask_headers: Vec<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            excluded_routes: Vec::new(),
            mask_headers: DEFAULT_MASK_HEADERS.iter().map(|h| h.to_string()).collect(),
        }
    }
}

/// Companion web UI configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct WebConfig {
    /// Serve the status UI.
    pub enabled: bool,

    /// Host or IP to bind.
    pub bind_host: String,

    /// Web UI port.
    pub port: u16,

    /// Optional Bearer token required by the status API.
    pub api_key: Option<String>,
}

impl WebConfig {
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.bind_host, self.port)
    }
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            bind_host: "127.0.0.1".to_string(),
            port: 9081,
            api_key: None,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Emit logs as JSON lines.
    pub json_logs: bool,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json_logs: false,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let config = RelayConfig::default();
        assert_eq!(config.delivery.max_retries, 3);
        assert_eq!(config.delivery.retry_delay_ms, 500);
        assert_eq!(config.proxy.port, 9080);
        assert_eq!(config.web.port, 9081);
        assert!(config.web.enabled);
        assert!(config.logging.excluded_routes.is_empty());
        assert_eq!(
            config.logging.mask_headers,
            vec!["authorization", "password", "token", "api-key"]
        );
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let config: RelayConfig = toml::from_str(
            r#"
            [delivery]
            logger_endpoint = "http://logs.internal/api/logs"
            max_retries = 5

            [logging]
            excluded_routes = ["health", "metrics"]
            "#,
        )
        .unwrap();

        assert_eq!(config.delivery.logger_endpoint, "http://logs.internal/api/logs");
        assert_eq!(config.delivery.max_retries, 5);
        assert_eq!(config.delivery.retry_delay_ms, 500);
        assert_eq!(config.logging.excluded_routes, vec!["health", "metrics"]);
        assert_eq!(config.logging.mask_headers.len(), 4);
    }
}
