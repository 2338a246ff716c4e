//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate the logging endpoint is an absolute http(s) URL
//! - Validate value ranges (ports, queue sizes)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: RelayConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use thiserror::Error;
use url::Url;

use crate::config::schema::RelayConfig;

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("logger endpoint '{0}' is not an absolute http(s) URL")]
    InvalidEndpoint(String),

    #[error("{0} port must be non-zero")]
    ZeroPort(&'static str),

    #[error("proxy and web UI cannot share port {0}")]
    PortConflict(u16),

    #[error("{0} must be greater than zero")]
    ZeroLimit(&'static str),
}

/// Validate a configuration, collecting every error found.
pub fn validate_config(config: &RelayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    let endpoint = &config.delivery.logger_endpoint;
    match Url::parse(endpoint) {
        Ok(url) if matches!(url.scheme(), "http" | "https") && url.has_host() => {}
        _ => errors.push(ValidationError::InvalidEndpoint(endpoint.clone())),
    }

    if config.proxy.port == 0 {
        errors.push(ValidationError::ZeroPort("proxy"));
    }
    if config.web.enabled {
        if config.web.port == 0 {
            errors.push(ValidationError::ZeroPort("web"));
        } else if config.web.port == config.proxy.port {
            errors.push(ValidationError::PortConflict(config.web.port));
        }
    }

    if config.delivery.queue_capacity == 0 {
        errors.push(ValidationError::ZeroLimit("delivery.queue_capacity"));
    }
    if config.delivery.max_in_flight == 0 {
        errors.push(ValidationError::ZeroLimit("delivery.max_in_flight"));
    }
    if config.proxy.max_body_bytes == 0 {
        errors.push(ValidationError::ZeroLimit("proxy.max_body_bytes"));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
