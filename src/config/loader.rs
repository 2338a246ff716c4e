//! Configuration loading from disk and the environment.

use std::fs;
use std::path::Path;
use std::time::Duration;

use thiserror::Error;

use crate::config::schema::RelayConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Resolve the startup configuration.
///
/// Defaults, then the TOML file if one is given, then environment overrides.
/// The result is validated before it is returned.
pub fn resolve_config(path: Option<&Path>) -> Result<RelayConfig, ConfigError> {
    resolve_with(path, |key| std::env::var(key).ok())
}

fn resolve_with<F>(path: Option<&Path>, lookup: F) -> Result<RelayConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut config = match path {
        Some(path) => parse_file(path)?,
        None => RelayConfig::default(),
    };

    apply_env_overrides(&mut config, lookup);

    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

fn parse_file(path: &Path) -> Result<RelayConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    Ok(toml::from_str(&content)?)
}

/// Apply environment overrides using `lookup` to read variables.
///
/// Empty values are treated as unset. Values that fail to parse keep the
/// current setting.
pub fn apply_env_overrides<F>(config: &mut RelayConfig, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

    if let Some(endpoint) = get("LOGGER_ENDPOINT") {
        config.delivery.logger_endpoint = endpoint.trim().to_string();
    }

    if let Some(raw) = get("MAX_RETRIES") {
        match raw.trim().parse() {
            Ok(n) => config.delivery.max_retries = n,
            Err(_) => tracing::warn!(value = %raw, "Ignoring invalid MAX_RETRIES"),
        }
    }

    if let Some(raw) = get("RETRY_DELAY") {
        match parse_duration(&raw) {
            Some(d) => config.delivery.retry_delay_ms = d.as_millis() as u64,
            None => tracing::warn!(value = %raw, "Ignoring invalid RETRY_DELAY"),
        }
    }

    if let Some(raw) = get("EXCLUDED_ROUTES") {
        config.logging.excluded_routes = split_list(&raw);
    }

    if let Some(raw) = get("MASK_HEADERS") {
        config.logging.mask_headers = split_list(&raw);
    }

    if let Some(raw) = get("WEB_INTERFACE") {
        config.web.enabled = matches!(raw.trim(), "true" | "1" | "yes");
    }

    if let Some(raw) = get("PROXY_PORT") {
        match raw.trim().parse() {
            Ok(port) => config.proxy.port = port,
            Err(_) => tracing::warn!(value = %raw, "Ignoring invalid PROXY_PORT"),
        }
    }

    if let Some(raw) = get("WEB_PORT") {
        match raw.trim().parse() {
            Ok(port) => config.web.port = port,
            Err(_) => tracing::warn!(value = %raw, "Ignoring invalid WEB_PORT"),
        }
    }
}

/// Split a comma-separated list, trimming entries and dropping empty ones.
///
/// An empty entry would match every URL as an exclusion, so it never survives.
pub fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Parse a duration such as `500ms`, `2s`, `1m`, `1.5s` or a bare millisecond count.
pub fn parse_duration(raw: &str) -> Option<Duration> {
    let raw = raw.trim();
    if let Ok(ms) = raw.parse::<u64>() {
        return Some(Duration::from_millis(ms));
    }

    let split = raw.find(|c: char| !(c.is_ascii_digit() || c == '.'))?;
    let (value, unit) = raw.split_at(split);
    let value: f64 = value.parse().ok()?;
    if !value.is_finite() || value < 0.0 {
        return None;
    }

    let millis = match unit {
        "ms" => value,
        "s" => value * 1_000.0,
        "m" => value * 60_000.0,
        "h" => value * 3_600_000.0,
        _ => return None,
    };
    Some(Duration::from_millis(millis.round() as u64))
}
