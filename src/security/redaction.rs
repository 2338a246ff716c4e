//! Header redaction for logged records.
//!
//! # Responsibilities
//! - Project a request's headers into a loggable `name → value` map
//! - Replace the value of every sensitive header with a fixed mask
//!
//! # Design Decisions
//! - Name matching is case-insensitive and exact (no prefix/substring match)
//! - The redact decision is made once per header and selects the only value
//!   written for it; nothing downstream ever sees the original
//! - Multi-valued headers are joined with ", "

use std::collections::{HashMap, HashSet};

use axum::http::HeaderMap;

/// Mask written in place of a sensitive header value.
pub const MASK: &str = "********";

/// Produces safe-to-log header projections.
#[derive(Debug, Clone, Default)]
pub struct HeaderRedactor {
    /// Lowercased header names to mask.
    masked: HashSet<String>,
}

impl HeaderRedactor {
    /// Create a redactor from configured header names.
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let masked = names
            .into_iter()
            .map(|n| n.as_ref().trim().to_ascii_lowercase())
            .filter(|n| !n.is_empty())
            .collect();
        Self { masked }
    }

    /// Returns true if the header's value must be masked.
    pub fn is_masked(&self, name: &str) -> bool {
        self.masked.contains(&name.to_ascii_lowercase())
    }

    /// Project headers into one display string per header name.
    pub fn redact(&self, headers: &HeaderMap) -> HashMap<String, String> {
        let mut out = HashMap::with_capacity(headers.keys_len());

        for name in headers.keys() {
            let display = if self.is_masked(name.as_str()) {
                MASK.to_string()
            } else {
                headers
                    .get_all(name)
                    .iter()
                    .map(|v| String::from_utf8_lossy(v.as_bytes()).into_owned())
                    .collect::<Vec<_>>()
                    .join(", ")
            };
            out.insert(name.as_str().to_string(), display);
        }

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn redactor() -> HeaderRedactor {
        HeaderRedactor::new(["Authorization", "password", "TOKEN", "api-key"])
    }

    #[test]
    fn test_masks_sensitive_headers_any_casing() {
        let mut headers = HeaderMap::new();
        headers.insert("AUTHORIZATION", HeaderValue::from_static("Bearer s3cr3t"));
        headers.insert("Token", HeaderValue::from_static("abc123"));
        headers.insert("content-type", HeaderValue::from_static("application/json"));

        let out = redactor().redact(&headers);

        assert_eq!(out.len(), 3);
        assert_eq!(out["authorization"], MASK);
        assert_eq!(out["token"], MASK);
        assert_eq!(out["content-type"], "application/json");
        assert!(out.values().all(|v| !v.contains("s3cr3t") && !v.contains("abc123")));
    }

    #[test]
    fn test_masked_multi_value_header_leaks_nothing() {
        let mut headers = HeaderMap::new();
        headers.append("api-key", HeaderValue::from_static("first-key"));
        headers.append("api-key", HeaderValue::from_static("second-key"));

        let out = redactor().redact(&headers);

        assert_eq!(out.len(), 1);
        assert_eq!(out["api-key"], MASK);
    }

    #[test]
    fn test_multi_value_joined() {
        let mut headers = HeaderMap::new();
        headers.append("accept", HeaderValue::from_static("text/html"));
        headers.append("accept", HeaderValue::from_static("application/json"));

        let out = redactor().redact(&headers);
        assert_eq!(out["accept"], "text/html, application/json");
    }

    #[test]
    fn test_exact_name_match_only() {
        let mut headers = HeaderMap::new();
        headers.insert("x-token-hint", HeaderValue::from_static("visible"));

        let out = redactor().redact(&headers);
        assert_eq!(out["x-token-hint"], "visible");
    }

    #[test]
    fn test_every_header_present_once() {
        let mut headers = HeaderMap::new();
        headers.append("a", HeaderValue::from_static("1"));
        headers.append("a", HeaderValue::from_static("2"));
        headers.insert("password", HeaderValue::from_static("hunter2"));
        headers.insert("b", HeaderValue::from_static("3"));

        let out = redactor().redact(&headers);
        let mut keys: Vec<_> = out.keys().cloned().collect();
        keys.sort();
        assert_eq!(keys, vec!["a", "b", "password"]);
    }
}
