//! Per-flow data handed to the relay by the interception engine.

use axum::http::{HeaderMap, Method, StatusCode};
use bytes::Bytes;
use uuid::Uuid;

/// Stable, unique identifier for one request/response exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FlowId(Uuid);

impl FlowId {
    /// Generate a new random flow ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for FlowId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Uuid> for FlowId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for FlowId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The request side of a flow, as observed.
///
/// `body` is a cheap reference-counted view; reading it for logging leaves the
/// bytes the engine forwards untouched.
#[derive(Debug, Clone)]
pub struct FlowRequest {
    pub method: Method,
    pub url: String,
    pub headers: HeaderMap,
    pub body: Bytes,
}

/// The response side of a flow, as observed.
#[derive(Debug, Clone)]
pub struct FlowResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}
