//! Forward-proxy server driving the flow hooks.
//!
//! # Responsibilities
//! - Accept absolute-form and origin-form proxy requests
//! - Buffer request and response bodies so hooks see them and they are still forwarded
//! - Forward upstream with hop-by-hop headers stripped
//! - Fire `on_teardown` for every flow, however it ends
//!
//! # Design Decisions
//! - Every request lands in the router fallback; there is no route table
//! - Upstream errors and timeouts are 502 with no response event
//! - Oversized request bodies are 413; oversized responses fail the exchange
//! - A response body that breaks mid-stream is logged empty; the client still
//!   gets the upstream status and headers with whatever bytes arrived

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    extract::State,
    http::{header, request::Parts, HeaderMap, Method, Request, StatusCode, Uri},
    response::{IntoResponse, Response},
    Router,
};
use bytes::Bytes;
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use crate::config::ProxyConfig;
use crate::flow::{FlowHooks, FlowId, FlowRequest, FlowResponse};
use crate::http::body::{read_body, BodyError};
use crate::http::tunnel::tunnel;
use crate::security::headers::strip_hop_by_hop;

/// Shared state injected into the proxy handler.
#[derive(Clone)]
pub struct ProxyState {
    pub hooks: Arc<dyn FlowHooks>,
    pub client: Client<HttpConnector, Body>,
    pub max_body_bytes: usize,
    pub upstream_timeout: Duration,
}

/// Forward proxy that reports every flow to a [`FlowHooks`] implementation.
pub struct ProxyServer {
    router: Router,
    config: ProxyConfig,
}

impl ProxyServer {
    pub fn new(config: ProxyConfig, hooks: Arc<dyn FlowHooks>) -> Self {
        let client = Client::builder(TokioExecutor::new()).build(HttpConnector::new());

        let state = ProxyState {
            hooks,
            client,
            max_body_bytes: config.max_body_bytes,
            upstream_timeout: Duration::from_secs(config.upstream_timeout_secs),
        };

        let router = Router::new()
            .fallback(proxy_handler)
            .with_state(state)
            .layer(TraceLayer::new_for_http());

        Self { router, config }
    }

    /// Serve until `shutdown` resolves, then let in-flight flows finish.
    pub async fn run<F>(self, listener: TcpListener, shutdown: F) -> Result<(), std::io::Error>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            max_body_bytes = self.config.max_body_bytes,
            "Proxy listening"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown)
            .await?;

        tracing::info!("Proxy stopped");
        Ok(())
    }
}

/// Calls `on_teardown` when the flow's handler future completes or is dropped.
struct FlowGuard {
    hooks: Arc<dyn FlowHooks>,
    flow_id: FlowId,
}

impl Drop for FlowGuard {
    fn drop(&mut self) {
        self.hooks.on_teardown(self.flow_id);
    }
}

async fn proxy_handler(State(state): State<ProxyState>, request: Request<Body>) -> Response {
    if request.method() == Method::CONNECT {
        return tunnel(request).await;
    }

    let flow_id = FlowId::new();
    let _guard = FlowGuard {
        hooks: state.hooks.clone(),
        flow_id,
    };

    let (parts, body) = request.into_parts();

    let Some(url) = absolute_url(&parts) else {
        tracing::warn!(flow_id = %flow_id, uri = %parts.uri, "Request has no target host");
        return (StatusCode::BAD_REQUEST, "Missing target host").into_response();
    };
    let uri: Uri = match url.parse() {
        Ok(uri) => uri,
        Err(e) => {
            tracing::warn!(flow_id = %flow_id, url = %url, error = %e, "Invalid target URL");
            return (StatusCode::BAD_REQUEST, "Invalid target URL").into_response();
        }
    };

    let body = match read_body(body, state.max_body_bytes).await {
        Ok(bytes) => bytes,
        Err(e @ BodyError::TooLarge { .. }) => {
            tracing::warn!(flow_id = %flow_id, url = %url, error = %e, "Request body rejected");
            return (StatusCode::PAYLOAD_TOO_LARGE, "Request body too large").into_response();
        }
        Err(e) => {
            tracing::warn!(flow_id = %flow_id, url = %url, error = %e, "Request body unreadable");
            return (StatusCode::BAD_REQUEST, "Request body unreadable").into_response();
        }
    };

    let flow_request = FlowRequest {
        method: parts.method,
        url,
        headers: parts.headers,
        body,
    };
    state.hooks.on_request(flow_id, &flow_request);

    let upstream_request = match forwarded_request(&flow_request, uri) {
        Ok(req) => req,
        Err(e) => {
            tracing::error!(flow_id = %flow_id, error = %e, "Failed to build upstream request");
            return (StatusCode::BAD_GATEWAY, "Upstream request failed").into_response();
        }
    };

    let upstream_response = match tokio::time::timeout(state.upstream_timeout, state.client.request(upstream_request)).await {
        Ok(Ok(response)) => response,
        Ok(Err(e)) => {
            tracing::warn!(flow_id = %flow_id, url = %flow_request.url, error = %e, "Upstream error");
            return (StatusCode::BAD_GATEWAY, "Upstream request failed").into_response();
        }
        Err(_) => {
            tracing::warn!(
                flow_id = %flow_id,
                url = %flow_request.url,
                timeout_secs = state.upstream_timeout.as_secs(),
                "Upstream timed out"
            );
            return (StatusCode::BAD_GATEWAY, "Upstream request timed out").into_response();
        }
    };

    let (mut parts, body) = upstream_response.into_parts();
    let (logged, relayed, truncated) = match read_body(Body::new(body), state.max_body_bytes).await {
        Ok(bytes) => (bytes.clone(), bytes, false),
        Err(e @ BodyError::TooLarge { .. }) => {
            tracing::warn!(flow_id = %flow_id, url = %flow_request.url, error = %e, "Upstream response too large");
            return (StatusCode::BAD_GATEWAY, "Upstream response too large").into_response();
        }
        Err(BodyError::Read { partial, source }) => {
            tracing::warn!(
                flow_id = %flow_id,
                url = %flow_request.url,
                received = partial.len(),
                error = %source,
                "Upstream response body unreadable, logging it empty"
            );
            (Bytes::new(), partial, true)
        }
    };

    let flow_response = FlowResponse {
        status: parts.status,
        headers: parts.headers.clone(),
        body: logged,
    };
    state.hooks.on_response(flow_id, &flow_response);

    strip_hop_by_hop(&mut parts.headers);
    if truncated {
        parts.headers.remove(header::CONTENT_LENGTH);
    }
    Response::from_parts(parts, Body::from(relayed))
}

/// Target URL of a proxied request.
///
/// Absolute-form URIs are used as-is; origin-form ones are resolved
/// against the `Host` header.
fn absolute_url(parts: &Parts) -> Option<String> {
    if parts.uri.scheme().is_some() && parts.uri.authority().is_some() {
        return Some(parts.uri.to_string());
    }

    let host = parts
        .headers
        .get(header::HOST)
        .and_then(|v| v.to_str().ok())
        .filter(|h| !h.is_empty())?;
    let path = parts.uri.path_and_query().map(|p| p.as_str()).unwrap_or("/");

    Some(format!("http://{}{}", host, path))
}

fn forwarded_request(request: &FlowRequest, uri: Uri) -> Result<Request<Body>, axum::http::Error> {
    let mut headers: HeaderMap = request.headers.clone();
    strip_hop_by_hop(&mut headers);

    let mut builder = Request::builder().method(request.method.clone()).uri(uri);
    if let Some(map) = builder.headers_mut() {
        *map = headers;
    }
    builder.body(Body::from(request.body.clone()))
}
