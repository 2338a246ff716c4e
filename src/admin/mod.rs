//! Web interface: read-only status and delivery statistics.

pub mod auth;
pub mod handlers;

use std::sync::Arc;
use std::time::Instant;

use axum::{middleware, routing::get, Router};

use crate::delivery::DeliveryQueue;
use crate::flow::FlowCorrelator;

use self::auth::admin_auth_middleware;
use self::handlers::*;

/// State shared by the admin handlers.
#[derive(Debug, Clone)]
pub struct AdminState {
    pub correlator: Arc<FlowCorrelator>,
    pub queue: DeliveryQueue,
    pub api_key: Option<String>,
    pub proxy_port: u16,
    pub started: Instant,
}

pub fn setup_admin_router(state: AdminState) -> Router {
    Router::new()
        .route("/admin/status", get(get_status))
        .route("/admin/stats", get(get_stats))
        .layer(middleware::from_fn_with_state(state.clone(), admin_auth_middleware))
        .with_state(state)
}
