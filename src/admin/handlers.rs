use axum::{extract::State, Json};
use serde::Serialize;

use crate::admin::AdminState;
use crate::delivery::StatsSnapshot;

#[derive(Serialize)]
pub struct SystemStatus {
    pub version: &'static str,
    pub status: &'static str,
    pub uptime_secs: u64,
    pub proxy_port: u16,
    pub in_flight_flows: usize,
    pub queue_depth: usize,
}

#[derive(Serialize)]
pub struct RelayStats {
    pub in_flight_flows: usize,
    pub queue_depth: usize,
    pub deliveries: StatsSnapshot,
}

pub async fn get_status(State(state): State<AdminState>) -> Json<SystemStatus> {
    Json(SystemStatus {
        version: env!("CARGO_PKG_VERSION"),
        status: "operational",
        uptime_secs: state.started.elapsed().as_secs(),
        proxy_port: state.proxy_port,
        in_flight_flows: state.correlator.in_flight(),
        queue_depth: state.queue.depth(),
    })
}

pub async fn get_stats(State(state): State<AdminState>) -> Json<RelayStats> {
    Json(RelayStats {
        in_flight_flows: state.correlator.in_flight(),
        queue_depth: state.queue.depth(),
        deliveries: state.queue.stats().snapshot(),
    })
}
