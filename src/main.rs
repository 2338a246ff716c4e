//! Flow relay
//!
//! ```text
//!     Client ──▶ ProxyServer ──────────────────────────▶ Upstream
//!                  │ on_request / on_response / on_teardown
//!                  ▼
//!              FlowLogger ── RouteFilter, LogRecordBuilder
//!                  │             │
//!                  │        FlowCorrelator (in-flight records)
//!                  ▼
//!             DeliveryQueue ──▶ DeliveryClient ──▶ Logging backend
//!                                 (create, then update, with retries)
//! ```

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use clap::Parser;
use tokio::net::TcpListener;

use flow_relay::admin::{setup_admin_router, AdminState};
use flow_relay::config::resolve_config;
use flow_relay::delivery::{DeliveryClient, DeliveryQueue, DeliveryStats};
use flow_relay::flow::{FlowCorrelator, FlowLogger};
use flow_relay::lifecycle::{wait_for_signal, Shutdown};
use flow_relay::observability::{init_tracing, metrics};
use flow_relay::ProxyServer;

#[derive(Parser)]
#[command(name = "flow-relay", version, about = "Observe proxied HTTP flows and ship them to a logging backend")]
struct Args {
    /// TOML configuration file; environment variables override it.
    #[arg(short, long, env = "FLOW_RELAY_CONFIG")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    // Env override warnings are emitted before the configured subscriber exists.
    let config = tracing::subscriber::with_default(tracing_subscriber::fmt().finish(), || {
        resolve_config(args.config.as_deref())
    })?;

    init_tracing(&config.observability);
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "flow-relay starting");
    tracing::info!(
        proxy = %config.proxy.bind_address(),
        logger_endpoint = %config.delivery.logger_endpoint,
        max_retries = config.delivery.max_retries,
        retry_delay_ms = config.delivery.retry_delay_ms,
        excluded_routes = ?config.logging.excluded_routes,
        mask_headers = ?config.logging.mask_headers,
        web_enabled = config.web.enabled,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(e) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                error = %e,
                "Failed to parse metrics address"
            ),
        }
    }

    // Listeners stop first; the queue drains only once no flow can dispatch to it.
    let shutdown = Shutdown::new();
    let drain = Shutdown::new();

    let stats = Arc::new(DeliveryStats::new());
    let client = DeliveryClient::new(&config.delivery, stats)?;
    let (queue, dispatcher) = DeliveryQueue::start(client, &config.delivery, drain.subscribe());

    let correlator = Arc::new(FlowCorrelator::new());
    let logger = Arc::new(FlowLogger::new(&config.logging, correlator.clone(), queue.clone()));

    let proxy_listener = TcpListener::bind(config.proxy.bind_address()).await?;
    let proxy = ProxyServer::new(config.proxy.clone(), logger);
    let proxy_task = tokio::spawn(proxy.run(proxy_listener, shutdown.signalled()));

    let web_task = if config.web.enabled {
        let listener = TcpListener::bind(config.web.bind_address()).await?;
        tracing::info!(address = %listener.local_addr()?, "Web interface listening");

        let router = setup_admin_router(AdminState {
            correlator,
            queue,
            api_key: config.web.api_key.clone(),
            proxy_port: config.proxy.port,
            started: Instant::now(),
        });
        let signalled = shutdown.signalled();
        Some(tokio::spawn(async move {
            axum::serve(listener, router).with_graceful_shutdown(signalled).await
        }))
    } else {
        None
    };

    wait_for_signal().await;
    tracing::info!("Shutting down");
    shutdown.trigger();

    match proxy_task.await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => tracing::error!(error = %e, "Proxy server failed"),
        Err(e) => tracing::error!(error = %e, "Proxy task panicked"),
    }
    if let Some(task) = web_task {
        match task.await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => tracing::error!(error = %e, "Web interface failed"),
            Err(e) => tracing::error!(error = %e, "Web interface task panicked"),
        }
    }

    drain.trigger();
    if let Err(e) = dispatcher.await {
        tracing::error!(error = %e, "Delivery queue task panicked");
    }

    tracing::info!("Shutdown complete");
    Ok(())
}
