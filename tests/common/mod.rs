//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::atomic::{AtomicU16, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde_json::Value;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use flow_relay::config::{DeliveryConfig, LoggingConfig, ProxyConfig};
use flow_relay::delivery::{DeliveryClient, DeliveryQueue, DeliveryStats};
use flow_relay::flow::{FlowCorrelator, FlowLogger};
use flow_relay::{ProxyServer, Shutdown};

async fn serve(router: Router) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    addr
}

/// Upstream service the proxied client talks to.
pub async fn start_mock_upstream() -> SocketAddr {
    let router = Router::new()
        .route("/", get(|| async { "hello" }))
        .route("/missing", get(|| async { (StatusCode::NOT_FOUND, "not found") }))
        .route("/health/check", get(|| async { "ok" }))
        .route("/broken", get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "boom") }))
        .route("/echo", post(|body: Bytes| async move { body }))
        .route(
            "/slow",
            get(|| async {
                tokio::time::sleep(Duration::from_millis(300)).await;
                "slow"
            }),
        );
    serve(router).await
}

/// Upstream that promises more body than it sends, then hangs up.
pub async fn start_truncating_upstream() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            tokio::spawn(async move {
                let mut buf = [0u8; 4096];
                let _ = socket.read(&mut buf).await;
                let response = "HTTP/1.1 200 OK\r\nContent-Length: 100\r\nConnection: close\r\n\r\nhello";
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            });
        }
    });
    addr
}

/// One POST received by the mock logging backend.
#[derive(Debug, Clone)]
pub struct Received {
    pub path: String,
    pub body: Value,
}

/// Logging backend that records every delivery and answers with a fixed status.
#[derive(Clone, Default)]
pub struct MockLogger {
    received: Arc<Mutex<Vec<Received>>>,
    hits: Arc<AtomicUsize>,
    status: Arc<AtomicU16>,
}

impl MockLogger {
    pub async fn start(status: u16) -> (Self, SocketAddr) {
        let logger = MockLogger::default();
        logger.status.store(status, Ordering::SeqCst);

        let router = Router::new()
            .route("/api/logs", post(create))
            .route("/api/logs/update", post(update))
            .with_state(logger.clone());
        let addr = serve(router).await;
        (logger, addr)
    }

    pub fn received(&self) -> Vec<Received> {
        self.received.lock().unwrap().clone()
    }

    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }

    fn record(&self, path: &str, body: Value) -> StatusCode {
        self.hits.fetch_add(1, Ordering::SeqCst);
        self.received.lock().unwrap().push(Received {
            path: path.to_string(),
            body,
        });
        StatusCode::from_u16(self.status.load(Ordering::SeqCst)).unwrap()
    }
}

async fn create(State(logger): State<MockLogger>, Json(body): Json<Value>) -> StatusCode {
    logger.record("/api/logs", body)
}

async fn update(State(logger): State<MockLogger>, Json(body): Json<Value>) -> StatusCode {
    logger.record("/api/logs/update", body)
}

/// A relay wired to a mock logging backend.
pub struct TestRelay {
    pub proxy_addr: SocketAddr,
    pub correlator: Arc<FlowCorrelator>,
    pub queue: DeliveryQueue,
    shutdown: Shutdown,
    drain: Shutdown,
    proxy: JoinHandle<std::io::Result<()>>,
    dispatcher: JoinHandle<()>,
}

impl TestRelay {
    pub async fn start(logger_addr: SocketAddr, delivery: DeliveryConfig, logging: LoggingConfig) -> Self {
        Self::start_with_proxy(logger_addr, delivery, logging, ProxyConfig::default()).await
    }

    pub async fn start_with_proxy(
        logger_addr: SocketAddr,
        delivery: DeliveryConfig,
        logging: LoggingConfig,
        proxy: ProxyConfig,
    ) -> Self {
        let delivery = DeliveryConfig {
            logger_endpoint: format!("http://{}/api/logs", logger_addr),
            ..delivery
        };

        let shutdown = Shutdown::new();
        let drain = Shutdown::new();
        let client = DeliveryClient::new(&delivery, Arc::new(DeliveryStats::new())).unwrap();
        let (queue, dispatcher) = DeliveryQueue::start(client, &delivery, drain.subscribe());

        let correlator = Arc::new(FlowCorrelator::new());
        let hooks = Arc::new(FlowLogger::new(&logging, correlator.clone(), queue.clone()));

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let proxy_addr = listener.local_addr().unwrap();
        let server = ProxyServer::new(proxy, hooks);
        let proxy = tokio::spawn(server.run(listener, shutdown.signalled()));

        Self {
            proxy_addr,
            correlator,
            queue,
            shutdown,
            drain,
            proxy,
            dispatcher,
        }
    }

    /// HTTP client that sends everything through the relay.
    pub fn client(&self) -> reqwest::Client {
        reqwest::Client::builder()
            .proxy(reqwest::Proxy::http(format!("http://{}", self.proxy_addr)).unwrap())
            .build()
            .unwrap()
    }

    /// Stop the relay: let in-flight flows finish, then drain queued deliveries.
    pub async fn stop(self) {
        self.shutdown.trigger();
        self.proxy.await.unwrap().unwrap();
        self.drain.trigger();
        self.dispatcher.await.unwrap();
    }
}
