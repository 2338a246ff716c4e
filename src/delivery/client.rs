//! Delivery of log records to the logging backend.
//!
//! # Responsibilities
//! - Serialize a record snapshot to JSON once per delivery
//! - POST creates to `{endpoint}` and updates to `{endpoint}/update`
//! - Retry transport errors and 5xx with exponential backoff
//! - Report the final outcome locally; never to the proxied flow
//!
//! # Design Decisions
//! - `max_retries + 1` attempts in total; no wait after the last one
//! - Status < 500 ends the delivery; 4xx is a rejection, not a retry

use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use bytes::Bytes;

use crate::config::DeliveryConfig;
use crate::delivery::error::{AttemptFailure, DeliveryError, DeliveryResult};
use crate::delivery::stats::DeliveryStats;
use crate::delivery::transport::{HttpTransport, Transport};
use crate::observability::metrics;
use crate::record::model::LogRecord;
use crate::resilience::backoff::calculate_backoff;
use crate::resilience::retries::is_retryable;

/// What the backend should do with the record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryAction {
    Create,
    Update,
}

impl DeliveryAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeliveryAction::Create => "create",
            DeliveryAction::Update => "update",
        }
    }
}

impl fmt::Display for DeliveryAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Successful end of a delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeliveryReport {
    /// Attempts made, including the successful one.
    pub attempts: u32,
    /// Final status returned by the backend.
    pub status: u16,
}

/// Sends records to the logging backend with bounded retries.
#[derive(Clone)]
pub struct DeliveryClient {
    transport: Arc<dyn Transport>,
    create_url: String,
    update_url: String,
    max_retries: u32,
    base_delay: Duration,
    stats: Arc<DeliveryStats>,
}

impl DeliveryClient {
    /// Create a client backed by an HTTP transport.
    pub fn new(config: &DeliveryConfig, stats: Arc<DeliveryStats>) -> DeliveryResult<Self> {
        let transport = HttpTransport::new(Duration::from_secs(config.request_timeout_secs))?;
        Ok(Self::with_transport(config, Arc::new(transport), stats))
    }

    /// Create a client over any transport.
    pub fn with_transport(
        config: &DeliveryConfig,
        transport: Arc<dyn Transport>,
        stats: Arc<DeliveryStats>,
    ) -> Self {
        let base = config.logger_endpoint.trim_end_matches('/');
        Self {
            transport,
            create_url: base.to_string(),
            update_url: format!("{}/update", base),
            max_retries: config.max_retries,
            base_delay: Duration::from_millis(config.retry_delay_ms),
            stats,
        }
    }

    /// URL a delivery of this kind is posted to.
    pub fn url_for(&self, action: DeliveryAction) -> &str {
        match action {
            DeliveryAction::Create => &self.create_url,
            DeliveryAction::Update => &self.update_url,
        }
    }

    pub fn stats(&self) -> &Arc<DeliveryStats> {
        &self.stats
    }

    /// Deliver a record, retrying until success or the retry budget runs out.
    pub async fn deliver(
        &self,
        record: &LogRecord,
        action: DeliveryAction,
    ) -> DeliveryResult<DeliveryReport> {
        let body = Bytes::from(serde_json::to_vec(record)?);
        let url = self.url_for(action);
        let total_attempts = self.max_retries.saturating_add(1);

        let mut last = AttemptFailure::Status(0);
        for attempt in 0..total_attempts {
            self.stats.record_attempt();

            let outcome = self.transport.post_json(url, body.clone()).await;
            let status = outcome.as_ref().ok().copied();

            if !is_retryable(status) {
                return Ok(DeliveryReport {
                    attempts: attempt + 1,
                    status: status.unwrap_or_default(),
                });
            }

            last = match outcome {
                Ok(code) => AttemptFailure::Status(code),
                Err(e) => AttemptFailure::Transport(e),
            };

            tracing::debug!(
                record_id = %record.id,
                action = %action,
                attempt = attempt + 1,
                error = %last,
                "Delivery attempt failed"
            );

            if attempt + 1 < total_attempts {
                tokio::time::sleep(calculate_backoff(attempt, self.base_delay)).await;
            }
        }

        Err(DeliveryError::Exhausted {
            attempts: total_attempts,
            last,
        })
    }

    /// Run a delivery to completion and report its outcome locally.
    ///
    /// Never returns an error: this is the fire-and-forget entry point.
    pub async fn deliver_and_report(&self, record: LogRecord, action: DeliveryAction) {
        let started = Instant::now();
        let result = self.deliver(&record, action).await;

        match result {
            Ok(report) if report.status < 400 => {
                self.stats.record_delivered();
                metrics::record_delivery(action.as_str(), "delivered", report.attempts, started);
                tracing::debug!(
                    record_id = %record.id,
                    action = %action,
                    status = report.status,
                    attempts = report.attempts,
                    "Record delivered"
                );
            }
            Ok(report) => {
                self.stats.record_rejected();
                metrics::record_delivery(action.as_str(), "rejected", report.attempts, started);
                tracing::warn!(
                    record_id = %record.id,
                    action = %action,
                    status = report.status,
                    "Logging backend rejected record"
                );
            }
            Err(DeliveryError::Exhausted { attempts, last }) => {
                self.stats.record_failed();
                metrics::record_delivery(action.as_str(), "failed", attempts, started);
                tracing::error!(
                    record_id = %record.id,
                    action = %action,
                    attempts,
                    error = %last,
                    "Failed to deliver record to logging backend"
                );
            }
            Err(e) => {
                self.stats.record_failed();
                metrics::record_delivery(action.as_str(), "abandoned", 0, started);
                tracing::error!(record_id = %record.id, action = %action, error = %e, "Delivery abandoned");
            }
        }
    }
}

impl fmt::Debug for DeliveryClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeliveryClient")
            .field("create_url", &self.create_url)
            .field("update_url", &self.update_url)
            .field("max_retries", &self.max_retries)
            .field("base_delay", &self.base_delay)
            .finish()
    }
}
