//! Bounded work queue feeding delivery tasks.
//!
//! # Responsibilities
//! - Accept deliveries from flow callbacks without blocking them
//! - Run deliveries concurrently, at most `max_in_flight` at a time
//! - Drain buffered and in-flight deliveries on shutdown, up to a deadline
//!
//! # Design Decisions
//! - `try_send` on a bounded channel: a full queue drops the delivery and
//!   counts it rather than stalling the proxied traffic
//! - Concurrency capped with a semaphore, same as the listener's connection cap
//! - Deliveries still running after the drain deadline are aborted

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::{broadcast, mpsc, Semaphore};
use tokio::task::{JoinHandle, JoinSet};

use crate::config::DeliveryConfig;
use crate::delivery::client::{DeliveryAction, DeliveryClient};
use crate::delivery::stats::DeliveryStats;
use crate::observability::metrics;
use crate::record::model::LogRecord;

/// One queued delivery: an immutable record snapshot and what to do with it.
#[derive(Debug)]
pub struct DeliveryJob {
    pub record: LogRecord,
    pub action: DeliveryAction,
}

/// Handle used by flow callbacks to enqueue deliveries.
#[derive(Debug, Clone)]
pub struct DeliveryQueue {
    tx: mpsc::Sender<DeliveryJob>,
    stats: Arc<DeliveryStats>,
}

impl DeliveryQueue {
    /// Start the dispatcher task.
    ///
    /// Returns the queue handle and the dispatcher's join handle, which
    /// completes once shutdown draining has finished.
    pub fn start(
        client: DeliveryClient,
        config: &DeliveryConfig,
        shutdown: broadcast::Receiver<()>,
    ) -> (Self, JoinHandle<()>) {
        let (tx, rx) = mpsc::channel(config.queue_capacity.max(1));
        let stats = client.stats().clone();

        let dispatcher = Dispatcher {
            rx,
            client,
            permits: Arc::new(Semaphore::new(config.max_in_flight.max(1))),
            drain_timeout: Duration::from_secs(config.drain_timeout_secs),
            tasks: JoinSet::new(),
        };
        let handle = tokio::spawn(dispatcher.run(shutdown));

        (Self { tx, stats }, handle)
    }

    /// Enqueue a delivery. Never waits.
    ///
    /// Returns false if the delivery was dropped.
    pub fn dispatch(&self, record: LogRecord, action: DeliveryAction) -> bool {
        match self.tx.try_send(DeliveryJob { record, action }) {
            Ok(()) => true,
            Err(TrySendError::Full(job)) => {
                self.drop_job(&job, "queue full");
                false
            }
            Err(TrySendError::Closed(job)) => {
                self.drop_job(&job, "queue closed");
                false
            }
        }
    }

    /// Deliveries waiting for a dispatcher slot.
    pub fn depth(&self) -> usize {
        self.tx.max_capacity() - self.tx.capacity()
    }

    pub fn stats(&self) -> &Arc<DeliveryStats> {
        &self.stats
    }

    fn drop_job(&self, job: &DeliveryJob, reason: &'static str) {
        self.stats.record_dropped();
        metrics::record_delivery_dropped(job.action.as_str(), reason);
        tracing::warn!(
            record_id = %job.record.id,
            action = %job.action,
            reason,
            "Dropped log delivery"
        );
    }
}

struct Dispatcher {
    rx: mpsc::Receiver<DeliveryJob>,
    client: DeliveryClient,
    permits: Arc<Semaphore>,
    drain_timeout: Duration,
    tasks: JoinSet<()>,
}

impl Dispatcher {
    async fn run(mut self, mut shutdown: broadcast::Receiver<()>) {
        loop {
            tokio::select! {
                job = self.rx.recv() => match job {
                    Some(job) => self.spawn(job).await,
                    None => break,
                },
                Some(_) = self.tasks.join_next(), if !self.tasks.is_empty() => {}
                _ = shutdown.recv() => {
                    tracing::info!("Delivery queue received shutdown signal, draining");
                    break;
                }
            }
        }

        self.rx.close();
        let drain_timeout = self.drain_timeout;

        let drained = tokio::time::timeout(drain_timeout, async {
            while let Some(job) = self.rx.recv().await {
                self.spawn(job).await;
            }
            while self.tasks.join_next().await.is_some() {}
        })
        .await;

        if drained.is_err() {
            tracing::warn!(
                remaining = self.tasks.len(),
                timeout_secs = drain_timeout.as_secs(),
                "Delivery drain deadline reached, aborting remaining deliveries"
            );
            self.tasks.abort_all();
        }

        tracing::info!("Delivery queue stopped");
    }

    async fn spawn(&mut self, job: DeliveryJob) {
        let permit = match self.permits.clone().acquire_owned().await {
            Ok(permit) => permit,
            Err(_) => {
                tracing::error!(record_id = %job.record.id, "Delivery semaphore closed");
                return;
            }
        };

        let client = self.client.clone();
        self.tasks.spawn(async move {
            client.deliver_and_report(job.record, job.action).await;
            drop(permit);
        });
    }
}
