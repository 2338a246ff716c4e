//! Request/response correlation across the engine's callback boundary.
//!
//! # Responsibilities
//! - Hold the in-flight record for each logged flow
//! - Hand it back exactly once when the response arrives
//! - Drop leftovers when a flow is torn down without a response
//!
//! # Design Decisions
//! - Instance-owned concurrent map, shared via `Arc`, never a global
//! - `take` is an atomic remove: two racing callers cannot both receive the record
//! - Missing entries are a normal outcome (filtered, duplicate, or already consumed)

use dashmap::DashMap;

use crate::flow::context::FlowId;
use crate::record::model::LogRecord;

/// Concurrent store of in-flight log records keyed by flow.
#[derive(Debug, Default)]
pub struct FlowCorrelator {
    pending: DashMap<FlowId, LogRecord>,
}

impl FlowCorrelator {
    /// Create an empty correlator.
    pub fn new() -> Self {
        Self {
            pending: DashMap::new(),
        }
    }

    /// Store the request-time record for a flow.
    ///
    /// A second insert for the same flow replaces the first.
    pub fn on_request_observed(&self, flow_id: FlowId, record: LogRecord) {
        if self.pending.insert(flow_id, record).is_some() {
            tracing::warn!(flow_id = %flow_id, "Replaced existing in-flight record");
        }
    }

    /// Remove and return the stored record, if any.
    pub fn on_response_observed(&self, flow_id: FlowId) -> Option<LogRecord> {
        self.pending.remove(&flow_id).map(|(_, record)| record)
    }

    /// Discard any record still held for a finished flow.
    ///
    /// Returns true if an entry was removed.
    pub fn on_flow_torndown(&self, flow_id: FlowId) -> bool {
        let removed = self.pending.remove(&flow_id).is_some();
        if removed {
            tracing::debug!(flow_id = %flow_id, "Discarded record for flow without response");
        }
        removed
    }

    /// Number of flows currently awaiting a response.
    pub fn in_flight(&self) -> usize {
        self.pending.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::model::LogType;
    use chrono::Utc;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn record(id: &str) -> LogRecord {
        LogRecord {
            id: id.to_string(),
            correlation_id: id.to_string(),
            client_name: "Anonymous".into(),
            user: "Anonymous".into(),
            occured_time: Utc::now(),
            http_method: "GET".into(),
            http_url: "http://example.com/".into(),
            http_headers: HashMap::new(),
            http_body: String::new(),
            log_text_short: "Request intercepted".into(),
            log_text: "Request intercepted: GET http://example.com/".into(),
            http_return_code: None,
            http_response_body: None,
            execution_time: None,
            log_type: LogType::Info,
        }
    }

    #[test]
    fn test_take_once() {
        let correlator = FlowCorrelator::new();
        let flow = FlowId::new();

        correlator.on_request_observed(flow, record("a"));
        assert_eq!(correlator.in_flight(), 1);

        let taken = correlator.on_response_observed(flow).unwrap();
        assert_eq!(taken.id, "a");
        assert!(correlator.on_response_observed(flow).is_none());
        assert_eq!(correlator.in_flight(), 0);
    }

    #[test]
    fn test_unknown_flow_is_none() {
        let correlator = FlowCorrelator::new();
        assert!(correlator.on_response_observed(FlowId::new()).is_none());
        assert!(!correlator.on_flow_torndown(FlowId::new()));
    }

    #[test]
    fn test_teardown_removes_leftover() {
        let correlator = FlowCorrelator::new();
        let flow = FlowId::new();

        correlator.on_request_observed(flow, record("a"));
        assert!(correlator.on_flow_torndown(flow));
        assert!(correlator.on_response_observed(flow).is_none());
    }

    #[test]
    fn test_teardown_after_response_is_noop() {
        let correlator = FlowCorrelator::new();
        let flow = FlowId::new();

        correlator.on_request_observed(flow, record("a"));
        assert!(correlator.on_response_observed(flow).is_some());
        assert!(!correlator.on_flow_torndown(flow));
    }

    #[test]
    fn test_concurrent_take_delivers_once() {
        let correlator = Arc::new(FlowCorrelator::new());
        let flows: Vec<FlowId> = (0..200).map(|_| FlowId::new()).collect();
        for (i, flow) in flows.iter().enumerate() {
            correlator.on_request_observed(*flow, record(&i.to_string()));
        }

        let taken = Arc::new(AtomicUsize::new(0));
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let correlator = correlator.clone();
                let taken = taken.clone();
                let flows = flows.clone();
                std::thread::spawn(move || {
                    for flow in flows {
                        if correlator.on_response_observed(flow).is_some() {
                            taken.fetch_add(1, Ordering::SeqCst);
                        }
                    }
                })
            })
            .collect();

        for h in handles {
            h.join().unwrap();
        }

        assert_eq!(taken.load(Ordering::SeqCst), 200);
        assert_eq!(correlator.in_flight(), 0);
    }
}
