//! The relay's flow hooks: filter, build, correlate, dispatch.

use std::sync::Arc;

use chrono::Utc;

use crate::config::LoggingConfig;
use crate::delivery::{DeliveryAction, DeliveryQueue};
use crate::flow::context::{FlowId, FlowRequest, FlowResponse};
use crate::flow::correlator::FlowCorrelator;
use crate::flow::hooks::FlowHooks;
use crate::observability::metrics;
use crate::record::{finalize_on_response, LogRecordBuilder};
use crate::routing::RouteFilter;
use crate::security::redaction::HeaderRedactor;

/// Turns observed flows into delivered log records.
pub struct FlowLogger {
    filter: RouteFilter,
    builder: LogRecordBuilder,
    correlator: Arc<FlowCorrelator>,
    queue: DeliveryQueue,
}

impl FlowLogger {
    pub fn new(config: &LoggingConfig, correlator: Arc<FlowCorrelator>, queue: DeliveryQueue) -> Self {
        Self {
            filter: RouteFilter::from_config(&config.excluded_routes),
            builder: LogRecordBuilder::new(HeaderRedactor::new(&config.mask_headers)),
            correlator,
            queue,
        }
    }
}

impl FlowHooks for FlowLogger {
    fn on_request(&self, flow_id: FlowId, request: &FlowRequest) {
        if !self.filter.should_log(&request.url) {
            tracing::trace!(flow_id = %flow_id, url = %request.url, "Flow excluded from logging");
            metrics::record_flow("filtered");
            return;
        }

        let record = self.builder.build_on_request(flow_id, request);
        self.correlator.on_request_observed(flow_id, record.clone());
        metrics::record_in_flight(self.correlator.in_flight());

        self.queue.dispatch(record, DeliveryAction::Create);
    }

    fn on_response(&self, flow_id: FlowId, response: &FlowResponse) {
        let Some(mut record) = self.correlator.on_response_observed(flow_id) else {
            return;
        };
        metrics::record_in_flight(self.correlator.in_flight());

        let elapsed = (Utc::now() - record.occured_time).num_milliseconds();
        finalize_on_response(&mut record, response, elapsed);

        tracing::debug!(
            flow_id = %flow_id,
            method = %record.http_method,
            url = %record.http_url,
            status = response.status.as_u16(),
            elapsed_ms = elapsed,
            "Flow completed"
        );
        metrics::record_flow(record.log_type.as_str());

        self.queue.dispatch(record, DeliveryAction::Update);
    }

    fn on_teardown(&self, flow_id: FlowId) {
        if self.correlator.on_flow_torndown(flow_id) {
            metrics::record_flow("abandoned");
            metrics::record_in_flight(self.correlator.in_flight());
        }
    }
}
