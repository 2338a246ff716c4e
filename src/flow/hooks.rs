//! Callback surface between an interception engine and the relay.

use crate::flow::context::{FlowId, FlowRequest, FlowResponse};

/// Per-flow callbacks invoked by the interception engine.
///
/// For a given flow the engine calls `on_request` at most once, then
/// `on_response` at most once, then `on_teardown` exactly once. Callbacks of
/// different flows may run concurrently on any thread. Implementations must
/// return promptly and must not fail the flow.
pub trait FlowHooks: Send + Sync + 'static {
    fn on_request(&self, flow_id: FlowId, request: &FlowRequest);

    fn on_response(&self, flow_id: FlowId, response: &FlowResponse);

    fn on_teardown(&self, flow_id: FlowId);
}
