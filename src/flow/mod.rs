//! Flow observation subsystem.
//!
//! # Data Flow
//! ```text
//! Interception engine
//!     → hooks.rs (on_request / on_response / on_teardown)
//!     → logger.rs (route filter, record builder)
//!     → correlator.rs (in-flight record per flow)
//!     → delivery queue (create, then update)
//! ```

pub mod context;
pub mod correlator;
pub mod hooks;
pub mod logger;

pub use context::{FlowId, FlowRequest, FlowResponse};
pub use correlator::FlowCorrelator;
pub use hooks::FlowHooks;
pub use logger::FlowLogger;
