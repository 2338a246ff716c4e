//! Log record subsystem.
//!
//! # Data Flow
//! ```text
//! on request:  FlowRequest → builder.rs (build_on_request) → LogRecord { info }
//! on response: LogRecord + FlowResponse → builder.rs (finalize_on_response)
//!              → LogRecord { status, body, timing, recomputed severity }
//! ```

pub mod builder;
pub mod model;

pub use builder::{finalize_on_response, LogRecordBuilder, ANONYMOUS};
pub use model::{LogRecord, LogType};
