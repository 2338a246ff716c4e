//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Observed request headers:
//!     → redaction.rs (mask sensitive values before they are logged)
//!
//! Forwarded request / returned response:
//!     → headers.rs (drop hop-by-hop headers)
//! ```
//!
//! # Design Decisions
//! - Masking is case-insensitive and applies only to the logged copy
//! - Real header values never leave the process through a log record

pub mod headers;
pub mod redaction;

pub use redaction::HeaderRedactor;
