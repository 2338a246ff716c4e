//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Delivery attempt to the logging backend:
//!     → retries.rs (is this outcome worth another attempt?)
//!     → backoff.rs (how long to wait before it)
//! ```
//!
//! # Design Decisions
//! - Connection errors and 5xx are retryable; anything below 500 is final
//! - Backoff is a pure power-of-two schedule from the base delay (no jitter),
//!   so the wait before attempt n+1 is always `base × 2^n`

pub mod backoff;
pub mod retries;
