//! Retry classification for deliveries.
//!
//! # Design Decisions
//! - Transport errors (connect, timeout, reset) are always retryable
//! - 5xx means the backend may recover; retry
//! - Anything below 500 completes the delivery (4xx is logged, not retried)

/// Returns true if a delivery attempt that ended this way should be retried.
///
/// `status` is `None` when the attempt failed before a response arrived.
pub fn is_retryable(status: Option<u16>) -> bool {
    match status {
        Some(code) => code >= 500,
        None => true,
    }
}
