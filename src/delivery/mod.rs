//! Delivery subsystem.
//!
//! # Data Flow
//! ```text
//! flow callback
//!     → queue.rs (try_send onto bounded channel; never blocks)
//!     → dispatcher task (semaphore-capped concurrent deliveries)
//!     → client.rs (serialize, POST, retry with backoff)
//!     → transport.rs (reqwest)
//!     → stats.rs / metrics (outcome counters)
//! ```
//!
//! # Design Decisions
//! - Best effort: failures are logged locally and never reach the proxied flow
//! - No ordering between a record's create and update deliveries

pub mod client;
pub mod error;
pub mod queue;
pub mod stats;
pub mod transport;

pub use client::{DeliveryAction, DeliveryClient, DeliveryReport};
pub use error::{DeliveryError, TransportError};
pub use queue::DeliveryQueue;
pub use stats::{DeliveryStats, StatsSnapshot};
pub use transport::{HttpTransport, Transport};
