//! Traffic observation relay.
//!
//! Watches HTTP flows passing through a forward proxy, turns each into a
//! structured log record, and ships it to a remote logging backend in two
//! steps: a create when the request is seen, an update once the response is.

pub mod admin;
pub mod config;
pub mod delivery;
pub mod flow;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod record;
pub mod resilience;
pub mod routing;
pub mod security;

pub use config::RelayConfig;
pub use flow::{FlowHooks, FlowLogger};
pub use http::ProxyServer;
pub use lifecycle::Shutdown;
