//! HTTP interception engine.
//!
//! # Data Flow
//! ```text
//! Client (proxy-configured)
//!     → server.rs (absolute-form / origin-form request, or CONNECT)
//!     → FlowHooks::on_request (buffered request)
//!     → upstream via hyper client (hop-by-hop headers stripped)
//!     → FlowHooks::on_response (buffered response)
//!     → Send to client
//!     → FlowHooks::on_teardown (always, via drop guard)
//! ```

pub mod body;
pub mod server;
pub mod tunnel;

pub use server::ProxyServer;
