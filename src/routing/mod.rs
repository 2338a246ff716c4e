//! Route filtering subsystem.
//!
//! # Data Flow
//! ```text
//! Request URL (full string)
//!     → filter.rs (should this flow be logged?)
//!     → matcher.rs (evaluate each exclusion pattern)
//!     → Return: Log or Skip
//!
//! Filter Compilation (at startup):
//!     excluded_routes[]
//!     → one SubstringMatcher per non-empty pattern
//!     → Freeze as immutable RouteFilter
//! ```
//!
//! # Design Decisions
//! - Filter built at startup, immutable at runtime
//! - No regex in hot path (substring containment only)
//! - Deterministic and side-effect free

pub mod filter;
pub mod matcher;

pub use filter::RouteFilter;
pub use matcher::{Matcher, SubstringMatcher};
