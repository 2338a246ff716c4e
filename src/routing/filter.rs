//! Route filter deciding whether a flow is exempt from logging.
//!
//! # Responsibilities
//! - Store compiled exclusion matchers
//! - Answer "log this flow?" for a request URL
//!
//! # Design Decisions
//! - Immutable after construction (thread-safe without locks)
//! - Any single match exempts the flow
//! - An empty exclusion set logs everything

use crate::routing::matcher::{Matcher, SubstringMatcher};

/// Compiled set of exclusion patterns.
#[derive(Debug, Default)]
pub struct RouteFilter {
    exclusions: Vec<Box<dyn Matcher>>,
}

impl RouteFilter {
    /// Build a filter from configured exclusion substrings.
    pub fn from_config(patterns: &[String]) -> Self {
        let exclusions = patterns
            .iter()
            .filter_map(|p| SubstringMatcher::new(p.as_str()))
            .map(|m| Box::new(m) as Box<dyn Matcher>)
            .collect();

        Self { exclusions }
    }

    /// Returns true if a flow for this URL should be logged.
    pub fn should_log(&self, url: &str) -> bool {
        !self.exclusions.iter().any(|m| m.matches(url))
    }

    /// Number of active exclusion patterns.
    pub fn len(&self) -> usize {
        self.exclusions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.exclusions.is_empty()
    }
}
