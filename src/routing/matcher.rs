//! URL matching logic.
//!
//! # Design Decisions
//! - Matching is case-sensitive substring containment against the full URL
//! - Empty patterns are rejected at construction (they would match everything)
//! - No regex to guarantee O(n) matching

/// Trait for matching a request URL against a condition.
pub trait Matcher: Send + Sync + std::fmt::Debug {
    /// Returns true if the URL matches this condition.
    fn matches(&self, url: &str) -> bool;
}

/// Matches when the pattern occurs anywhere in the URL.
#[derive(Debug, Clone)]
pub struct SubstringMatcher {
    pattern: String,
}

impl SubstringMatcher {
    /// Create a new substring matcher. Returns `None` for an empty pattern.
    pub fn new(pattern: impl Into<String>) -> Option<Self> {
        let pattern = pattern.into();
        if pattern.is_empty() {
            None
        } else {
            Some(Self { pattern })
        }
    }
}

impl Matcher for SubstringMatcher {
    fn matches(&self, url: &str) -> bool {
        url.contains(&self.pattern)
    }
}
