//! Exponential backoff.

use std::time::Duration;

/// Delay to wait after the attempt with the given zero-based index.
///
/// `base × 2^attempt_index`, saturating instead of overflowing.
pub fn calculate_backoff(attempt_index: u32, base: Duration) -> Duration {
    let factor = 1u32.checked_shl(attempt_index).unwrap_or(u32::MAX);
    base.saturating_mul(factor)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backoff_calculation() {
        let base = Duration::from_millis(500);
        assert_eq!(calculate_backoff(0, base), Duration::from_millis(500));
        assert_eq!(calculate_backoff(1, base), Duration::from_millis(1000));
        assert_eq!(calculate_backoff(2, base), Duration::from_millis(2000));
        assert_eq!(calculate_backoff(3, base), Duration::from_millis(4000));
    }

    #[test]
    fn test_backoff_strictly_increasing() {
        let base = Duration::from_millis(10);
        let delays: Vec<_> = (0..8).map(|i| calculate_backoff(i, base)).collect();
        assert!(delays.windows(2).all(|w| w[1] == w[0] * 2));
    }

    #[test]
    fn test_backoff_saturates() {
        let max = calculate_backoff(64, Duration::from_secs(1));
        assert!(max >= calculate_backoff(31, Duration::from_secs(1)));
        assert_eq!(calculate_backoff(3, Duration::ZERO), Duration::ZERO);
    }
}
