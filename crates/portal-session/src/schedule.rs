// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Refresh timing.

use std::time::Duration;

/// Default minimum delay before a refresh.
pub const DEFAULT_REFRESH_FLOOR: Duration = Duration::from_secs(15);

/// Default share of the token lifetime to wait before refreshing.
pub const DEFAULT_REFRESH_FRACTION: f64 = 0.9;

/// When to refresh a session token.
///
/// The delay is `max(floor, ttl * fraction)`. A TTL shorter than the floor
/// lets the token lapse before the refresh; the holder then reports no
/// token until the refresh lands.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RefreshPolicy {
    /// Minimum delay.
    pub floor: Duration,
    /// Share of the TTL, in `(0, 1]`.
    pub fraction: f64,
}

impl Default for RefreshPolicy {
    fn default() -> Self {
        Self {
            floor: DEFAULT_REFRESH_FLOOR,
            fraction: DEFAULT_REFRESH_FRACTION,
        }
    }
}

impl RefreshPolicy {
    /// Creates a policy.
    ///
    /// Fractions outside `(0, 1]` fall back to the default.
    pub fn new(floor: Duration, fraction: f64) -> Self {
        let fraction = if fraction > 0.0 && fraction <= 1.0 {
            fraction
        } else {
            DEFAULT_REFRESH_FRACTION
        };
        Self { floor, fraction }
    }

    /// Returns the delay before refreshing a token that lives for `ttl`.
    pub fn delay(&self, ttl: Duration) -> Duration {
        ttl.mul_f64(self.fraction).max(self.floor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_delay() {
        let policy = RefreshPolicy::default();
        assert_eq!(policy.delay(Duration::from_secs(300)), Duration::from_secs(270));
        assert_eq!(policy.delay(Duration::from_secs(3600)), Duration::from_secs(3240));
    }

    #[test]
    fn test_floor_respected() {
        let policy = RefreshPolicy::default();
        assert_eq!(policy.delay(Duration::from_secs(10)), Duration::from_secs(15));
        assert_eq!(policy.delay(Duration::ZERO), Duration::from_secs(15));
    }

    #[test]
    fn test_invalid_fraction_falls_back() {
        let policy = RefreshPolicy::new(Duration::from_secs(1), 1.5);
        assert_eq!(policy.fraction, DEFAULT_REFRESH_FRACTION);

        let policy = RefreshPolicy::new(Duration::from_secs(1), 0.5);
        assert_eq!(policy.delay(Duration::from_secs(100)), Duration::from_secs(50));
    }
}
