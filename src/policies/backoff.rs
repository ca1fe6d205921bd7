//! # Backoff policy for retried work.
//!
//! [`BackoffPolicy`] bundles everything the retry engine needs to schedule
//! attempts: the attempt budget, a [`BackoffStrategy`] that maps an attempt
//! number to a base delay, and a [`Jitter`] applied on top.
//!
//! Both strategies treat the first attempt as undelayed: `delay(1)` is always
//! zero. Delays only separate an attempt from the one before it.
//!
//! # Example
//! ```rust
//! use std::time::Duration;
//! use taskgate::BackoffPolicy;
//!
//! let policy = BackoffPolicy::exponential(
//!     5,
//!     Duration::from_millis(100),
//!     2.0,
//!     Duration::from_secs(1),
//! );
//!
//! // First attempt runs immediately.
//! assert_eq!(policy.delay(1), Duration::ZERO);
//! // Second attempt waits the start delay.
//! assert_eq!(policy.delay(2), Duration::from_millis(100));
//! // Growth is capped.
//! assert_eq!(policy.delay(6), Duration::from_secs(1));
//! ```

use std::time::Duration;

use crate::policies::jitter::Jitter;

/// Maps an attempt number to the base delay that precedes it.
///
/// Strategies are plain values, so a policy can be built, copied, and shared
/// without any shared state beyond its configuration.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum BackoffStrategy {
    /// A fixed delay before every attempt after the first.
    Constant {
        /// Delay between consecutive attempts.
        delay: Duration,
    },

    /// Geometric growth: the second attempt waits `start`, and each later
    /// attempt waits the previous delay times `factor`, clamped to `cap`.
    ///
    /// The clamp applies from the third attempt onward; `start` itself is
    /// used as given even when it exceeds `cap`.
    Exponential {
        /// Delay before the second attempt.
        start: Duration,
        /// Multiplicative growth factor (values below 1.0 are treated as 1.0).
        factor: f64,
        /// Upper bound for grown delays.
        cap: Duration,
    },
}

impl BackoffStrategy {
    /// Computes the unjittered delay preceding `attempt` (1-based).
    fn base_delay(&self, attempt: u32) -> Duration {
        if attempt <= 1 {
            return Duration::ZERO;
        }
        match *self {
            BackoffStrategy::Constant { delay } => delay,
            BackoffStrategy::Exponential { start, factor, cap } => {
                if attempt == 2 {
                    return start;
                }
                let factor = factor.max(1.0);
                let exponent = (attempt - 2).min(i32::MAX as u32) as i32;
                let grown = start.as_secs_f64() * factor.powi(exponent);
                let cap_secs = cap.as_secs_f64();
                if !grown.is_finite() || grown < 0.0 || grown > cap_secs {
                    cap
                } else {
                    Duration::from_secs_f64(grown)
                }
            }
        }
    }
}

/// Retry scheduling policy: attempt budget, delay strategy, and jitter.
///
/// Immutable once constructed; the retry engine reads it, never mutates it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BackoffPolicy {
    /// Total number of attempts the engine may make (0 means none).
    pub max_attempts: u32,
    /// How base delays evolve across attempts.
    pub strategy: BackoffStrategy,
    /// Randomization applied to every non-zero delay.
    pub jitter: Jitter,
}

impl BackoffPolicy {
    /// A constant-interval policy with no jitter.
    pub fn constant(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts,
            strategy: BackoffStrategy::Constant { delay },
            jitter: Jitter::DISABLED,
        }
    }

    /// An exponential policy with no jitter.
    pub fn exponential(max_attempts: u32, start: Duration, factor: f64, cap: Duration) -> Self {
        Self {
            max_attempts,
            strategy: BackoffStrategy::Exponential { start, factor, cap },
            jitter: Jitter::DISABLED,
        }
    }

    /// Returns the policy with the given jitter applied to its delays.
    pub fn with_jitter(mut self, jitter: Jitter) -> Self {
        self.jitter = jitter;
        self
    }

    /// Computes the (jittered) delay preceding `attempt` (1-based).
    ///
    /// `delay(1)` is always [`Duration::ZERO`]; jitter never turns an
    /// undelayed attempt into a delayed one.
    pub fn delay(&self, attempt: u32) -> Duration {
        self.jitter.apply(self.strategy.base_delay(attempt))
    }
}

impl Default for BackoffPolicy {
    /// Returns a policy with:
    /// - `max_attempts = 3`;
    /// - constant 100ms delay;
    /// - no jitter.
    fn default() -> Self {
        BackoffPolicy::constant(3, Duration::from_millis(100))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_attempt_is_undelayed() {
        let constant = BackoffPolicy::constant(3, Duration::from_millis(500));
        let exponential = BackoffPolicy::exponential(
            3,
            Duration::from_millis(500),
            2.0,
            Duration::from_secs(30),
        );
        assert_eq!(constant.delay(1), Duration::ZERO);
        assert_eq!(exponential.delay(1), Duration::ZERO);
    }

    #[test]
    fn constant_delay_is_fixed_after_first() {
        let policy = BackoffPolicy::constant(10, Duration::from_millis(500));
        for attempt in 2..12 {
            assert_eq!(
                policy.delay(attempt),
                Duration::from_millis(500),
                "attempt {} should wait 500ms",
                attempt
            );
        }
    }

    #[test]
    fn exponential_sequence_no_jitter() {
        let policy = BackoffPolicy::exponential(
            6,
            Duration::from_millis(100),
            2.0,
            Duration::from_secs(30),
        );
        assert_eq!(policy.delay(2), Duration::from_millis(100));
        assert_eq!(policy.delay(3), Duration::from_millis(200));
        assert_eq!(policy.delay(4), Duration::from_millis(400));
        assert_eq!(policy.delay(5), Duration::from_millis(800));
    }

    #[test]
    fn exponential_clamps_to_cap() {
        let policy = BackoffPolicy::exponential(
            20,
            Duration::from_millis(100),
            2.0,
            Duration::from_secs(1),
        );
        assert_eq!(policy.delay(6), Duration::from_secs(1));
        assert_eq!(policy.delay(12), Duration::from_secs(1));
    }

    #[test]
    fn start_above_cap_is_used_once_then_clamped() {
        let policy = BackoffPolicy::exponential(
            5,
            Duration::from_secs(10),
            2.0,
            Duration::from_secs(5),
        );
        assert_eq!(policy.delay(2), Duration::from_secs(10));
        assert_eq!(policy.delay(3), Duration::from_secs(5));
        assert_eq!(policy.delay(4), Duration::from_secs(5));
    }

    #[test]
    fn sub_unit_factor_behaves_as_constant() {
        let policy = BackoffPolicy::exponential(
            5,
            Duration::from_millis(200),
            0.5,
            Duration::from_secs(30),
        );
        assert_eq!(policy.delay(2), Duration::from_millis(200));
        assert_eq!(policy.delay(3), Duration::from_millis(200));
        assert_eq!(policy.delay(4), Duration::from_millis(200));
    }

    #[test]
    fn huge_attempt_clamps_to_cap() {
        let policy = BackoffPolicy::exponential(
            u32::MAX,
            Duration::from_millis(100),
            2.0,
            Duration::from_secs(60),
        );
        assert_eq!(policy.delay(100), Duration::from_secs(60));
        assert_eq!(policy.delay(u32::MAX), Duration::from_secs(60));
    }

    #[test]
    fn jittered_delay_stays_in_bounds() {
        let policy = BackoffPolicy::constant(10, Duration::from_millis(1000))
            .with_jitter(Jitter::fraction(0.25));
        for attempt in 2..50 {
            let d = policy.delay(attempt);
            assert!(d >= Duration::from_millis(750), "delay {d:?} below bound");
            assert!(d <= Duration::from_millis(1250), "delay {d:?} above bound");
        }
        assert_eq!(policy.delay(1), Duration::ZERO);
    }

    #[test]
    fn default_is_constant_three_attempts() {
        let policy = BackoffPolicy::default();
        assert_eq!(policy.max_attempts, 3);
        assert_eq!(policy.delay(2), Duration::from_millis(100));
        assert_eq!(policy.delay(5), Duration::from_millis(100));
    }
}
