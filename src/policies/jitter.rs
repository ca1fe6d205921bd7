//! # Jitter for retry delays.
//!
//! [`Jitter`] perturbs a computed backoff delay by a bounded random factor to
//! prevent thundering-herd effects when many callers retry on the same
//! schedule.
//!
//! The perturbation is multiplicative: a delay `d` becomes a uniform random
//! value in `[d × (1 − f), d × (1 + f)]`, where `f` is the jitter fraction.
//! A fraction of `0.0` disables jitter entirely, which keeps delay schedules
//! deterministic (and testable).

use std::time::Duration;

use rand::Rng;

/// Bounded multiplicative randomization of retry delays.
///
/// The fraction is clamped to `[0.0, 1.0]` at construction:
/// - `0.0` → no randomization, exact delays;
/// - `0.25` → delays land in `[0.75 × d, 1.25 × d]`;
/// - `1.0` → delays land in `[0, 2 × d]` (most aggressive spreading).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Jitter(f64);

impl Jitter {
    /// No jitter: delays are used exactly as computed.
    pub const DISABLED: Jitter = Jitter(0.0);

    /// Creates a jitter with the given fraction, clamped to `[0.0, 1.0]`.
    ///
    /// Non-finite fractions are treated as disabled.
    pub fn fraction(f: f64) -> Self {
        if f.is_finite() {
            Jitter(f.clamp(0.0, 1.0))
        } else {
            Jitter::DISABLED
        }
    }

    /// Returns the configured fraction.
    pub fn as_fraction(&self) -> f64 {
        self.0
    }

    /// True if this jitter leaves delays untouched.
    pub fn is_disabled(&self) -> bool {
        self.0 == 0.0
    }

    /// Applies the jitter to `delay`.
    ///
    /// Returns a uniform random duration in
    /// `[delay × (1 − f), delay × (1 + f)]`. Zero delays stay zero, so the
    /// undelayed first attempt is never perturbed.
    pub(crate) fn apply(&self, delay: Duration) -> Duration {
        if self.is_disabled() || delay.is_zero() {
            return delay;
        }
        let factor = rand::rng().random_range((1.0 - self.0)..=(1.0 + self.0));
        Duration::from_secs_f64(delay.as_secs_f64() * factor)
    }
}

impl Default for Jitter {
    /// Returns [`Jitter::DISABLED`].
    fn default() -> Self {
        Jitter::DISABLED
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disabled_is_identity() {
        let d = Duration::from_millis(250);
        assert_eq!(Jitter::DISABLED.apply(d), d);
    }

    #[test]
    fn fraction_is_clamped() {
        assert_eq!(Jitter::fraction(-0.5).as_fraction(), 0.0);
        assert_eq!(Jitter::fraction(1.5).as_fraction(), 1.0);
        assert_eq!(Jitter::fraction(f64::NAN).as_fraction(), 0.0);
    }

    #[test]
    fn stays_within_bounds() {
        let jitter = Jitter::fraction(0.5);
        let base = Duration::from_millis(1000);
        for _ in 0..200 {
            let d = jitter.apply(base);
            assert!(d >= Duration::from_millis(500), "delay {d:?} below bound");
            assert!(d <= Duration::from_millis(1500), "delay {d:?} above bound");
        }
    }

    #[test]
    fn zero_delay_stays_zero() {
        assert_eq!(Jitter::fraction(1.0).apply(Duration::ZERO), Duration::ZERO);
    }
}
