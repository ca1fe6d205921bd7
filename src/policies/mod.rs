//! Retry scheduling policies.
//!
//! This module groups the knobs that control **how many** attempts a unit of
//! work gets and **how long** to wait between them.
//!
//! ## Contents
//! - [`BackoffPolicy`] attempt budget plus delay strategy plus jitter
//! - [`BackoffStrategy`] constant-interval or capped exponential delays
//! - [`Jitter`] bounded multiplicative randomization of delays
//!
//! ## Quick wiring
//! ```text
//! Retrier { policy: BackoffPolicy, .. }
//!      └─► before attempt n (n ≥ 2): sleep policy.delay(n)
//!      └─► stop after policy.max_attempts failed attempts
//! ```
//!
//! ## Defaults
//! - `BackoffPolicy::default()` → 3 attempts, constant 100ms, no jitter.
//! - `Jitter::DISABLED` keeps schedules deterministic; consider a fraction
//!   around `0.2` when many callers share a failing dependency.

mod backoff;
mod jitter;

pub use backoff::{BackoffPolicy, BackoffStrategy};
pub use jitter::Jitter;
