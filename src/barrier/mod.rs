//! Quiescence barrier.
//!
//! [`QuiescenceBarrier`] wraps a task executor so that a control operation
//! can close admission, wait until no task is in flight, run with that
//! guarantee, and then let deferred submissions through.

mod quiesce;

pub use quiesce::{DrainOutcome, QuiescenceBarrier};
