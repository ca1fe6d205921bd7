//! Batch fan-out / fan-in.
//!
//! [`Fanout`] dispatches a batch of heterogeneous tasks to an executor
//! concurrently; [`BatchHandle`] consolidates their completion into one
//! future-like handle with cancellation, best-effort interrupt, and timed
//! waits.

mod batch;
mod handle;

pub use batch::Fanout;
pub use handle::{BatchHandle, BatchOutcome};
