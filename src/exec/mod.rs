//! # External task-executor seam.
//!
//! The barrier and the fan-out never run work themselves and never spawn
//! unbounded tasks of their own; they hand units of work to an [`Executor`]
//! supplied by the caller and only add bookkeeping around it. The contract is
//! minimal on purpose: accept a unit of work and run it on some worker,
//! eventually.
//!
//! [`TokioSpawner`] covers the common case of dispatching onto the ambient
//! tokio runtime; `tokio::runtime::Handle` is accepted directly for
//! dispatching onto a specific runtime.
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use taskgate::{Executor, ExecutorRef, TokioSpawner};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let exec: ExecutorRef = Arc::new(TokioSpawner);
//! exec.execute(Box::pin(async {
//!     // runs on the ambient runtime
//! }));
//! # }
//! ```

use std::sync::Arc;

use futures::future::BoxFuture;

/// A boxed unit of work: an owned future that produces no value.
///
/// Outcomes, results, and failures are the work's own concern; the executor
/// only drives it to completion.
pub type BoxWork = BoxFuture<'static, ()>;

/// Shared handle to an executor (`Arc<dyn Executor>`).
pub type ExecutorRef = Arc<dyn Executor>;

/// # Fire-and-forget task execution.
///
/// `execute` must not block: implementations enqueue or spawn the work and
/// return. Work submitted concurrently may run concurrently; no ordering is
/// guaranteed between submissions.
pub trait Executor: Send + Sync + 'static {
    /// Dispatches one unit of work for eventual execution.
    fn execute(&self, work: BoxWork);
}

/// Dispatches work onto the ambient tokio runtime via [`tokio::spawn`].
///
/// Must be used from within a runtime context; prefer holding a
/// `tokio::runtime::Handle` when dispatch can happen from outside one.
#[derive(Clone, Copy, Debug, Default)]
pub struct TokioSpawner;

impl Executor for TokioSpawner {
    fn execute(&self, work: BoxWork) {
        tokio::spawn(work);
    }
}

impl Executor for tokio::runtime::Handle {
    fn execute(&self, work: BoxWork) {
        self.spawn(work);
    }
}
