//! # taskgate
//!
//! **Taskgate** is a small library of task-coordination and resilience
//! primitives for async Rust:
//!
//! - [`Retrier`] — re-invokes a unit of work under a pluggable
//!   backoff/jitter policy and an error classifier, and aggregates every
//!   failure into the terminal error.
//! - [`QuiescenceBarrier`] — wraps a task executor so a control operation
//!   can pause admission, wait until all in-flight work drains, run a
//!   callback while quiesced, then resume.
//! - [`Fanout`] / [`BatchHandle`] — dispatches a batch of heterogeneous
//!   tasks concurrently and consolidates their completion into one handle
//!   with cancellation, best-effort interrupt, and timed waits.
//!
//! None of the primitives run work themselves: execution is delegated to a
//! caller-supplied [`Executor`], and the crate only adds bookkeeping around
//! it.
//!
//! ## Architecture
//! ```text
//!   callers                    taskgate                      external
//!
//!   retrier.run(work) ──► Retrier ── backoff/jitter ──┐
//!                            │                        │ (work is the
//!                            ▼                        │  caller's future)
//!                          Bus ◄── lifecycle events   │
//!                            ▲                        │
//!   barrier.execute(w) ──► QuiescenceBarrier ─────────┼──► Executor
//!                            │  running count,        │    (tokio::spawn,
//!                            │  drain gate            │     runtime Handle,
//!                            ▲                        │     custom pool)
//!   fanout.submit_all ───► Fanout ── BatchHandle ─────┘
//!                               (started / remaining /
//!                                cancelled, slot tokens)
//!
//!   Bus ──► SubscriberSet ──► [queue S1] ─► worker ─► sub.on_event()
//!                             [queue SN] ─► worker ─► sub.on_event()
//! ```
//!
//! ## Features
//! | Area            | Description                                             | Key types / traits                     |
//! |-----------------|---------------------------------------------------------|----------------------------------------|
//! | **Retries**     | Backoff strategies, jitter, error classification.       | [`Retrier`], [`BackoffPolicy`]         |
//! | **Quiescence**  | Drain in-flight work and run a callback while idle.     | [`QuiescenceBarrier`], [`DrainOutcome`]|
//! | **Fan-out**     | Batch dispatch with one completion handle.              | [`Fanout`], [`BatchHandle`]            |
//! | **Execution**   | Minimal fire-and-forget executor seam.                  | [`Executor`], [`TokioSpawner`]         |
//! | **Errors**      | Terminal errors that keep the whole failure history.    | [`RetryError`], [`DrainError`]         |
//! | **Observability**| Lifecycle events with non-blocking fan-out.            | [`Bus`], [`Event`], [`Subscribe`]      |
//!
//! ## Optional features
//! - `logging`: exports a simple built-in [`LogWriter`] _(demo/reference only)_.
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use std::time::Duration;
//! use tokio_util::sync::CancellationToken;
//! use taskgate::{BackoffPolicy, Jitter, Retrier};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() {
//!     let policy = BackoffPolicy::exponential(
//!         4,
//!         Duration::from_millis(50),
//!         2.0,
//!         Duration::from_secs(2),
//!     )
//!     .with_jitter(Jitter::fraction(0.2));
//!
//!     let attempts = Arc::new(std::sync::atomic::AtomicU32::new(0));
//!     let retrier: Retrier<String> = Retrier::new(policy).named("greeting");
//!
//!     let greeting = retrier
//!         .run(&CancellationToken::new(), |_ctx| {
//!             let attempts = Arc::clone(&attempts);
//!             async move {
//!                 let n = attempts.fetch_add(1, std::sync::atomic::Ordering::SeqCst) + 1;
//!                 if n < 3 {
//!                     Err(format!("not ready (attempt {n})"))
//!                 } else {
//!                     Ok("hello".to_string())
//!                 }
//!             }
//!         })
//!         .await
//!         .expect("third attempt succeeds");
//!
//!     assert_eq!(greeting, "hello");
//! }
//! ```

mod barrier;
mod error;
mod events;
mod exec;
mod fanout;
mod policies;
mod retry;
mod subscribers;

// ---- Public re-exports ----

pub use barrier::{DrainOutcome, QuiescenceBarrier};
pub use error::{DrainError, JoinTimeout, RetryError};
pub use events::{Bus, DEFAULT_BUS_CAPACITY, Event, EventKind};
pub use exec::{BoxWork, Executor, ExecutorRef, TokioSpawner};
pub use fanout::{BatchHandle, BatchOutcome, Fanout};
pub use policies::{BackoffPolicy, BackoffStrategy, Jitter};
pub use retry::Retrier;
pub use subscribers::{Subscribe, SubscriberSet};

// Optional: expose a simple built-in logger subscriber (demo/reference).
// Enable with: `--features logging`
#[cfg(feature = "logging")]
pub use subscribers::LogWriter;
