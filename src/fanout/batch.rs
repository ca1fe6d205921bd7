//! # Fanout: dispatch a batch of heterogeneous tasks and hand back one
//! handle.
//!
//! [`Fanout::submit_all`] sends every task of a batch to the externally
//! supplied executor **concurrently** and returns a [`BatchHandle`]
//! immediately. The `proxy` function is how each task's effect is invoked,
//! which lets the same primitive work uniformly over plain actions,
//! value-producing work that records into shared storage, and anything in
//! between. Per-task failure handling belongs to the proxy; the batch layer
//! only tracks "every task reached a terminal state".
//!
//! ## Per-task flow
//! ```text
//! executor picks the task up
//!   ├─► completion guard armed (counts down on every exit path)
//!   ├─► batch already cancelled? ─► skip the effect (still counted)
//!   ├─► record this task's cancellation token in its slot (write-once)
//!   ├─► first task of the batch flips the one-shot started latch
//!   └─► await proxy(task, token)
//! ```
//!
//! ## Rules
//! - The completion counter is the **only** source of truth for "all done";
//!   nothing polls individual task state.
//! - Slot tokens exist solely so a cancel can signal running tasks; they are
//!   a lookup for signaling, never an ownership relation.

use std::future::Future;
use std::sync::{Arc, OnceLock};

use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

use crate::events::{Bus, Event, EventKind};
use crate::exec::ExecutorRef;
use crate::fanout::handle::BatchHandle;

/// Shared batch bookkeeping, mutated only through the watch channel.
#[derive(Clone, Copy, Debug)]
pub(crate) struct BatchState {
    /// One-shot latch: some task has begun executing.
    pub(crate) started: bool,
    /// One-shot latch: the batch was cancelled.
    pub(crate) cancelled: bool,
    /// Tasks that have not yet reached a terminal state.
    pub(crate) remaining: usize,
}

impl BatchState {
    /// Terminal-state predicate; monotonic because every field is one-way.
    pub(crate) fn is_done(&self) -> bool {
        self.cancelled || (self.started && self.remaining == 0)
    }
}

/// Index-addressed, write-once table of per-task cancellation tokens.
pub(crate) type SlotTable = Arc<[OnceLock<CancellationToken>]>;

/// Counts a task down when it reaches any exit path, and publishes
/// completion when it was the last one.
struct CompletionGuard {
    state: watch::Sender<BatchState>,
    bus: Bus,
}

impl Drop for CompletionGuard {
    fn drop(&mut self) {
        let mut completed = false;
        self.state.send_modify(|s| {
            s.remaining = s.remaining.saturating_sub(1);
            completed = s.remaining == 0 && !s.cancelled;
        });
        if completed {
            self.bus.publish(Event::new(EventKind::BatchCompleted));
        }
    }
}

/// Fans batches of tasks out to an executor.
///
/// The fan-out adds bookkeeping only; actual execution happens wherever the
/// executor runs its work.
pub struct Fanout {
    exec: ExecutorRef,
    bus: Bus,
}

impl Fanout {
    /// Creates a fan-out over the given executor with a private event bus.
    pub fn new(exec: ExecutorRef) -> Self {
        Self {
            exec,
            bus: Bus::default(),
        }
    }

    /// Returns the fan-out publishing to the given bus instead of a private
    /// one.
    pub fn with_bus(mut self, bus: Bus) -> Self {
        self.bus = bus;
        self
    }

    /// The bus this fan-out publishes lifecycle events to.
    pub fn bus(&self) -> &Bus {
        &self.bus
    }

    /// Dispatches every task to the executor and returns a handle at once.
    ///
    /// Each task's effect is `proxy(task, token)`; the token is that task's
    /// interrupt signal, cancelled when the batch is cancelled with
    /// `interrupt = true`. A task that never checks its token simply runs to
    /// completion — cancellation is cooperative.
    ///
    /// An empty batch is trivially complete: its handle reports done
    /// immediately.
    pub fn submit_all<T, P, Fut>(&self, tasks: Vec<T>, proxy: P) -> BatchHandle
    where
        T: Send + 'static,
        P: Fn(T, CancellationToken) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let size = tasks.len();
        let (state, _rx) = watch::channel(BatchState {
            started: size == 0,
            cancelled: false,
            remaining: size,
        });
        let slots: SlotTable = (0..size).map(|_| OnceLock::new()).collect();
        let proxy = Arc::new(proxy);

        self.bus
            .publish(Event::new(EventKind::BatchSubmitted).with_count(size));

        for (index, task) in tasks.into_iter().enumerate() {
            let state = state.clone();
            let slots = Arc::clone(&slots);
            let proxy = Arc::clone(&proxy);
            let bus = self.bus.clone();

            self.exec.execute(Box::pin(async move {
                let _done = CompletionGuard {
                    state: state.clone(),
                    bus: bus.clone(),
                };
                if state.borrow().cancelled {
                    return;
                }
                let token = CancellationToken::new();
                let _ = slots[index].set(token.clone());
                let first = state.send_if_modified(|s| {
                    if s.started {
                        false
                    } else {
                        s.started = true;
                        true
                    }
                });
                if first {
                    bus.publish(Event::new(EventKind::BatchStarted));
                }
                proxy(task, token).await;
            }));
        }

        BatchHandle::new(state, slots, size, self.bus.clone())
    }
}
