//! # QuiescenceBarrier: pause admission, drain in-flight work, run a
//! callback, resume.
//!
//! The barrier wraps an [`Executor`](crate::Executor) and adds two pieces of
//! bookkeeping around it: a running-task count and a draining flag. Work is
//! admitted through [`execute`](QuiescenceBarrier::execute); a control
//! operation that must observe a quiescent executor goes through
//! [`drain_and_run`](QuiescenceBarrier::drain_and_run).
//!
//! ## State machine
//! ```text
//! Open (running ≥ 0)
//!   │  drain_and_run() claims the drain        execute() admits freely
//!   ▼
//! Draining (draining = true)
//!   │  execute() callers are deferred, never rejected
//!   │  running reaches 0 ──► on_quiescent() runs ──► reopen
//!   │  caller canceled    ──► reopen, callback skipped
//!   ▼
//! Open (deferred submitters admitted)
//! ```
//!
//! ## Rules
//! - The running count and draining flag are the **only** sources of truth;
//!   nothing polls individual task state.
//! - Every admitted task decrements the count through a drop guard, so a
//!   panicking task still counts down.
//! - At most one drain is in progress; overlapping calls return immediately
//!   with [`DrainOutcome::AlreadyDraining`] and do not run their callback.

use std::future::Future;

use tokio::select;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

use crate::error::DrainError;
use crate::events::{Bus, Event, EventKind};
use crate::exec::ExecutorRef;

/// Admission/drain bookkeeping shared between submitters, running tasks, and
/// the drain waiter.
#[derive(Clone, Copy, Debug)]
struct GateState {
    /// Tasks admitted and not yet finished.
    running: usize,
    /// True while a drain owns the barrier.
    draining: bool,
}

/// Result of a [`drain_and_run`](QuiescenceBarrier::drain_and_run) call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DrainOutcome {
    /// This call claimed the drain, reached quiescence, and ran its callback.
    Drained,
    /// Another drain was already in progress; nothing was done.
    AlreadyDraining,
}

/// Decrements the running count when an admitted task reaches any exit path.
struct RunningGuard {
    gate: watch::Sender<GateState>,
}

impl Drop for RunningGuard {
    fn drop(&mut self) {
        self.gate
            .send_modify(|g| g.running = g.running.saturating_sub(1));
    }
}

/// Clears the draining flag when the drain ends, on every exit path.
struct ReopenGuard<'a> {
    gate: &'a watch::Sender<GateState>,
}

impl Drop for ReopenGuard<'_> {
    fn drop(&mut self) {
        self.gate.send_modify(|g| g.draining = false);
    }
}

/// Wraps a task executor with a quiescence gate.
///
/// All actual execution is delegated to the supplied executor; the barrier
/// never spawns tasks of its own.
pub struct QuiescenceBarrier {
    exec: ExecutorRef,
    gate: watch::Sender<GateState>,
    bus: Bus,
}

impl QuiescenceBarrier {
    /// Creates a barrier over the given executor with a private event bus.
    pub fn new(exec: ExecutorRef) -> Self {
        let (gate, _rx) = watch::channel(GateState {
            running: 0,
            draining: false,
        });
        Self {
            exec,
            gate,
            bus: Bus::default(),
        }
    }

    /// Returns the barrier publishing to the given bus instead of a private
    /// one.
    pub fn with_bus(mut self, bus: Bus) -> Self {
        self.bus = bus;
        self
    }

    /// The bus this barrier publishes lifecycle events to.
    pub fn bus(&self) -> &Bus {
        &self.bus
    }

    /// Number of admitted tasks that have not yet finished.
    pub fn running(&self) -> usize {
        self.gate.borrow().running
    }

    /// True while a drain owns the barrier.
    pub fn is_draining(&self) -> bool {
        self.gate.borrow().draining
    }

    /// Admits `work` and dispatches it to the underlying executor.
    ///
    /// While a drain is in progress the call **defers**: it waits for the
    /// barrier to reopen and is then admitted normally. Work is never
    /// rejected or dropped because of a drain, only delayed.
    ///
    /// The running count is incremented before dispatch and decremented when
    /// the work finishes, whether it returns, errors internally, or panics.
    pub async fn execute<F>(&self, work: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.admit().await;
        let guard = RunningGuard {
            gate: self.gate.clone(),
        };
        self.exec.execute(Box::pin(async move {
            let _running = guard;
            work.await;
        }));
    }

    /// Atomically increments the running count, waiting out any drain.
    async fn admit(&self) {
        let mut rx = self.gate.subscribe();
        let mut deferred = false;
        loop {
            let admitted = self.gate.send_if_modified(|g| {
                if g.draining {
                    false
                } else {
                    g.running += 1;
                    true
                }
            });
            if admitted {
                return;
            }
            if !deferred {
                deferred = true;
                self.bus
                    .publish(Event::new(EventKind::TaskDeferred).with_count(self.running()));
            }
            // The sender lives on `self`, so the channel cannot close here.
            let _ = rx.wait_for(|g| !g.draining).await;
        }
    }

    /// Closes admission, waits until no task is in flight, runs
    /// `on_quiescent`, then reopens.
    ///
    /// Only the first concurrent caller claims the drain; overlapping calls
    /// observe it and return [`DrainOutcome::AlreadyDraining`] at once —
    /// the operation is not queued or repeated.
    ///
    /// The callback runs while admission is still closed, so it observes
    /// `running() == 0`. If `ctx` is canceled before quiescence the drain is
    /// aborted: the barrier reopens, the callback is skipped, and
    /// [`DrainError::Canceled`] is returned. In-flight tasks are unaffected
    /// either way.
    ///
    /// There is no built-in deadline; callers wanting one should cancel
    /// `ctx` themselves.
    pub async fn drain_and_run<F>(
        &self,
        ctx: &CancellationToken,
        on_quiescent: F,
    ) -> Result<DrainOutcome, DrainError>
    where
        F: FnOnce(),
    {
        let claimed = self.gate.send_if_modified(|g| {
            if g.draining {
                false
            } else {
                g.draining = true;
                true
            }
        });
        if !claimed {
            return Ok(DrainOutcome::AlreadyDraining);
        }

        self.bus
            .publish(Event::new(EventKind::DrainStarted).with_count(self.running()));
        let reopen = ReopenGuard { gate: &self.gate };

        let mut rx = self.gate.subscribe();
        select! {
            res = rx.wait_for(|g| g.running == 0) => {
                // The sender lives on `self`; the wait only ends via the predicate.
                let _ = res;
            }
            _ = ctx.cancelled() => {
                self.bus
                    .publish(Event::new(EventKind::DrainAborted).with_count(self.running()));
                return Err(DrainError::Canceled);
            }
        }

        on_quiescent();
        drop(reopen);
        self.bus.publish(Event::new(EventKind::DrainCompleted));
        Ok(DrainOutcome::Drained)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exec::TokioSpawner;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use tokio::sync::Notify;
    use tokio::time::{Duration, sleep};

    fn barrier() -> Arc<QuiescenceBarrier> {
        Arc::new(QuiescenceBarrier::new(Arc::new(TokioSpawner)))
    }

    async fn until(cond: impl Fn() -> bool) {
        while !cond() {
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test]
    async fn running_count_tracks_task_lifetime() {
        let barrier = barrier();
        let release = Arc::new(Notify::new());
        let release2 = Arc::clone(&release);

        barrier
            .execute(async move {
                release2.notified().await;
            })
            .await;
        assert_eq!(barrier.running(), 1);

        release.notify_one();
        until(|| barrier.running() == 0).await;
    }

    #[tokio::test]
    async fn panicking_task_still_counts_down() {
        let barrier = barrier();
        barrier
            .execute(async {
                panic!("task blew up");
            })
            .await;
        until(|| barrier.running() == 0).await;
    }

    #[tokio::test(start_paused = true)]
    async fn drain_waits_for_inflight_work() {
        let barrier = barrier();
        let finished = Arc::new(AtomicUsize::new(0));
        for _ in 0..3 {
            let finished = Arc::clone(&finished);
            barrier
                .execute(async move {
                    sleep(Duration::from_millis(50)).await;
                    finished.fetch_add(1, Ordering::SeqCst);
                })
                .await;
        }
        assert_eq!(barrier.running(), 3);

        let mut observed = usize::MAX;
        let outcome = barrier
            .drain_and_run(&CancellationToken::new(), || {
                observed = barrier.running();
            })
            .await
            .unwrap();

        assert_eq!(outcome, DrainOutcome::Drained);
        assert_eq!(observed, 0);
        assert_eq!(finished.load(Ordering::SeqCst), 3);
        assert!(!barrier.is_draining());
    }

    #[tokio::test]
    async fn drain_on_idle_barrier_completes_immediately() {
        let barrier = barrier();
        let mut ran = false;
        let outcome = barrier
            .drain_and_run(&CancellationToken::new(), || ran = true)
            .await
            .unwrap();
        assert_eq!(outcome, DrainOutcome::Drained);
        assert!(ran);
    }

    #[tokio::test]
    async fn overlapping_drain_is_a_noop() {
        let barrier = barrier();
        let release = Arc::new(Notify::new());
        let release2 = Arc::clone(&release);
        barrier
            .execute(async move {
                release2.notified().await;
            })
            .await;

        let b = Arc::clone(&barrier);
        let first = tokio::spawn(async move {
            b.drain_and_run(&CancellationToken::new(), || {}).await
        });
        until(|| barrier.is_draining()).await;

        let mut second_ran = false;
        let second = barrier
            .drain_and_run(&CancellationToken::new(), || second_ran = true)
            .await
            .unwrap();
        assert_eq!(second, DrainOutcome::AlreadyDraining);
        assert!(!second_ran);

        release.notify_one();
        assert_eq!(first.await.unwrap().unwrap(), DrainOutcome::Drained);
    }

    #[tokio::test]
    async fn submissions_during_drain_are_deferred_not_dropped() {
        let barrier = barrier();
        let release = Arc::new(Notify::new());
        let release2 = Arc::clone(&release);
        barrier
            .execute(async move {
                release2.notified().await;
            })
            .await;

        let b = Arc::clone(&barrier);
        let drain = tokio::spawn(async move {
            b.drain_and_run(&CancellationToken::new(), || {}).await
        });
        until(|| barrier.is_draining()).await;

        // Deferred while draining; runs after the drain completes.
        let ran = Arc::new(AtomicBool::new(false));
        let ran2 = Arc::clone(&ran);
        let b = Arc::clone(&barrier);
        let submitter = tokio::spawn(async move {
            b.execute(async move {
                ran2.store(true, Ordering::SeqCst);
            })
            .await;
        });

        tokio::task::yield_now().await;
        assert!(!ran.load(Ordering::SeqCst));
        assert_eq!(barrier.running(), 1);

        release.notify_one();
        drain.await.unwrap().unwrap();
        submitter.await.unwrap();
        until(|| ran.load(Ordering::SeqCst)).await;
    }

    #[tokio::test]
    async fn canceled_drain_reopens_without_running_callback() {
        let barrier = barrier();
        let release = Arc::new(Notify::new());
        let release2 = Arc::clone(&release);
        barrier
            .execute(async move {
                release2.notified().await;
            })
            .await;

        let token = CancellationToken::new();
        let b = Arc::clone(&barrier);
        let t = token.clone();
        let ran = Arc::new(AtomicBool::new(false));
        let ran2 = Arc::clone(&ran);
        let drain = tokio::spawn(async move {
            b.drain_and_run(&t, move || ran2.store(true, Ordering::SeqCst))
                .await
        });
        until(|| barrier.is_draining()).await;

        token.cancel();
        assert_eq!(drain.await.unwrap().unwrap_err(), DrainError::Canceled);
        assert!(!ran.load(Ordering::SeqCst));
        assert!(!barrier.is_draining());
        // In-flight work was unaffected and admission is open again.
        assert_eq!(barrier.running(), 1);
        barrier.execute(async {}).await;
        release.notify_one();
        until(|| barrier.running() == 0).await;
    }

    #[tokio::test(start_paused = true)]
    async fn quiescent_callback_never_observes_running_work() {
        let barrier = barrier();
        for round in 0..10u64 {
            for i in 0..4u64 {
                barrier
                    .execute(async move {
                        sleep(Duration::from_millis(round + i)).await;
                    })
                    .await;
            }
            let mut observed = usize::MAX;
            let outcome = barrier
                .drain_and_run(&CancellationToken::new(), || {
                    observed = barrier.running();
                })
                .await
                .unwrap();
            assert_eq!(outcome, DrainOutcome::Drained);
            assert_eq!(observed, 0);
        }
    }
}
