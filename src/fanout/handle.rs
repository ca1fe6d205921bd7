//! # BatchHandle: one future-like handle over a fanned-out batch.
//!
//! The handle consolidates the whole batch into a single signal: done once
//! every dispatched task has reached a terminal state, or once the batch is
//! cancelled. It supports untimed and timed waits and best-effort interrupt
//! of running tasks.
//!
//! ## Two-phase wait
//! Submission to an executor may sit in a queue; the handle therefore tracks
//! "at least one task has begun" separately from "all have finished". A
//! caller with a timeout budget times out on a saturated executor instead of
//! being told the batch is done, and [`has_started`](BatchHandle::has_started)
//! makes queue latency observable.

use std::time::Duration;

use tokio::sync::watch;
use tokio::time;

use crate::error::JoinTimeout;
use crate::events::{Bus, Event, EventKind};
use crate::fanout::batch::{BatchState, SlotTable};

/// Terminal result of waiting on a batch.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BatchOutcome {
    /// Every dispatched task reached a terminal state.
    Completed,
    /// The batch was cancelled; tasks that had not begun were skipped.
    Cancelled,
}

/// Handle over one submitted batch.
///
/// All state transitions are one-way: not-started → started →
/// (cancelled | completed). `is_done` never reverts to false.
pub struct BatchHandle {
    state: watch::Sender<BatchState>,
    slots: SlotTable,
    size: usize,
    bus: Bus,
}

impl BatchHandle {
    pub(crate) fn new(
        state: watch::Sender<BatchState>,
        slots: SlotTable,
        size: usize,
        bus: Bus,
    ) -> Self {
        Self {
            state,
            slots,
            size,
            bus,
        }
    }

    /// Number of tasks in the batch.
    pub fn len(&self) -> usize {
        self.size
    }

    /// True for a batch of zero tasks.
    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Number of tasks that have not yet reached a terminal state.
    pub fn pending(&self) -> usize {
        self.state.borrow().remaining
    }

    /// True once at least one task has begun executing.
    pub fn has_started(&self) -> bool {
        self.state.borrow().started
    }

    /// True once the batch was cancelled.
    pub fn is_cancelled(&self) -> bool {
        self.state.borrow().cancelled
    }

    /// True once every task reached a terminal state, or once cancelled.
    pub fn is_done(&self) -> bool {
        self.state.borrow().is_done()
    }

    /// Cancels the batch.
    ///
    /// Returns `true` if this call performed the cancellation; a batch that
    /// is already done (or already cancelled) is left untouched and `false`
    /// is returned.
    ///
    /// On cancellation the handle is permanently done. Tasks that have not
    /// begun skip their effect entirely (their completion is still counted).
    /// With `interrupt = true`, and provided at least one task had started,
    /// every recorded per-task token is cancelled — a best-effort signal
    /// that does not force-terminate a task that ignores it.
    pub fn cancel(&self, interrupt: bool) -> bool {
        let first = self.state.send_if_modified(|s| {
            if s.is_done() {
                false
            } else {
                s.cancelled = true;
                true
            }
        });
        if !first {
            return false;
        }
        self.bus
            .publish(Event::new(EventKind::BatchCancelled).with_count(self.size));
        if interrupt && self.state.borrow().started {
            for slot in self.slots.iter() {
                if let Some(token) = slot.get() {
                    token.cancel();
                }
            }
        }
        true
    }

    /// Waits until the batch is done and reports how it ended.
    ///
    /// Individual task failures never surface here — they are the proxy's
    /// concern; the handle only reports that every dispatched task reached a
    /// terminal state. The wait is cancel-safe: dropping the future abandons
    /// the wait without affecting the batch.
    pub async fn join(&self) -> BatchOutcome {
        let mut rx = self.state.subscribe();
        // The sender lives on `self`; the wait only ends via the predicate.
        let _ = rx.wait_for(BatchState::is_done).await;
        if self.state.borrow().cancelled {
            BatchOutcome::Cancelled
        } else {
            BatchOutcome::Completed
        }
    }

    /// Waits like [`join`](BatchHandle::join), but at most `timeout`.
    ///
    /// Elapsing — whether the batch had not started or had not finished —
    /// yields a [`JoinTimeout`] and leaves the batch running; a timed-out
    /// wait does not cancel anything.
    pub async fn join_timeout(&self, timeout: Duration) -> Result<BatchOutcome, JoinTimeout> {
        match time::timeout(timeout, self.join()).await {
            Ok(outcome) => Ok(outcome),
            Err(_elapsed) => Err(JoinTimeout { timeout }),
        }
    }
}
