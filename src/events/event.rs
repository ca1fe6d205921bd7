//! # Lifecycle events emitted by the retry engine, barrier, and fan-out.
//!
//! The [`EventKind`] enum classifies events across three areas:
//! - **Retry events**: per-attempt flow (started, failed, succeeded, backoff
//!   scheduled, terminal exhaustion/rejection).
//! - **Barrier events**: drain lifecycle and deferred admissions.
//! - **Batch events**: fan-out submission, first start, completion,
//!   cancellation.
//!
//! The [`Event`] struct carries optional metadata: a label, attempt numbers,
//! delays, reasons, and counts.
//!
//! ## Ordering guarantees
//! Each event has a globally unique sequence number (`seq`) that increases
//! monotonically. Use `seq` to restore order when events from independent
//! publishers interleave.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::{Duration, SystemTime};

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of lifecycle events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    // === Retry events ===
    /// A retry attempt is starting.
    ///
    /// Sets: `task` (retrier label), `attempt`.
    AttemptStarted,

    /// A retry attempt failed.
    ///
    /// Sets: `task`, `attempt`, `reason` (error message).
    AttemptFailed,

    /// A retry attempt succeeded; the run is over.
    ///
    /// Sets: `task`, `attempt`.
    AttemptSucceeded,

    /// A delay was scheduled before the next attempt.
    ///
    /// Sets: `task`, `attempt` (the upcoming attempt), `delay_ms`.
    BackoffScheduled,

    /// The classifier rejected an error as non-retryable; the run is over.
    ///
    /// Sets: `task`, `attempt`, `reason`.
    RetryRejected,

    /// Every allowed attempt failed; the run is over.
    ///
    /// Sets: `task`, `attempt` (the attempt budget).
    RetryExhausted,

    // === Barrier events ===
    /// A submission arrived while draining and was deferred.
    ///
    /// Sets: `count` (running tasks at the time).
    TaskDeferred,

    /// A drain was claimed; admission of new work is now closed.
    ///
    /// Sets: `count` (running tasks still to finish).
    DrainStarted,

    /// Quiescence was reached and the callback ran; admission reopened.
    DrainCompleted,

    /// The drain wait was canceled before quiescence; admission reopened
    /// without running the callback.
    ///
    /// Sets: `count` (running tasks at abort time).
    DrainAborted,

    // === Batch events ===
    /// A batch was handed to the executor.
    ///
    /// Sets: `count` (batch size).
    BatchSubmitted,

    /// The first task of a batch began executing.
    BatchStarted,

    /// Every task of a batch reached a terminal state.
    BatchCompleted,

    /// A batch was cancelled.
    ///
    /// Sets: `count` (batch size).
    BatchCancelled,
}

/// Lifecycle event with optional metadata.
///
/// - `seq`: monotonic global sequence for ordering
/// - `at`: wall-clock timestamp (for logs)
/// - remaining fields are set depending on the [`EventKind`]
#[derive(Clone, Debug)]
pub struct Event {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Event classification.
    pub kind: EventKind,

    /// Label of the retrier or subscriber involved, if any.
    pub task: Option<Arc<str>>,
    /// Attempt number (1-based), for retry events.
    pub attempt: Option<u32>,
    /// Scheduled delay in milliseconds (compact).
    pub delay_ms: Option<u32>,
    /// Human-readable reason (error messages, drop causes).
    pub reason: Option<Arc<str>>,
    /// A count whose meaning depends on the kind (running tasks, batch size).
    pub count: Option<usize>,
}

impl Event {
    /// Creates a new event of the given kind with the current timestamp and
    /// the next global sequence number.
    pub fn new(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            task: None,
            attempt: None,
            delay_ms: None,
            reason: None,
            count: None,
        }
    }

    /// Attaches a retrier or subscriber label.
    #[inline]
    pub fn with_task(mut self, task: impl Into<Arc<str>>) -> Self {
        self.task = Some(task.into());
        self
    }

    /// Attaches an attempt number.
    #[inline]
    pub fn with_attempt(mut self, n: u32) -> Self {
        self.attempt = Some(n);
        self
    }

    /// Attaches a delay (stored as milliseconds).
    #[inline]
    pub fn with_delay(mut self, d: Duration) -> Self {
        let ms = d.as_millis().min(u128::from(u32::MAX)) as u32;
        self.delay_ms = Some(ms);
        self
    }

    /// Attaches a human-readable reason.
    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Attaches a count (running tasks, batch size).
    #[inline]
    pub fn with_count(mut self, count: usize) -> Self {
        self.count = Some(count);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sequence_numbers_increase() {
        let a = Event::new(EventKind::DrainStarted);
        let b = Event::new(EventKind::DrainCompleted);
        assert!(b.seq > a.seq);
    }

    #[test]
    fn builders_set_fields() {
        let ev = Event::new(EventKind::AttemptFailed)
            .with_task("fetch")
            .with_attempt(3)
            .with_delay(Duration::from_millis(250))
            .with_reason("boom");
        assert_eq!(ev.kind, EventKind::AttemptFailed);
        assert_eq!(ev.task.as_deref(), Some("fetch"));
        assert_eq!(ev.attempt, Some(3));
        assert_eq!(ev.delay_ms, Some(250));
        assert_eq!(ev.reason.as_deref(), Some("boom"));
        assert_eq!(ev.count, None);
    }
}
