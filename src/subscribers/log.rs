//! # Simple logging subscriber for debugging and demos.
//!
//! [`LogWriter`] prints events to stdout in a human-readable format.
//!
//! ## Output format
//! ```text
//! [attempt] task=fetch attempt=1
//! [attempt-failed] task=fetch attempt=1 err="connection refused"
//! [backoff] task=fetch attempt=2 delay=200ms
//! [drain-started] running=3
//! [batch-submitted] size=5
//! ```
//!
//! Intended for development and demos; implement a custom
//! [`Subscribe`](crate::Subscribe) for structured logging or metrics.

use async_trait::async_trait;

use crate::events::{Event, EventKind};

use super::Subscribe;

/// Stdout logging subscriber (enabled via the `logging` feature).
#[derive(Clone, Copy, Debug, Default)]
pub struct LogWriter;

#[async_trait]
impl Subscribe for LogWriter {
    async fn on_event(&self, e: &Event) {
        let task = e.task.as_deref().unwrap_or("-");
        match e.kind {
            EventKind::AttemptStarted => {
                println!("[attempt] task={task} attempt={:?}", e.attempt);
            }
            EventKind::AttemptFailed => {
                println!(
                    "[attempt-failed] task={task} attempt={:?} err={:?}",
                    e.attempt, e.reason
                );
            }
            EventKind::AttemptSucceeded => {
                println!("[attempt-ok] task={task} attempt={:?}", e.attempt);
            }
            EventKind::BackoffScheduled => {
                println!(
                    "[backoff] task={task} attempt={:?} delay_ms={:?}",
                    e.attempt, e.delay_ms
                );
            }
            EventKind::RetryRejected => {
                println!("[retry-rejected] task={task} attempt={:?}", e.attempt);
            }
            EventKind::RetryExhausted => {
                println!("[retry-exhausted] task={task} attempts={:?}", e.attempt);
            }
            EventKind::TaskDeferred => {
                println!("[deferred] running={:?}", e.count);
            }
            EventKind::DrainStarted => {
                println!("[drain-started] running={:?}", e.count);
            }
            EventKind::DrainCompleted => {
                println!("[drain-completed]");
            }
            EventKind::DrainAborted => {
                println!("[drain-aborted] running={:?}", e.count);
            }
            EventKind::BatchSubmitted => {
                println!("[batch-submitted] size={:?}", e.count);
            }
            EventKind::BatchStarted => {
                println!("[batch-started]");
            }
            EventKind::BatchCompleted => {
                println!("[batch-completed]");
            }
            EventKind::BatchCancelled => {
                println!("[batch-cancelled] size={:?}", e.count);
            }
        }
    }

    fn name(&self) -> &'static str {
        "log_writer"
    }
}
