//! # Example: retry_with_backoff
//!
//! Demonstrates how [`Retrier`] re-invokes a flaky unit of work under an
//! exponential [`BackoffPolicy`], and how lifecycle events can be observed
//! through a [`SubscriberSet`].
//!
//! ## Flow
//! ```text
//! retrier.run()
//!   ├─► AttemptStarted(1) → work fails ("boom #1") → AttemptFailed
//!   ├─► BackoffScheduled(delay=50ms) → sleep
//!   ├─► AttemptStarted(2) → work fails ("boom #2") → AttemptFailed
//!   ├─► BackoffScheduled(delay≈100ms) → sleep
//!   └─► AttemptStarted(3) → work succeeds → AttemptSucceeded
//! ```
//!
//! ## Run
//! ```bash
//! cargo run --example retry_with_backoff
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use taskgate::{BackoffPolicy, Event, Jitter, Retrier, Subscribe, SubscriberSet};

/// Prints every lifecycle event with its sequence number.
struct Printer;

#[async_trait]
impl Subscribe for Printer {
    async fn on_event(&self, ev: &Event) {
        println!(
            "seq={} kind={:?} task={:?} attempt={:?} delay_ms={:?}",
            ev.seq, ev.kind, ev.task, ev.attempt, ev.delay_ms
        );
    }

    fn name(&self) -> &'static str {
        "printer"
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let policy = BackoffPolicy::exponential(
        5,
        Duration::from_millis(50),
        2.0,
        Duration::from_secs(1),
    )
    .with_jitter(Jitter::fraction(0.1));

    let retrier: Retrier<String> = Retrier::new(policy).named("flaky");

    // Observe the retrier's bus through a subscriber worker.
    let subs = Arc::new(SubscriberSet::new(vec![Arc::new(Printer)]));
    let _listener = subs.spawn_listener(retrier.bus());

    let attempts = Arc::new(AtomicU32::new(0));
    let result = retrier
        .run(&CancellationToken::new(), |_ctx| {
            let attempts = Arc::clone(&attempts);
            async move {
                let n = attempts.fetch_add(1, Ordering::SeqCst) + 1;
                println!("[flaky] attempt {n}");
                if n <= 2 {
                    Err(format!("boom #{n}"))
                } else {
                    Ok(n)
                }
            }
        })
        .await;

    match result {
        Ok(n) => println!("[flaky] succeeded on attempt {n}"),
        Err(e) => println!("[flaky] gave up: {e} ({} causes)", e.causes().len()),
    }

    // Let the subscriber worker drain its queue before exiting.
    tokio::time::sleep(Duration::from_millis(50)).await;
}
