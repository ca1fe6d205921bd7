//! # Example: drain_and_fanout
//!
//! Demonstrates the two executor-wrapping primitives together:
//!
//! 1. [`Fanout::submit_all`] dispatches a batch of jobs and waits on one
//!    [`BatchHandle`], first with a deadline that is too tight, then without.
//! 2. [`QuiescenceBarrier`] admits background work, then drains it so a
//!    callback can run with the guarantee that nothing is in flight.
//!
//! ## Run
//! ```bash
//! cargo run --example drain_and_fanout
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use taskgate::{Fanout, QuiescenceBarrier, TokioSpawner};

#[tokio::main(flavor = "multi_thread", worker_threads = 2)]
async fn main() {
    // --- Fan-out / fan-in ---------------------------------------------
    let fanout = Fanout::new(Arc::new(TokioSpawner));
    let completed = Arc::new(AtomicUsize::new(0));
    let completed2 = Arc::clone(&completed);

    let handle = fanout.submit_all((1..=5u64).collect(), move |job, token| {
        let completed = Arc::clone(&completed2);
        async move {
            tokio::select! {
                _ = tokio::time::sleep(Duration::from_millis(20 * job)) => {
                    println!("[job {job}] done");
                    completed.fetch_add(1, Ordering::SeqCst);
                }
                _ = token.cancelled() => {
                    println!("[job {job}] interrupted");
                }
            }
        }
    });

    match handle.join_timeout(Duration::from_millis(5)).await {
        Ok(outcome) => println!("[batch] finished early: {outcome:?}"),
        Err(e) => println!("[batch] {e}; done={}", handle.is_done()),
    }
    let outcome = handle.join().await;
    println!(
        "[batch] outcome={outcome:?} completed={}/{}",
        completed.load(Ordering::SeqCst),
        handle.len()
    );

    // --- Quiescence barrier -------------------------------------------
    let barrier = QuiescenceBarrier::new(Arc::new(TokioSpawner));
    for i in 0..3u64 {
        barrier
            .execute(async move {
                tokio::time::sleep(Duration::from_millis(15 * (i + 1))).await;
                println!("[bg {i}] done");
            })
            .await;
    }
    println!("[barrier] running={}", barrier.running());

    barrier
        .drain_and_run(&CancellationToken::new(), || {
            println!("[barrier] quiescent: running={}", barrier.running());
        })
        .await
        .expect("drain completes");
    println!("[barrier] reopened; running={}", barrier.running());
}
