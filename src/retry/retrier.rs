//! # Retrier: re-invokes a unit of work under a backoff policy.
//!
//! Supervises repeated invocations of one fallible operation:
//! - delays per [`BackoffPolicy`] (with optional jitter),
//! - an error classifier that decides which failures are worth retrying,
//! - cooperative cancellation via [`CancellationToken`],
//! - full failure history on the terminal error.
//!
//! ## Event flow
//! For each attempt, the retrier publishes:
//! ```text
//! AttemptStarted → [work] → AttemptSucceeded (done)
//!                         → AttemptFailed
//!                             ├─ classifier says stop → RetryRejected (done)
//!                             ├─ budget exhausted     → RetryExhausted (done)
//!                             └─ retry scheduled      → BackoffScheduled → [sleep]
//! ```
//!
//! ## Rules
//! - Attempts run **sequentially**; the attempt counter starts at 1.
//! - The first attempt is undelayed; attempt `n ≥ 2` is preceded by
//!   `policy.delay(n)`.
//! - Cancellation is checked at **safe points** (attempt boundaries, backoff
//!   sleeps) and aborts the run immediately — it is never folded into the
//!   aggregated failure.
//! - The classifier is consulted on **every** failure uniformly; a `false`
//!   verdict is terminal even when attempts remain.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use tokio::{select, time};
use tokio_util::sync::CancellationToken;

use crate::error::RetryError;
use crate::events::{Bus, Event, EventKind};
use crate::policies::BackoffPolicy;

/// Re-invokes a unit of work until it succeeds, the attempt budget runs out,
/// or a failure is classified as non-retryable.
///
/// The retrier itself is stateless across runs: every call to [`run`]
/// starts a fresh attempt counter and a fresh failure history.
///
/// [`run`]: Retrier::run
pub struct Retrier<E> {
    name: Arc<str>,
    policy: BackoffPolicy,
    classify: Arc<dyn Fn(&E) -> bool + Send + Sync>,
    bus: Bus,
}

impl<E> Retrier<E> {
    /// Creates a retrier that considers every failure retryable.
    pub fn new(policy: BackoffPolicy) -> Self {
        Self {
            name: Arc::from("work"),
            policy,
            classify: Arc::new(|_| true),
            bus: Bus::default(),
        }
    }

    /// Returns the retrier with the given label, used in published events.
    pub fn named(mut self, name: impl Into<Arc<str>>) -> Self {
        self.name = name.into();
        self
    }

    /// Returns the retrier with a classifier deciding which failures are
    /// retryable.
    ///
    /// Returning `false` ends the run immediately with
    /// [`RetryError::Rejected`], even when attempts remain. Route
    /// programming errors and other permanent failures here.
    pub fn with_classifier(
        mut self,
        classify: impl Fn(&E) -> bool + Send + Sync + 'static,
    ) -> Self {
        self.classify = Arc::new(classify);
        self
    }

    /// Returns the retrier publishing to the given bus instead of a private
    /// one.
    pub fn with_bus(mut self, bus: Bus) -> Self {
        self.bus = bus;
        self
    }

    /// The bus this retrier publishes lifecycle events to.
    pub fn bus(&self) -> &Bus {
        &self.bus
    }

    /// The policy this retrier schedules attempts with.
    pub fn policy(&self) -> &BackoffPolicy {
        &self.policy
    }

    /// Runs `work` until success or a terminal outcome.
    ///
    /// `work` is called once per attempt and receives a child token of `ctx`;
    /// it should watch that token if the work is long-running. Deadlines are
    /// the work's own responsibility — the retrier imposes none.
    ///
    /// ### Terminal outcomes
    /// - `Ok(value)` — some attempt succeeded.
    /// - [`RetryError::Exhausted`] — all `policy.max_attempts` attempts
    ///   failed; carries every failure in order.
    /// - [`RetryError::Rejected`] — the classifier refused a failure; carries
    ///   every failure observed up to and including it.
    /// - [`RetryError::Canceled`] — `ctx` was canceled during a backoff sleep
    ///   or at an attempt boundary.
    ///
    /// A budget of zero attempts never invokes `work` and returns
    /// [`RetryError::Exhausted`] with an empty history.
    pub async fn run<T, F, Fut>(
        &self,
        ctx: &CancellationToken,
        mut work: F,
    ) -> Result<T, RetryError<E>>
    where
        F: FnMut(CancellationToken) -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: fmt::Display,
    {
        let mut causes: Vec<E> = Vec::new();

        for attempt in 1..=self.policy.max_attempts {
            if ctx.is_cancelled() {
                return Err(RetryError::Canceled);
            }

            let delay = self.policy.delay(attempt);
            if !delay.is_zero() {
                self.bus.publish(
                    Event::new(EventKind::BackoffScheduled)
                        .with_task(self.name.clone())
                        .with_attempt(attempt)
                        .with_delay(delay),
                );
                let sleep = time::sleep(delay);
                tokio::pin!(sleep);
                select! {
                    _ = &mut sleep => {}
                    _ = ctx.cancelled() => return Err(RetryError::Canceled),
                }
            }

            self.bus.publish(
                Event::new(EventKind::AttemptStarted)
                    .with_task(self.name.clone())
                    .with_attempt(attempt),
            );

            match work(ctx.child_token()).await {
                Ok(value) => {
                    self.bus.publish(
                        Event::new(EventKind::AttemptSucceeded)
                            .with_task(self.name.clone())
                            .with_attempt(attempt),
                    );
                    return Ok(value);
                }
                Err(e) => {
                    self.bus.publish(
                        Event::new(EventKind::AttemptFailed)
                            .with_task(self.name.clone())
                            .with_attempt(attempt)
                            .with_reason(e.to_string()),
                    );
                    let retryable = (self.classify)(&e);
                    causes.push(e);
                    if !retryable {
                        self.bus.publish(
                            Event::new(EventKind::RetryRejected)
                                .with_task(self.name.clone())
                                .with_attempt(attempt),
                        );
                        return Err(RetryError::Rejected { attempt, causes });
                    }
                }
            }
        }

        self.bus.publish(
            Event::new(EventKind::RetryExhausted)
                .with_task(self.name.clone())
                .with_attempt(self.policy.max_attempts),
        );
        Err(RetryError::Exhausted {
            attempts: self.policy.max_attempts,
            causes,
        })
    }
}
