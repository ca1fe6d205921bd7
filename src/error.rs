//! Error types used by the retry engine, the quiescence barrier, and batch
//! waits.
//!
//! This module defines three error types:
//!
//! - [`RetryError`] — terminal outcome of an exhausted or rejected retry run,
//!   carrying the full attempt history.
//! - [`DrainError`] — a drain wait that was canceled before quiescence.
//! - [`JoinTimeout`] — a timed batch wait that elapsed.
//!
//! Batch cancellation is deliberately **not** an error: it is a queryable
//! outcome ([`BatchOutcome::Cancelled`](crate::BatchOutcome)).

use std::time::Duration;
use thiserror::Error;

/// # Terminal failure of a retry run.
///
/// Both failure variants carry `causes`: every error observed across the run,
/// in chronological order, so no attempt's failure is lost. The last element
/// is the error that ended the run.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum RetryError<E> {
    /// Every allowed attempt failed.
    #[error("retries exhausted after {attempts} attempts")]
    Exhausted {
        /// Number of attempts made (equals the policy's attempt budget).
        attempts: u32,
        /// All observed failures, oldest first.
        causes: Vec<E>,
    },

    /// The classifier judged an error non-retryable while attempts remained.
    #[error("non-retryable failure on attempt {attempt}")]
    Rejected {
        /// The attempt whose failure was rejected.
        attempt: u32,
        /// All observed failures, oldest first.
        causes: Vec<E>,
    },

    /// The run was canceled during a backoff sleep or at an attempt boundary.
    #[error("retry canceled")]
    Canceled,
}

impl<E> RetryError<E> {
    /// Returns the full failure history, oldest first.
    ///
    /// Empty for [`RetryError::Canceled`] and for a zero-attempt budget.
    pub fn causes(&self) -> &[E] {
        match self {
            RetryError::Exhausted { causes, .. } | RetryError::Rejected { causes, .. } => causes,
            RetryError::Canceled => &[],
        }
    }

    /// Returns the error that ended the run, if any attempt was made.
    pub fn last_cause(&self) -> Option<&E> {
        self.causes().last()
    }

    /// Returns the number of attempts that were made.
    pub fn attempts(&self) -> u32 {
        match self {
            RetryError::Exhausted { attempts, .. } => *attempts,
            RetryError::Rejected { attempt, .. } => *attempt,
            RetryError::Canceled => 0,
        }
    }

    /// True if the run ended because of cancellation.
    pub fn is_canceled(&self) -> bool {
        matches!(self, RetryError::Canceled)
    }
}

/// # A drain wait that did not reach quiescence.
///
/// In-flight work is unaffected: the barrier reopens and deferred submitters
/// proceed as if the drain had never been requested.
#[non_exhaustive]
#[derive(Error, Debug, PartialEq, Eq)]
pub enum DrainError {
    /// The caller's token was canceled while waiting for running work to
    /// finish; the quiescent callback did not run.
    #[error("drain canceled before quiescence")]
    Canceled,
}

/// # A timed batch wait that elapsed.
///
/// Raised by [`BatchHandle::join_timeout`](crate::BatchHandle::join_timeout)
/// whether the deadline passed before the batch started or before it
/// finished. Timing out does **not** cancel the batch.
#[derive(Error, Debug, PartialEq, Eq)]
#[error("timed out after {timeout:?} waiting for batch completion")]
pub struct JoinTimeout {
    /// The deadline that elapsed.
    pub timeout: Duration,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn causes_are_preserved_in_order() {
        let err: RetryError<String> = RetryError::Exhausted {
            attempts: 3,
            causes: vec!["one".into(), "two".into(), "three".into()],
        };
        assert_eq!(err.causes().len(), 3);
        assert_eq!(err.last_cause().map(String::as_str), Some("three"));
        assert_eq!(err.attempts(), 3);
    }

    #[test]
    fn canceled_has_no_causes() {
        let err: RetryError<String> = RetryError::Canceled;
        assert!(err.causes().is_empty());
        assert!(err.last_cause().is_none());
        assert!(err.is_canceled());
    }

    #[test]
    fn messages_are_stable() {
        let err: RetryError<String> = RetryError::Rejected {
            attempt: 2,
            causes: vec!["boom".into()],
        };
        assert_eq!(err.to_string(), "non-retryable failure on attempt 2");
        assert_eq!(
            DrainError::Canceled.to_string(),
            "drain canceled before quiescence"
        );
    }
}
