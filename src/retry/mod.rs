//! Retry engine.
//!
//! [`Retrier`] re-invokes a unit of work under a [`BackoffPolicy`], consults
//! a caller-supplied classifier on every failure, sleeps cancellably between
//! attempts, and surfaces a terminal error that preserves the complete
//! failure history.
//!
//! [`BackoffPolicy`]: crate::BackoffPolicy

mod retrier;

pub use retrier::Retrier;
