//! Lifecycle events: types and broadcast bus.
//!
//! This module groups the event **data model** and the **bus** used to
//! publish/subscribe to events emitted by the retry engine, the quiescence
//! barrier, and the batch fan-out.
//!
//! ## Contents
//! - [`EventKind`], [`Event`] event classification and payload metadata
//! - [`Bus`] thin wrapper over `tokio::sync::broadcast`
//!
//! ## Quick reference
//! - **Publishers**: `Retrier`, `QuiescenceBarrier`, `Fanout`/`BatchHandle`.
//! - **Consumers**: anything holding a `Bus` receiver; typically a
//!   [`SubscriberSet`](crate::SubscriberSet) attached via `spawn_listener`.

mod bus;
mod event;

pub use bus::{Bus, DEFAULT_BUS_CAPACITY};
pub use event::{Event, EventKind};
