//! # Event bus for broadcasting lifecycle events.
//!
//! [`Bus`] is a thin wrapper around [`tokio::sync::broadcast`] that lets the
//! retry engine, the barrier, and the fan-out publish without blocking and
//! without knowing who (if anyone) is listening.
//!
//! ## Rules
//! - **Non-blocking publish**: `publish()` never blocks or awaits.
//! - **Bounded capacity**: a single ring buffer stores recent events for all
//!   receivers.
//! - **Lag handling**: slow receivers get `RecvError::Lagged(n)` and skip the
//!   `n` oldest items.
//! - **No persistence**: events published while no receiver exists are
//!   dropped.

use tokio::sync::broadcast;

use super::event::Event;

/// Default ring-buffer capacity used when a component builds its own bus.
pub const DEFAULT_BUS_CAPACITY: usize = 1024;

/// Broadcast channel for lifecycle events.
///
/// Cheap to clone (internally an `Arc`-backed sender); multiple publishers
/// may publish concurrently, and each receiver observes its own cursor over
/// the shared ring buffer.
#[derive(Clone, Debug)]
pub struct Bus {
    tx: broadcast::Sender<Event>,
}

impl Bus {
    /// Creates a new bus with the given channel capacity (clamped to ≥ 1).
    pub fn new(capacity: usize) -> Self {
        let (tx, _rx) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    /// Publishes an event to all active receivers.
    ///
    /// If there are no receivers, the event is dropped; the call still
    /// returns immediately.
    pub fn publish(&self, ev: Event) {
        let _ = self.tx.send(ev);
    }

    /// Creates a receiver that observes events published from now on.
    ///
    /// Each call creates an independent receiver; receivers that fall behind
    /// by more than the bus capacity observe `RecvError::Lagged`.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.tx.subscribe()
    }
}

impl Default for Bus {
    /// Returns a bus with [`DEFAULT_BUS_CAPACITY`].
    fn default() -> Self {
        Bus::new(DEFAULT_BUS_CAPACITY)
    }
}
