//! Blocking receiver for inbound realtime events
//!
//! Provides the sync side of the channel a [`Transport`](crate::Transport)
//! writes into, without requiring async/await.

use std::sync::mpsc::{self, RecvTimeoutError, TryRecvError};
use std::time::Duration;

use crate::event::InboundEvent;

/// Outcome of a bounded wait on the event channel
#[derive(Debug, PartialEq)]
pub enum Received {
    /// An event arrived
    Event(InboundEvent),
    /// Nothing was queued (`try_recv` only)
    Empty,
    /// Nothing arrived before the deadline
    Timeout,
    /// Every sender was dropped; the session is over
    Closed,
}

/// Blocking receiver over inbound events
pub struct EventReceiver {
    rx: mpsc::Receiver<InboundEvent>,
}

impl EventReceiver {
    /// Create a connected sender/receiver pair
    pub fn channel() -> (mpsc::Sender<InboundEvent>, Self) {
        let (tx, rx) = mpsc::channel();
        (tx, Self { rx })
    }

    /// Block until an event is available
    ///
    /// Returns `None` if the channel is closed.
    pub fn recv(&self) -> Option<InboundEvent> {
        self.rx.recv().ok()
    }

    /// Try to receive an event without blocking
    pub fn try_recv(&self) -> Received {
        match self.rx.try_recv() {
            Ok(event) => Received::Event(event),
            Err(TryRecvError::Empty) => Received::Empty,
            Err(TryRecvError::Disconnected) => Received::Closed,
        }
    }

    /// Block until an event is available or `timeout` expires
    pub fn recv_timeout(&self, timeout: Duration) -> Received {
        match self.rx.recv_timeout(timeout) {
            Ok(event) => Received::Event(event),
            Err(RecvTimeoutError::Timeout) => Received::Timeout,
            Err(RecvTimeoutError::Disconnected) => Received::Closed,
        }
    }
}

impl Iterator for EventReceiver {
    type Item = InboundEvent;

    /// Block until the next event is available
    fn next(&mut self) -> Option<Self::Item> {
        self.recv()
    }
}
