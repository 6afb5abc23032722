//! Capabilities the channel needs from its environment.
//!
//! The channel never touches a socket or a clock directly. A [`Transport`]
//! opens and closes the push connection; a [`Timer`] schedules the
//! reconnect backoff. Both report back by calling the channel's `handle_*`
//! methods (directly, or through the [`runtime`](crate::runtime) loop),
//! tagged with the id they were given so stale callbacks can be discarded.

use std::fmt;
use std::time::Duration;

use crate::error::Result;

/// Identifies one connection attempt.
///
/// A fresh id is issued for every `open`. Callbacks carrying an id other
/// than the channel's current one belong to a torn-down connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConnectionId(pub u64);

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "conn#{}", self.0)
    }
}

/// Identifies one scheduled timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(pub u64);

impl fmt::Display for TimerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "timer#{}", self.0)
    }
}

/// A server-push connection.
///
/// Implementations report `opened`, `message` and `error` for the given
/// [`ConnectionId`] once they happen. An `Err` from `open` is treated like
/// an immediate transport error.
pub trait Transport {
    /// Begin connecting to `url`.
    fn open(&mut self, url: &str, conn: ConnectionId) -> Result<()>;

    /// Tear down the connection. Must be safe to call for a connection that
    /// already failed.
    fn close(&mut self, conn: ConnectionId);
}

/// One-shot timers for the reconnect backoff.
pub trait Timer {
    /// Arrange for the channel to be told `TimerId` fired after `delay`.
    fn schedule(&mut self, delay: Duration) -> TimerId;

    /// Cancel a scheduled timer. Cancelling a fired or unknown timer is a
    /// no-op.
    fn cancel(&mut self, id: TimerId);
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn open(&mut self, url: &str, conn: ConnectionId) -> Result<()> {
        (**self).open(url, conn)
    }

    fn close(&mut self, conn: ConnectionId) {
        (**self).close(conn)
    }
}

impl<S: Timer + ?Sized> Timer for Box<S> {
    fn schedule(&mut self, delay: Duration) -> TimerId {
        (**self).schedule(delay)
    }

    fn cancel(&mut self, id: TimerId) {
        (**self).cancel(id)
    }
}
