//! Tokio event loop for a [`LiveChannel`].
//!
//! Every state change happens on the task running [`run_channel`]. Transport
//! callbacks, timer fires and user commands are posted to it as
//! [`ChannelInput`]s through a cloneable [`ChannelHandle`], so the channel
//! itself needs no locking.
//!
//! ```text
//!  transport task ──opened/message/error──┐
//!  TokioTimer sleep ──────timer fired─────┼──→ inbox ──→ run_channel ──→ LiveChannel ──→ listeners
//!  application ───connect/disconnect──────┘
//! ```

use std::collections::HashMap;
use std::ops::ControlFlow;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::channel::LiveChannel;
use crate::error::{Error, Result};
use crate::sse::SseFrame;
use crate::transport::{ConnectionId, TimerId, Timer, Transport};

/// Something that happened and must be applied to the channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelInput {
    Connect { token: Option<String> },
    Disconnect,
    Opened(ConnectionId),
    Message {
        conn: ConnectionId,
        event: String,
        data: String,
    },
    Error {
        conn: ConnectionId,
        reason: String,
    },
    TimerFired(TimerId),
    /// Disconnect and stop the event loop
    Shutdown,
}

/// Posts inputs to a running channel loop. Cheap to clone and `Send`.
#[derive(Debug, Clone)]
pub struct ChannelHandle {
    tx: mpsc::UnboundedSender<ChannelInput>,
}

/// Receiving end consumed by [`run_channel`].
#[derive(Debug)]
pub struct ChannelInbox {
    rx: mpsc::UnboundedReceiver<ChannelInput>,
}

/// Create a connected handle/inbox pair.
pub fn inbox() -> (ChannelHandle, ChannelInbox) {
    let (tx, rx) = mpsc::unbounded_channel();
    (ChannelHandle { tx }, ChannelInbox { rx })
}

impl ChannelHandle {
    pub fn send(&self, input: ChannelInput) -> Result<()> {
        self.tx.send(input).map_err(|_| Error::LoopClosed)
    }

    pub fn connect(&self, token: Option<String>) -> Result<()> {
        self.send(ChannelInput::Connect { token })
    }

    pub fn disconnect(&self) -> Result<()> {
        self.send(ChannelInput::Disconnect)
    }

    pub fn shutdown(&self) -> Result<()> {
        self.send(ChannelInput::Shutdown)
    }

    pub fn opened(&self, conn: ConnectionId) -> Result<()> {
        self.send(ChannelInput::Opened(conn))
    }

    pub fn message(
        &self,
        conn: ConnectionId,
        event: impl Into<String>,
        data: impl Into<String>,
    ) -> Result<()> {
        self.send(ChannelInput::Message {
            conn,
            event: event.into(),
            data: data.into(),
        })
    }

    /// Forward a decoded server-sent event.
    pub fn frame(&self, conn: ConnectionId, frame: SseFrame) -> Result<()> {
        self.message(conn, frame.event, frame.data)
    }

    pub fn error(&self, conn: ConnectionId, reason: impl Into<String>) -> Result<()> {
        self.send(ChannelInput::Error {
            conn,
            reason: reason.into(),
        })
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

/// [`Timer`] backed by `tokio::time::sleep` tasks that post
/// [`ChannelInput::TimerFired`] back to the loop.
///
/// Cancelling aborts the sleeping task. A fire that was already queued
/// before the abort is discarded by the channel's timer id check.
///
/// The timer only holds a weak sender, so it never keeps the loop alive on
/// its own.
#[derive(Debug)]
pub struct TokioTimer {
    tx: mpsc::WeakUnboundedSender<ChannelInput>,
    next: u64,
    tasks: HashMap<TimerId, JoinHandle<()>>,
}

impl TokioTimer {
    pub fn new(handle: ChannelHandle) -> Self {
        Self {
            tx: handle.tx.downgrade(),
            next: 0,
            tasks: HashMap::new(),
        }
    }

    /// Timers scheduled and not yet finished or cancelled.
    pub fn active(&self) -> usize {
        self.tasks.values().filter(|t| !t.is_finished()).count()
    }
}

impl Timer for TokioTimer {
    fn schedule(&mut self, delay: Duration) -> TimerId {
        self.tasks.retain(|_, task| !task.is_finished());

        self.next += 1;
        let id = TimerId(self.next);
        let tx = self.tx.clone();
        let task = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            // Loop gone means nobody is waiting for this timer.
            if let Some(tx) = tx.upgrade() {
                let _ = tx.send(ChannelInput::TimerFired(id));
            }
        });
        self.tasks.insert(id, task);
        id
    }

    fn cancel(&mut self, id: TimerId) {
        if let Some(task) = self.tasks.remove(&id) {
            task.abort();
        }
    }
}

impl Drop for TokioTimer {
    fn drop(&mut self) {
        for (_, task) in self.tasks.drain() {
            task.abort();
        }
    }
}

/// Apply one input to the channel.
pub fn apply<T: Transport, S: Timer>(
    channel: &mut LiveChannel<T, S>,
    input: ChannelInput,
) -> ControlFlow<()> {
    match input {
        ChannelInput::Connect { token } => channel.connect(token),
        ChannelInput::Disconnect => channel.disconnect(),
        ChannelInput::Opened(conn) => channel.handle_open(conn),
        ChannelInput::Message { conn, event, data } => {
            channel.handle_message(conn, &event, &data);
        }
        ChannelInput::Error { conn, reason } => channel.handle_error(conn, &reason),
        ChannelInput::TimerFired(id) => channel.handle_timer(id),
        ChannelInput::Shutdown => {
            channel.disconnect();
            return ControlFlow::Break(());
        }
    }
    ControlFlow::Continue(())
}

/// Drive `channel` until [`ChannelInput::Shutdown`] arrives or every
/// [`ChannelHandle`] is dropped. A [`TokioTimer`] does not count as a
/// handle. The channel is disconnected on exit.
pub async fn run_channel<T: Transport, S: Timer>(
    channel: &mut LiveChannel<T, S>,
    inbox: &mut ChannelInbox,
) {
    while let Some(input) = inbox.rx.recv().await {
        if apply(channel, input).is_break() {
            debug!("channel loop shutting down");
            return;
        }
    }
    debug!("all channel handles dropped");
    channel.disconnect();
}
