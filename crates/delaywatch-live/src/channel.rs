//! Reconnecting push-event channel.
//!
//! ```text
//!                 connect()             transport open
//! Disconnected ───────────────→ Connecting ──────────→ Connected
//!      ↑                            │                      │
//!      └──── transport error ───────┴──────────────────────┘
//!            (reconnect scheduled after backoff)
//!
//!      disconnect() from any state → Disconnected, no reconnect
//! ```
//!
//! # Reconnect
//!
//! A transport error tears the connection down at once and schedules a
//! single reconnect after [`ChannelConfig::reconnect_interval`]. At most one
//! reconnect timer is pending at any time. `disconnect()` cancels it and the
//! channel then stays down until `connect()` is called again.
//!
//! # Delivery
//!
//! Events reach listeners in the order the transport delivered them.
//! Events sent by the server while the channel was down are **not**
//! replayed: a listener may miss updates across a reconnect and should
//! refetch state it cannot afford to lose. Malformed payloads are logged
//! and dropped.
//!
//! # Threading
//!
//! A channel lives on one thread and is driven from one event loop (see
//! [`runtime`](crate::runtime)). It holds no locks.

use std::rc::Rc;

use tracing::{debug, info, warn};

use crate::config::ChannelConfig;
use crate::events::{Category, ChannelEvent};
use crate::listeners::{Listener, ListenerRegistry, Subscription};
use crate::transport::{ConnectionId, TimerId, Timer, Transport};

/// Connection state of a [`LiveChannel`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ConnectionState {
    #[default]
    Disconnected,
    Connecting,
    Connected,
}

/// Live subscription to the push endpoint.
pub struct LiveChannel<T, S> {
    config: ChannelConfig,
    transport: T,
    timer: S,
    state: ConnectionState,
    /// Connection whose callbacks are currently honoured
    current: Option<ConnectionId>,
    next_conn: u64,
    /// The one pending reconnect, if any
    pending_reconnect: Option<TimerId>,
    /// Token reused by automatic reconnects
    token: Option<String>,
    listeners: ListenerRegistry,
}

impl<T: Transport, S: Timer> LiveChannel<T, S> {
    pub fn new(config: ChannelConfig, transport: T, timer: S) -> Self {
        Self {
            config,
            transport,
            timer,
            state: ConnectionState::Disconnected,
            current: None,
            next_conn: 0,
            pending_reconnect: None,
            token: None,
            listeners: ListenerRegistry::new(),
        }
    }

    /// Open the push connection.
    ///
    /// No-op while a connection is already open or opening. Automatic
    /// reconnects reuse `token`.
    pub fn connect(&mut self, token: Option<String>) {
        if self.current.is_some() {
            debug!(state = ?self.state, "connect ignored, transport already active");
            return;
        }
        self.cancel_reconnect();
        self.token = token;
        self.open_transport();
    }

    /// Close the connection and stop reconnecting.
    ///
    /// When this returns no pending timer remains, the transport is closed,
    /// and later callbacks from either are ignored.
    pub fn disconnect(&mut self) {
        self.cancel_reconnect();
        if let Some(conn) = self.current.take() {
            info!(%conn, "disconnecting");
            self.transport.close(conn);
        }
        self.token = None;
        self.state = ConnectionState::Disconnected;
    }

    /// The transport finished opening.
    pub fn handle_open(&mut self, conn: ConnectionId) {
        if !self.is_current(conn) {
            debug!(%conn, "ignoring open from stale connection");
            return;
        }
        info!(%conn, url = %self.config.url, "connected");
        self.cancel_reconnect();
        self.state = ConnectionState::Connected;
    }

    /// The transport failed, either while opening or once open.
    pub fn handle_error(&mut self, conn: ConnectionId, reason: &str) {
        if !self.is_current(conn) {
            debug!(%conn, reason, "ignoring error from stale connection");
            return;
        }
        warn!(%conn, reason, "transport error");
        self.teardown();
        self.schedule_reconnect();
    }

    /// The transport received a named event.
    ///
    /// Returns the number of listeners the event was delivered to.
    pub fn handle_message(&mut self, conn: ConnectionId, name: &str, data: &str) -> usize {
        if !self.is_current(conn) {
            debug!(%conn, event = name, "ignoring message from stale connection");
            return 0;
        }
        if name == crate::sse::DEFAULT_EVENT {
            debug!(%conn, data, "unnamed message");
            return 0;
        }

        match ChannelEvent::parse_named(name, data) {
            Ok(event) => self.listeners.dispatch(&event),
            Err(e) => {
                warn!(%conn, event = name, error = %e, "dropping event");
                0
            }
        }
    }

    /// A timer scheduled through [`Timer::schedule`] fired.
    pub fn handle_timer(&mut self, id: TimerId) {
        if self.pending_reconnect != Some(id) {
            debug!(timer = %id, "ignoring stale timer");
            return;
        }
        self.pending_reconnect = None;
        if self.current.is_some() {
            return;
        }
        debug!(timer = %id, "reconnecting");
        self.open_transport();
    }

    /// Register a listener for one category of events.
    pub fn subscribe(&self, category: Category, listener: Listener) -> Subscription {
        self.listeners.subscribe(category, listener)
    }

    /// Register a closure for one category of events.
    pub fn subscribe_fn<F>(&self, category: Category, f: F) -> Subscription
    where
        F: Fn(&ChannelEvent) + 'static,
    {
        self.subscribe(category, Rc::new(f))
    }

    /// Whether the transport is open. A pending reconnect does not count.
    pub fn is_connected(&self) -> bool {
        self.state == ConnectionState::Connected
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn reconnect_pending(&self) -> bool {
        self.pending_reconnect.is_some()
    }

    /// Connection whose callbacks are currently accepted.
    pub fn current_connection(&self) -> Option<ConnectionId> {
        self.current
    }

    pub fn listener_count(&self, category: Category) -> usize {
        self.listeners.count(category)
    }

    pub fn config(&self) -> &ChannelConfig {
        &self.config
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn timer(&self) -> &S {
        &self.timer
    }

    fn is_current(&self, conn: ConnectionId) -> bool {
        self.current == Some(conn)
    }

    fn open_transport(&mut self) {
        self.next_conn += 1;
        let conn = ConnectionId(self.next_conn);
        let url = self.config.endpoint(self.token.as_deref());

        info!(%conn, url = %self.config.url, "connecting");
        self.current = Some(conn);
        self.state = ConnectionState::Connecting;

        if let Err(e) = self.transport.open(&url, conn) {
            warn!(%conn, error = %e, "transport failed to open");
            self.teardown();
            self.schedule_reconnect();
        }
    }

    fn teardown(&mut self) {
        if let Some(conn) = self.current.take() {
            self.transport.close(conn);
        }
        self.state = ConnectionState::Disconnected;
    }

    fn schedule_reconnect(&mut self) {
        if self.pending_reconnect.is_some() {
            debug!("reconnect already scheduled");
            return;
        }
        let delay = self.config.reconnect_interval;
        let id = self.timer.schedule(delay);
        debug!(timer = %id, delay_ms = delay.as_millis() as u64, "reconnect scheduled");
        self.pending_reconnect = Some(id);
    }

    fn cancel_reconnect(&mut self) {
        if let Some(id) = self.pending_reconnect.take() {
            self.timer.cancel(id);
        }
    }
}

impl<T, S> std::fmt::Debug for LiveChannel<T, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LiveChannel")
            .field("url", &self.config.url)
            .field("state", &self.state)
            .field("current", &self.current)
            .field("pending_reconnect", &self.pending_reconnect)
            .field("listeners", &self.listeners)
            .finish()
    }
}
