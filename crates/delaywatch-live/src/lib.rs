//! DelayWatch Live
//!
//! Subscribes to the server's push stream of delay and route updates and
//! fans each event out to registered listeners, reconnecting on failure.
//!
//! # Architecture
//!
//! ```text
//! Transport ──bytes──→ SseDecoder ──frames──┐
//! TokioTimer ──────────timer fired──────────┼──→ ChannelHandle ──→ run_channel
//! application ──────connect/disconnect──────┘                          │
//!                                                                      ▼
//!                          ListenerRegistry ←──dispatch── LiveChannel ──open/close──→ Transport
//! ```
//!
//! - **Channel**: connection state machine with one-shot reconnect backoff
//! - **Events**: typed payloads for the `delay` and `route` categories
//! - **Listeners**: per-category callbacks, safe to unsubscribe mid-dispatch
//! - **Runtime**: tokio loop that serializes every input onto one task
//! - **Sse**: incremental `text/event-stream` decoder for transports
//!
//! # Example
//!
//! ```no_run
//! use delaywatch_live::{inbox, run_channel, Category, ChannelConfig, LiveChannel, TokioTimer};
//! # use delaywatch_live::{ConnectionId, Transport};
//! # struct Stream;
//! # impl Transport for Stream {
//! #     fn open(&mut self, _: &str, _: ConnectionId) -> delaywatch_live::Result<()> { Ok(()) }
//! #     fn close(&mut self, _: ConnectionId) {}
//! # }
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() {
//!     let (handle, mut inbox) = inbox();
//!     let mut channel = LiveChannel::new(
//!         ChannelConfig::from_env(),
//!         Stream,
//!         TokioTimer::new(handle.clone()),
//!     );
//!     let _sub = channel.subscribe_fn(Category::Delay, |event| {
//!         println!("{:?}", event);
//!     });
//!
//!     handle.connect(None).unwrap();
//!     let stop = async {
//!         tokio::signal::ctrl_c().await.ok();
//!         handle.shutdown().ok();
//!     };
//!     tokio::join!(run_channel(&mut channel, &mut inbox), stop);
//! }
//! ```

pub mod channel;
pub mod config;
pub mod error;
pub mod events;
pub mod listeners;
pub mod runtime;
pub mod sse;
pub mod transport;

pub use channel::{ConnectionState, LiveChannel};
pub use config::ChannelConfig;
pub use error::{Error, Result};
pub use events::{
    Category, ChannelEvent, DelayUpdate, DelayUpdateKind, RouteUpdate, RouteUpdateKind,
};
pub use listeners::{Listener, ListenerRegistry, Subscription};
pub use runtime::{inbox, run_channel, ChannelHandle, ChannelInbox, ChannelInput, TokioTimer};
pub use sse::{SseDecoder, SseFrame};
pub use transport::{ConnectionId, TimerId, Timer, Transport};
