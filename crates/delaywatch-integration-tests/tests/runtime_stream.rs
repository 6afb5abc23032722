//! The tokio loop driving a channel over a decoded event stream.

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use delaywatch_live::{
    inbox, run_channel, Category, ChannelConfig, ChannelHandle, ConnectionId, LiveChannel,
    Result, SseDecoder, TokioTimer, Transport,
};

const STREAM: &[&str] = &[
    ": connected\n\n",
    "event: route\ndata: {\"type\":\"route_affected\",\"routeId\":\"r9\",",
    "\"affectedSegments\":[\"a\",\"b\"],\"newDuration\":27}\r\n\r\n",
    "data: heartbeat\n\n",
    "event: route\ndata: {\"type\":\"route_clear\",\"routeId\":\"r9\",\"affectedSegments\":[]}\n\n",
];

/// Fails the first attempt, then replays `STREAM` in chunks.
struct FlakyStream {
    handle: ChannelHandle,
    attempts: Rc<RefCell<u32>>,
}

impl Transport for FlakyStream {
    fn open(&mut self, _url: &str, conn: ConnectionId) -> Result<()> {
        *self.attempts.borrow_mut() += 1;
        if *self.attempts.borrow() == 1 {
            return self.handle.error(conn, "503 service unavailable");
        }

        self.handle.opened(conn)?;
        let mut decoder = SseDecoder::new();
        for chunk in STREAM {
            for frame in decoder.feed(chunk) {
                self.handle.frame(conn, frame)?;
            }
        }
        Ok(())
    }

    fn close(&mut self, _conn: ConnectionId) {}
}

#[tokio::test(start_paused = true)]
async fn stream_recovers_and_delivers_in_order() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("debug")
        .with_test_writer()
        .try_init();

    let (handle, mut inbox) = inbox();
    let attempts = Rc::new(RefCell::new(0));
    let transport = FlakyStream {
        handle: handle.clone(),
        attempts: Rc::clone(&attempts),
    };
    let config = ChannelConfig::default().with_reconnect_interval(Duration::from_millis(500));
    let mut channel = LiveChannel::new(config, transport, TokioTimer::new(handle.clone()));

    let seen = Rc::new(RefCell::new(Vec::new()));
    let s = Rc::clone(&seen);
    let _sub = channel.subscribe_fn(Category::Route, move |event| {
        let route = event.as_route().unwrap();
        s.borrow_mut().push((route.kind, route.affected_segments.len()));
    });

    handle.connect(Some("secret".into())).unwrap();
    let driver = async {
        tokio::time::sleep(Duration::from_millis(400)).await;
        assert_eq!(*attempts.borrow(), 1);
        tokio::time::sleep(Duration::from_secs(2)).await;
        handle.shutdown().unwrap();
    };
    tokio::join!(run_channel(&mut channel, &mut inbox), driver);

    assert_eq!(*attempts.borrow(), 2);
    let seen = seen.borrow();
    assert_eq!(seen.len(), 2);
    assert_eq!(seen[0].1, 2);
    assert_eq!(seen[1].1, 0);
    assert!(!channel.is_connected());
    assert!(!channel.reconnect_pending());
}
