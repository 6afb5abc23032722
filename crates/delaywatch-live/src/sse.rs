//! Incremental `text/event-stream` decoder.
//!
//! Transports that receive the push stream as raw text feed it here and
//! forward each completed [`SseFrame`] to the channel. Chunks may split
//! lines (and CRLF pairs) anywhere.

use tracing::warn;

/// Event name used when a frame has no `event:` field.
pub const DEFAULT_EVENT: &str = "message";

/// Longest unterminated line kept while waiting for its line ending.
pub const MAX_LINE_BYTES: usize = 64 * 1024;

/// One dispatched server-sent event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SseFrame {
    pub event: String,
    pub data: String,
    /// Last event id seen on the stream, if any
    pub id: Option<String>,
}

/// Line-oriented decoder state.
#[derive(Debug, Default)]
pub struct SseDecoder {
    buffer: String,
    skip_lf: bool,
    /// Dropping the rest of an oversized line
    discarding: bool,
    event: Option<String>,
    data: Vec<String>,
    last_event_id: Option<String>,
    retry: Option<u64>,
}

impl SseDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed a chunk of the stream, returning any frames it completed.
    ///
    /// A line longer than [`MAX_LINE_BYTES`] is dropped together with the
    /// event it belongs to.
    pub fn feed(&mut self, chunk: &str) -> Vec<SseFrame> {
        let mut input = chunk;
        if self.skip_lf && !input.is_empty() {
            input = input.strip_prefix('\n').unwrap_or(input);
            self.skip_lf = false;
        }
        let mut buffer = std::mem::take(&mut self.buffer);
        buffer.push_str(input);

        let mut frames = Vec::new();
        let mut start = 0;
        while let Some(offset) = buffer[start..].find(|c: char| c == '\r' || c == '\n') {
            let end = start + offset;
            let mut next = end + 1;
            if buffer.as_bytes()[end] == b'\r' {
                match buffer.as_bytes().get(next) {
                    Some(b'\n') => next += 1,
                    None => self.skip_lf = true,
                    Some(_) => {}
                }
            }
            let line = &buffer[start..end];
            start = next;

            if self.discarding {
                self.discarding = false;
                continue;
            }
            if let Some(frame) = self.process_line(line) {
                frames.push(frame);
            }
        }
        buffer.drain(..start);

        if self.discarding || buffer.len() > MAX_LINE_BYTES {
            if !self.discarding {
                warn!(len = buffer.len(), "dropping oversized event-stream line");
                self.event = None;
                self.data.clear();
                self.discarding = true;
            }
            buffer.clear();
        }
        self.buffer = buffer;
        frames
    }

    /// Reconnection delay last requested by the server, in milliseconds.
    pub fn retry_hint(&self) -> Option<u64> {
        self.retry
    }

    pub fn last_event_id(&self) -> Option<&str> {
        self.last_event_id.as_deref()
    }

    /// Drop any partially received event, e.g. after the connection was
    /// replaced. The last event id is kept.
    pub fn reset(&mut self) {
        self.buffer.clear();
        self.skip_lf = false;
        self.discarding = false;
        self.event = None;
        self.data.clear();
    }

    fn process_line(&mut self, line: &str) -> Option<SseFrame> {
        if line.is_empty() {
            return self.dispatch();
        }
        if line.starts_with(':') {
            return None;
        }

        let (field, value) = match line.split_once(':') {
            Some((field, value)) => (field, value.strip_prefix(' ').unwrap_or(value)),
            None => (line, ""),
        };

        match field {
            "event" => self.event = Some(value.to_string()),
            "data" => self.data.push(value.to_string()),
            "id" if !value.contains('\0') => self.last_event_id = Some(value.to_string()),
            "retry" if !value.is_empty() && value.bytes().all(|b| b.is_ascii_digit()) => {
                self.retry = value.parse().ok();
            }
            _ => {}
        }
        None
    }

    fn dispatch(&mut self) -> Option<SseFrame> {
        let event = self.event.take();
        if self.data.is_empty() {
            return None;
        }
        let data = std::mem::take(&mut self.data).join("\n");
        Some(SseFrame {
            event: event.unwrap_or_else(|| DEFAULT_EVENT.to_string()),
            data,
            id: self.last_event_id.clone(),
        })
    }
}
