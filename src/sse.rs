//! SSE (Server-Sent Events) parser for the push channel.
//!
//! Frames are separated by a blank line. Within a frame `event:` names the
//! event and one or more `data:` lines carry its payload; both `data: {...}`
//! and the compact `data:{...}` are accepted. Frames without an `event:`
//! line take their name from the payload's `type` field, falling back to
//! `message`.

use serde_json::Value;

/// A parsed SSE event.
#[derive(Debug, Clone, PartialEq)]
pub struct SseEvent {
    pub name: String,
    /// JSON payload; non-JSON data is kept as a string value.
    pub data: Value,
}

/// Incremental decoder fed with raw chunks as they arrive.
///
/// Chunk boundaries may fall anywhere, including inside a multi-byte
/// character; bytes are only decoded once a whole frame is buffered.
#[derive(Debug, Default)]
pub struct SseDecoder {
    buffer: Vec<u8>,
}

impl SseDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a chunk and return every event completed by it.
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<SseEvent> {
        self.buffer.extend(chunk.iter().copied().filter(|b| *b != b'\r'));

        let mut events = Vec::new();
        while let Some(end) = find_frame_end(&self.buffer) {
            let frame: Vec<u8> = self.buffer.drain(..end + 2).collect();
            let text = String::from_utf8_lossy(&frame[..end]);
            if let Some(event) = parse_frame(&text) {
                events.push(event);
            }
        }
        events
    }

    /// Parse whatever is left once the stream has ended.
    pub fn finish(&mut self) -> Option<SseEvent> {
        let rest = std::mem::take(&mut self.buffer);
        parse_frame(&String::from_utf8_lossy(&rest))
    }
}

/// Parse a complete SSE body into events.
pub fn parse_sse_events(bytes: &[u8]) -> Vec<SseEvent> {
    let mut decoder = SseDecoder::new();
    let mut events = decoder.feed(bytes);
    events.extend(decoder.finish());
    events
}

fn find_frame_end(buffer: &[u8]) -> Option<usize> {
    buffer.windows(2).position(|w| w == b"\n\n")
}

fn parse_frame(frame: &str) -> Option<SseEvent> {
    let mut name: Option<String> = None;
    let mut data_lines: Vec<&str> = Vec::new();

    for line in frame.lines() {
        if line.is_empty() || line.starts_with(':') {
            continue;
        }
        if let Some(value) = line.strip_prefix("event:") {
            name = Some(value.trim().to_string());
        } else if let Some(value) = line.strip_prefix("data:") {
            data_lines.push(value.strip_prefix(' ').unwrap_or(value));
        }
    }

    if data_lines.is_empty() {
        return None;
    }
    let raw = data_lines.join("\n");
    let data = serde_json::from_str::<Value>(raw.trim()).unwrap_or(Value::String(raw));

    let name = name
        .filter(|n| !n.is_empty())
        .or_else(|| data.get("type").and_then(|t| t.as_str()).map(str::to_string))
        .unwrap_or_else(|| "message".to_string());

    Some(SseEvent { name, data })
}
