//! Streaming response processing for chat completions.
//!
//! [`SSEParser`] turns raw body bytes into server-sent events and
//! [`StreamAccumulator`] folds those events into the metrics of one request.

use std::time::Duration;

use vllm_bench_core::CompletionMetrics;

use crate::error::VendorError;
use crate::wire::{ChatCompletionChunk, Usage};

// ============================================================================
// SSE Parser
// ============================================================================

/// Maximum buffer size (1MB) for a single unterminated event.
const MAX_BUFFER_SIZE: usize = 1024 * 1024;

/// Server-Sent Events (SSE) parser.
///
/// Buffers incoming bytes and extracts complete events. Bytes are only decoded
/// once an event is complete, so multi-byte characters split across network
/// reads survive intact. Carriage returns are dropped, which makes `\r\n`
/// framing equivalent to `\n`.
///
/// # SSE Format
///
/// ```text
/// data: {"choices":[{"delta":{"content":"Hello"}}]}
///
/// data: {"choices":[{"delta":{"content":" world"}}]}
///
/// data: [DONE]
/// ```
#[derive(Debug, Default)]
pub struct SSEParser {
    /// Bytes of the event currently being received
    buffer: Vec<u8>,
}

impl SSEParser {
    /// Create a new SSE parser.
    pub fn new() -> Self {
        Self { buffer: Vec::new() }
    }

    /// Feed bytes into the parser and return any complete events.
    ///
    /// # Errors
    ///
    /// Fails when a single event grows past 1MB without a terminator.
    pub fn feed(&mut self, bytes: &[u8]) -> Result<Vec<SSEEvent>, VendorError> {
        self.buffer.extend(bytes.iter().copied().filter(|b| *b != b'\r'));

        let mut events = Vec::new();

        // Events are separated by a blank line
        while let Some(pos) = find_event_end(&self.buffer) {
            let raw: Vec<u8> = self.buffer.drain(..pos + 2).collect();
            if let Some(event) = parse_event(&String::from_utf8_lossy(&raw)) {
                events.push(event);
            }
        }

        if self.buffer.len() > MAX_BUFFER_SIZE {
            return Err(VendorError::Malformed(format!(
                "SSE event exceeded {MAX_BUFFER_SIZE} bytes without a terminator"
            )));
        }

        Ok(events)
    }

    /// Flush a final event that arrived without a trailing blank line.
    pub fn finish(&mut self) -> Option<SSEEvent> {
        if self.buffer.is_empty() {
            return None;
        }
        let raw = std::mem::take(&mut self.buffer);
        parse_event(&String::from_utf8_lossy(&raw))
    }
}

fn find_event_end(buffer: &[u8]) -> Option<usize> {
    buffer.windows(2).position(|w| w == b"\n\n")
}

/// Parse a single SSE event from its text representation.
fn parse_event(raw: &str) -> Option<SSEEvent> {
    let mut data_lines = Vec::new();
    let mut event_type = None;

    for line in raw.lines() {
        if line.is_empty() || line.starts_with(':') {
            continue;
        }

        if let Some(value) = line.strip_prefix("data:") {
            data_lines.push(value.strip_prefix(' ').unwrap_or(value));
        } else if let Some(value) = line.strip_prefix("event:") {
            event_type = Some(value.trim().to_string());
        }
    }

    if data_lines.is_empty() {
        return None;
    }

    // Join multiple data lines with newlines (per SSE spec)
    let data = data_lines.join("\n");

    if data.trim() == "[DONE]" {
        return Some(SSEEvent::Done);
    }

    Some(SSEEvent::Data { data, event_type })
}

/// A single Server-Sent Event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SSEEvent {
    /// Data event containing a JSON payload.
    Data {
        /// The event data
        data: String,
        /// Optional event type
        event_type: Option<String>,
    },
    /// End of stream marker (`[DONE]`)
    Done,
}

impl SSEEvent {
    /// Returns true if this is a Done event.
    pub fn is_done(&self) -> bool {
        matches!(self, SSEEvent::Done)
    }

    /// Returns the data if this is a Data event.
    pub fn data(&self) -> Option<&str> {
        match self {
            SSEEvent::Data { data, .. } => Some(data),
            SSEEvent::Done => None,
        }
    }
}

// ============================================================================
// Stream Accumulator
// ============================================================================

/// Per-request state while a completion stream is consumed
///
/// Token count rule: a `usage.completion_tokens` reported by the server wins;
/// otherwise every content-bearing chunk counts as one token.
#[derive(Debug, Default)]
pub struct StreamAccumulator {
    first_token: Option<Duration>,
    content_chunks: u64,
    usage: Option<Usage>,
    finish_reason: Option<String>,
    done: bool,
}

impl StreamAccumulator {
    /// Create an empty accumulator
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one event received `elapsed` after the request was sent
    ///
    /// # Errors
    ///
    /// Unparseable payloads are malformed; error objects are server errors.
    pub fn observe(&mut self, event: SSEEvent, elapsed: Duration) -> Result<(), VendorError> {
        let data = match event {
            SSEEvent::Done => {
                self.done = true;
                return Ok(());
            }
            SSEEvent::Data { data, .. } => data,
        };

        let chunk: ChatCompletionChunk = serde_json::from_str(&data)
            .map_err(|e| VendorError::Malformed(format!("invalid stream chunk: {e}")))?;

        if let Some(message) = chunk.error_message() {
            return Err(VendorError::Server(message));
        }

        for choice in &chunk.choices {
            if choice.content().is_some_and(|c| !c.is_empty()) {
                self.content_chunks += 1;
                self.first_token.get_or_insert(elapsed);
            }
            if let Some(reason) = &choice.finish_reason {
                self.finish_reason = Some(reason.clone());
            }
        }

        if let Some(usage) = chunk.usage {
            self.usage = Some(usage);
        }

        Ok(())
    }

    /// Whether the `[DONE]` marker has been seen
    pub fn is_done(&self) -> bool {
        self.done
    }

    /// Time to the first content-bearing chunk, if any arrived
    pub fn time_to_first_token(&self) -> Option<Duration> {
        self.first_token
    }

    /// Token count under the usage-wins rule
    pub fn token_count(&self) -> Option<u64> {
        self.usage
            .and_then(|u| u.completion_tokens)
            .or((self.content_chunks > 0).then_some(self.content_chunks))
    }

    /// Close the stream at `wall_time` and produce the request's metrics
    ///
    /// # Errors
    ///
    /// A stream that ended with neither `[DONE]` nor a finish reason was cut
    /// off. A stream that carried no content and no usage is malformed.
    pub fn into_metrics(self, wall_time: Duration) -> Result<CompletionMetrics, VendorError> {
        if !self.done && self.finish_reason.is_none() {
            return Err(VendorError::StreamInterrupted);
        }

        let total_tokens = self.token_count().ok_or_else(|| {
            VendorError::Malformed("stream carried no content and no usage".to_string())
        })?;

        Ok(CompletionMetrics::new(
            total_tokens,
            self.usage.and_then(|u| u.prompt_tokens),
            wall_time,
            self.first_token,
        ))
    }
}

// ============================================================================
// Tests
// ============================================================================
