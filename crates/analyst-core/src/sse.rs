//! Incremental decoder for streamed chat-completion responses.
//!
//! The upstream streams Server-Sent Events where every `data:` line carries a
//! JSON chunk of shape `{"choices":[{"delta":{"content":"..."}}]}` and the
//! stream ends with `data: [DONE]`. Network reads do not line up with event
//! boundaries, so [`SseDecoder`] keeps raw bytes until a full line is
//! available and only then decodes it.
//!
//! A complete `data:` line whose JSON does not parse is treated as an
//! unfinished frame: it is put back at the front of the buffer and decoding
//! resumes when more bytes arrive. [`SseDecoder::finish`] makes one last
//! best-effort pass over whatever is still buffered once the input ends.

use serde_json::Value;
use tracing::debug;

/// Line prefix marking an event payload.
pub const DATA_PREFIX: &str = "data: ";

/// Payload that terminates a completion stream.
pub const DONE_MARKER: &str = "[DONE]";

/// Where the decoder is between reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecoderState {
    /// Buffer is empty; the next byte starts a new line.
    AwaitingLine,
    /// Buffer holds bytes that do not yet form a decodable line.
    HavePartialLine,
    /// Terminator seen or input finished; further input is ignored.
    Done,
}

/// Byte-level SSE decoder yielding content deltas.
#[derive(Debug)]
pub struct SseDecoder {
    buffer: Vec<u8>,
    state: DecoderState,
}

impl Default for SseDecoder {
    fn default() -> Self {
        Self::new()
    }
}

enum Line<'a> {
    Skip,
    Data(&'a str),
    Done,
}

enum Step {
    Continue,
    Stall,
    Done,
}

impl SseDecoder {
    /// Create a decoder with an empty buffer.
    pub fn new() -> Self {
        Self {
            buffer: Vec::new(),
            state: DecoderState::AwaitingLine,
        }
    }

    /// Current state.
    pub fn state(&self) -> DecoderState {
        self.state
    }

    /// Whether the terminator has been seen or input was finished.
    pub fn is_done(&self) -> bool {
        self.state == DecoderState::Done
    }

    /// Number of bytes waiting for a line terminator or more data.
    pub fn buffered_len(&self) -> usize {
        self.buffer.len()
    }

    /// Feed one network chunk, returning the deltas it completed in order.
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<String> {
        let mut deltas = Vec::new();
        if self.state == DecoderState::Done {
            return deltas;
        }

        self.buffer.extend_from_slice(chunk);

        while let Some(pos) = self.buffer.iter().position(|b| *b == b'\n') {
            let rest = self.buffer.split_off(pos + 1);
            let mut raw = std::mem::replace(&mut self.buffer, rest);
            raw.pop();
            if raw.last() == Some(&b'\r') {
                raw.pop();
            }
            let line = String::from_utf8_lossy(&raw).into_owned();

            let step = match classify(&line) {
                Line::Skip => Step::Continue,
                Line::Done => Step::Done,
                Line::Data(payload) => match parse_delta(payload) {
                    Ok(Some(delta)) => {
                        deltas.push(delta);
                        Step::Continue
                    }
                    Ok(None) => Step::Continue,
                    Err(e) => {
                        debug!("Incomplete SSE payload, waiting for more data: {}", e);
                        Step::Stall
                    }
                },
            };

            match step {
                Step::Continue => {}
                Step::Done => {
                    self.buffer.clear();
                    self.state = DecoderState::Done;
                    return deltas;
                }
                Step::Stall => {
                    let mut restored = line.into_bytes();
                    restored.push(b'\n');
                    restored.extend_from_slice(&self.buffer);
                    self.buffer = restored;
                    break;
                }
            }
        }

        self.state = if self.buffer.is_empty() {
            DecoderState::AwaitingLine
        } else {
            DecoderState::HavePartialLine
        };

        deltas
    }

    /// Flush after the input ended.
    ///
    /// Every buffered line gets one parse attempt; lines that still fail are
    /// discarded. The decoder is `Done` afterwards.
    pub fn finish(&mut self) -> Vec<String> {
        let mut deltas = Vec::new();

        if self.state != DecoderState::Done && !self.buffer.is_empty() {
            let remaining = std::mem::take(&mut self.buffer);
            let text = String::from_utf8_lossy(&remaining);

            for raw in text.split('\n') {
                let line = raw.strip_suffix('\r').unwrap_or(raw);
                if let Line::Data(payload) = classify(line) {
                    match parse_delta(payload) {
                        Ok(Some(delta)) => deltas.push(delta),
                        Ok(None) => {}
                        Err(e) => debug!("Discarding unparseable trailing SSE line: {}", e),
                    }
                }
            }
        }

        self.buffer.clear();
        self.state = DecoderState::Done;
        deltas
    }
}

fn classify(line: &str) -> Line<'_> {
    if line.starts_with(':') || line.trim().is_empty() {
        return Line::Skip;
    }

    let Some(rest) = line.strip_prefix(DATA_PREFIX) else {
        return Line::Skip;
    };

    let payload = rest.trim();
    if payload == DONE_MARKER {
        Line::Done
    } else {
        Line::Data(payload)
    }
}

/// Pull `choices[0].delta.content` out of a chunk payload.
///
/// Valid JSON without that path (role-only deltas, usage chunks) yields
/// `Ok(None)`; only malformed JSON is an error.
pub fn parse_delta(payload: &str) -> Result<Option<String>, serde_json::Error> {
    let value: Value = serde_json::from_str(payload)?;
    let content = value
        .get("choices")
        .and_then(|choices| choices.get(0))
        .and_then(|choice| choice.get("delta"))
        .and_then(|delta| delta.get("content"))
        .and_then(|content| content.as_str())
        .filter(|content| !content.is_empty())
        .map(str::to_string);

    Ok(content)
}

/// Frame a content delta the way the upstream does.
pub fn delta_event(content: &str) -> String {
    let chunk = serde_json::json!({
        "choices": [{ "delta": { "content": content } }]
    });
    format!("{}{}\n\n", DATA_PREFIX, chunk)
}

/// The terminating event line.
pub fn done_event() -> String {
    format!("{}{}\n\n", DATA_PREFIX, DONE_MARKER)
}

#[cfg(test)]
mod tests {
    use super::*;

    const HELLO: &str = "data: {\"choices\":[{\"delta\":{\"content\":\"Hello\"}}]}\n";

    #[test]
    fn test_single_complete_line() {
        let mut decoder = SseDecoder::new();
        assert_eq!(decoder.feed(HELLO.as_bytes()), vec!["Hello"]);
        assert_eq!(decoder.state(), DecoderState::AwaitingLine);
    }

    #[test]
    fn test_line_split_across_reads_emits_once() {
        let mut decoder = SseDecoder::new();
        let (first, second) = HELLO.split_at(18);

        assert!(decoder.feed(first.as_bytes()).is_empty());
        assert_eq!(decoder.state(), DecoderState::HavePartialLine);

        assert_eq!(decoder.feed(second.as_bytes()), vec!["Hello"]);
        assert_eq!(decoder.state(), DecoderState::AwaitingLine);
        assert!(decoder.finish().is_empty());
    }

    #[test]
    fn test_split_at_every_offset_yields_one_delta() {
        for cut in 1..HELLO.len() {
            let mut decoder = SseDecoder::new();
            let (a, b) = HELLO.as_bytes().split_at(cut);
            let mut deltas = decoder.feed(a);
            deltas.extend(decoder.feed(b));
            deltas.extend(decoder.finish());
            assert_eq!(deltas, vec!["Hello"], "cut at {}", cut);
        }
    }

    #[test]
    fn test_multibyte_char_split_across_reads() {
        let event = delta_event("café");
        let bytes = event.as_bytes();
        let cut = event.find('é').unwrap() + 1;

        let mut decoder = SseDecoder::new();
        let mut deltas = decoder.feed(&bytes[..cut]);
        deltas.extend(decoder.feed(&bytes[cut..]));
        assert_eq!(deltas, vec!["café"]);
    }

    #[test]
    fn test_multiple_events_in_one_read() {
        let mut decoder = SseDecoder::new();
        let input = format!("{}{}{}", delta_event("a"), delta_event("b"), delta_event("c"));
        assert_eq!(decoder.feed(input.as_bytes()), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_crlf_comments_and_other_fields_skipped() {
        let mut decoder = SseDecoder::new();
        let input = ": keep-alive\r\nevent: message\r\nid: 7\r\n\r\ndata: {\"choices\":[{\"delta\":{\"content\":\"x\"}}]}\r\n";
        assert_eq!(decoder.feed(input.as_bytes()), vec!["x"]);
    }

    #[test]
    fn test_role_only_delta_produces_nothing() {
        let mut decoder = SseDecoder::new();
        let input = "data: {\"choices\":[{\"delta\":{\"role\":\"assistant\"}}]}\n";
        assert!(decoder.feed(input.as_bytes()).is_empty());
        assert_eq!(decoder.state(), DecoderState::AwaitingLine);
    }

    #[test]
    fn test_done_marker_terminates() {
        let mut decoder = SseDecoder::new();
        let input = format!("{}{}{}", delta_event("a"), done_event(), delta_event("late"));
        assert_eq!(decoder.feed(input.as_bytes()), vec!["a"]);
        assert!(decoder.is_done());
        assert!(decoder.feed(delta_event("later").as_bytes()).is_empty());
        assert!(decoder.finish().is_empty());
    }

    #[test]
    fn test_unparseable_line_is_kept_not_dropped() {
        let mut decoder = SseDecoder::new();
        let input = format!("data: {{\"choices\":[{{\n{}", delta_event("after"));

        assert!(decoder.feed(input.as_bytes()).is_empty());
        assert_eq!(decoder.state(), DecoderState::HavePartialLine);
        assert!(decoder.buffered_len() > 0);

        // End of input: the broken line is discarded, the good one recovered.
        assert_eq!(decoder.finish(), vec!["after"]);
        assert!(decoder.is_done());
    }

    #[test]
    fn test_finish_parses_unterminated_last_line() {
        let mut decoder = SseDecoder::new();
        let input = "data: {\"choices\":[{\"delta\":{\"content\":\"tail\"}}]}";
        assert!(decoder.feed(input.as_bytes()).is_empty());
        assert_eq!(decoder.finish(), vec!["tail"]);
    }

    #[test]
    fn test_finish_discards_garbage() {
        let mut decoder = SseDecoder::new();
        decoder.feed(b"data: {\"choices\"");
        assert!(decoder.finish().is_empty());
    }

    #[test]
    fn test_parse_delta_variants() {
        assert_eq!(
            parse_delta(r#"{"choices":[{"delta":{"content":"hi"}}]}"#).unwrap(),
            Some("hi".to_string())
        );
        assert_eq!(parse_delta(r#"{"choices":[]}"#).unwrap(), None);
        assert_eq!(parse_delta("42").unwrap(), None);
        assert!(parse_delta("{").is_err());
    }
}
