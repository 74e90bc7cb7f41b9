//! Decoder for `data: <json>` event streams returned by chat-completion
//! endpoints when `"stream": true` is requested.
//!
//! Only lines starting with the exact prefix `data: ` carry payloads. Every
//! other line (blank separators, `:` keep-alives, `event:` fields) is ignored.
//! The `[DONE]` sentinel and empty payloads are skipped. A payload that is not
//! valid JSON aborts decoding of the whole stream.

use serde_json::Value;

use crate::llm::LlmError;

const DATA_PREFIX: &str = "data: ";
const DONE_SENTINEL: &str = "[DONE]";
const DELTA_CONTENT: &str = "/choices/0/delta/content";

/// Decodes a single line of the stream.
///
/// Returns `Ok(None)` when the line carries no payload, and `Ok(Some(delta))`
/// for a data line. The delta is empty when the chunk has no string at
/// `choices[0].delta.content`; only text that is not JSON is an error.
pub fn parse_data_line(line: &str) -> Result<Option<String>, LlmError> {
    let Some(rest) = line.strip_prefix(DATA_PREFIX) else {
        return Ok(None);
    };
    let payload = rest.trim();
    if payload.is_empty() || payload == DONE_SENTINEL {
        return Ok(None);
    }
    let chunk: Value = serde_json::from_str(payload)?;
    let delta = chunk.pointer(DELTA_CONTENT).and_then(Value::as_str).unwrap_or_default();
    Ok(Some(delta.to_string()))
}

/// Concatenates every delta of a fully buffered stream body.
pub fn decode_event_stream(body: &str) -> Result<String, LlmError> {
    let mut content = String::new();
    for line in body.split('\n') {
        if let Some(delta) = parse_data_line(line)? {
            content.push_str(&delta);
        }
    }
    Ok(content)
}

/// Incremental decoder fed with raw body chunks as they arrive.
///
/// Lines split across chunks are buffered until their newline shows up; the
/// final unterminated line is decoded by [`StreamDecoder::finish`].
#[derive(Debug, Default)]
pub struct StreamDecoder {
    buffer: Vec<u8>,
}

impl StreamDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feeds bytes and returns the non-empty deltas of every completed line.
    pub fn push(&mut self, bytes: &[u8]) -> Result<Vec<String>, LlmError> {
        self.buffer.extend_from_slice(bytes);

        let mut deltas = Vec::new();
        while let Some(pos) = self.buffer.iter().position(|b| *b == b'\n') {
            let mut line: Vec<u8> = self.buffer.drain(..=pos).collect();
            line.pop();
            if let Some(delta) = decode_line(&line)? {
                deltas.push(delta);
            }
        }
        Ok(deltas)
    }

    pub fn finish(self) -> Result<Vec<String>, LlmError> {
        if self.buffer.is_empty() {
            return Ok(Vec::new());
        }
        Ok(decode_line(&self.buffer)?.into_iter().collect())
    }
}

fn decode_line(bytes: &[u8]) -> Result<Option<String>, LlmError> {
    let line = String::from_utf8_lossy(bytes);
    Ok(parse_data_line(&line)?.filter(|delta| !delta.is_empty()))
}
