//! # Stream Decoder
//!
//! Reassembles [`DecisionEvent`]s from raw bytes arriving in arbitrary,
//! unaligned chunks. A chunk may contain zero, one, or many complete
//! records, or split a single record anywhere — the decoder's output is
//! identical for every fragmentation of the same byte stream.
//!
//! The algorithm is an owned growable buffer plus an index scan: each chunk
//! is appended, then every complete record is drained from the front;
//! trailing partial data waits for the next chunk.

use arbiter_core::DecisionEvent;

use crate::error::FramingError;

/// Chunk-tolerant decoder for the record stream.
///
/// Malformed records are yielded as error values; the decoder itself keeps
/// going, so the caller decides whether to continue or abort.
#[derive(Debug, Default)]
pub struct StreamDecoder {
    buffer: Vec<u8>,
}

impl StreamDecoder {
    /// Create a decoder with an empty reassembly buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one transport chunk, draining every complete record.
    ///
    /// Returns one entry per complete record in arrival order. Records that
    /// fail to parse as a known event shape become [`FramingError`] values.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<Result<DecisionEvent, FramingError>> {
        self.buffer.extend_from_slice(chunk);
        let mut decoded = Vec::new();

        while let Some((end, delimiter_len)) = find_record_boundary(&self.buffer) {
            let record: Vec<u8> = self.buffer.drain(..end + delimiter_len).collect();
            if let Some(result) = decode_record(&record[..end]) {
                decoded.push(result);
            }
        }

        decoded
    }

    /// Number of bytes held back awaiting a record boundary.
    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }

    /// Signal end of stream. Reports a trailing incomplete record.
    pub fn finish(self) -> Result<(), FramingError> {
        if self.buffer.iter().all(|b| b.is_ascii_whitespace()) {
            Ok(())
        } else {
            Err(FramingError::TruncatedRecord {
                buffered: self.buffer.len(),
            })
        }
    }
}

/// Locate the earliest record terminator: a blank line, with or without
/// carriage returns. Returns (record end, terminator length).
fn find_record_boundary(buffer: &[u8]) -> Option<(usize, usize)> {
    for i in 0..buffer.len() {
        if buffer[i..].starts_with(b"\r\n\r\n") {
            return Some((i, 4));
        }
        if buffer[i..].starts_with(b"\n\n") {
            return Some((i, 2));
        }
    }
    None
}

/// Decode one complete record.
///
/// Returns `None` for records carrying no data lines (keep-alives and
/// comment-only records), which are legal framing noise rather than events.
fn decode_record(record: &[u8]) -> Option<Result<DecisionEvent, FramingError>> {
    let text = match std::str::from_utf8(record) {
        Ok(text) => text,
        Err(e) => {
            return Some(Err(FramingError::MalformedRecord {
                detail: format!("invalid UTF-8 in record: {e}"),
            }))
        }
    };

    let mut payload_lines: Vec<&str> = Vec::new();
    for line in text.split('\n') {
        let line = line.strip_suffix('\r').unwrap_or(line);
        if line.is_empty() || line.starts_with(':') {
            continue;
        }
        if let Some(rest) = line.strip_prefix("data:") {
            payload_lines.push(rest.strip_prefix(' ').unwrap_or(rest));
        }
        // Other field lines (event:, id:, retry:) carry no payload here.
    }

    if payload_lines.is_empty() {
        return None;
    }

    let payload = payload_lines.join("\n");
    Some(
        serde_json::from_str::<DecisionEvent>(&payload).map_err(|e| {
            FramingError::MalformedRecord {
                detail: format!("record is not a known event shape: {e}"),
            }
        }),
    )
}
