//! # Framing Error Types
//!
//! Decode-side errors are reported per record: a malformed record surfaces
//! as an error value without aborting the remaining stream, leaving the
//! continue-or-abort decision to the caller.

use thiserror::Error;

/// Errors arising from record framing and reassembly.
#[derive(Error, Debug)]
pub enum FramingError {
    /// An event failed to serialize into a record payload.
    #[error("failed to serialize event: {0}")]
    Serialize(#[from] serde_json::Error),

    /// A serialized payload would embed the record delimiter, corrupting
    /// framing for every downstream consumer.
    #[error("record payload embeds the frame delimiter")]
    EmbeddedDelimiter,

    /// A complete record arrived but did not parse as a known event shape.
    #[error("malformed record: {detail}")]
    MalformedRecord {
        /// What went wrong (JSON error, missing data line, bad UTF-8).
        detail: String,
    },

    /// The stream ended mid-record.
    #[error("stream ended with an incomplete record ({buffered} bytes buffered)")]
    TruncatedRecord {
        /// Number of undelivered bytes left in the reassembly buffer.
        buffered: usize,
    },
}
