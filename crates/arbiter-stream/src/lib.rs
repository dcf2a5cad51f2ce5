//! # arbiter-stream — Event Framing and Reassembly
//!
//! The wire protocol for streamed decision events:
//!
//! - **Encoding** ([`encode`]): each [`DecisionEvent`] becomes one
//!   self-contained text record, `data: ` + JSON + a blank-line terminator,
//!   matching conventional text-event-stream framing.
//!
//! - **Decoding** ([`decode`]): the symmetric reassembly of events from raw
//!   bytes arriving in arbitrary, unaligned chunks. Decoded output is
//!   identical regardless of how the byte stream is fragmented.
//!
//! [`DecisionEvent`]: arbiter_core::DecisionEvent

pub mod decode;
pub mod encode;
pub mod error;

pub use decode::StreamDecoder;
pub use encode::EventEncoder;
pub use error::FramingError;

/// Marker prefixing every data line of a record.
pub const RECORD_PREFIX: &str = "data: ";

/// Blank-line terminator separating records on the wire.
pub const RECORD_DELIMITER: &str = "\n\n";
