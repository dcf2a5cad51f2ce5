//! # Event Encoder
//!
//! Serializes a [`DecisionEvent`] into one wire record:
//! `data: ` + compact JSON + blank-line terminator. Encoding is pure and
//! order-preserving.
//!
//! JSON string escaping already guarantees that no raw newline survives
//! inside a serialized payload, so a record can never contain an unescaped
//! delimiter. The encoder still verifies this before emitting — a payload
//! that would corrupt framing is rejected, never sent.

use arbiter_core::DecisionEvent;

use crate::error::FramingError;
use crate::{RECORD_DELIMITER, RECORD_PREFIX};

/// Frames decision events as wire records.
#[derive(Debug, Clone, Copy, Default)]
pub struct EventEncoder;

impl EventEncoder {
    /// Create an encoder.
    pub fn new() -> Self {
        Self
    }

    /// Encode one event as a complete record, terminator included.
    pub fn encode(&self, event: &DecisionEvent) -> Result<String, FramingError> {
        let payload = serde_json::to_string(event)?;
        if payload.contains('\n') || payload.contains('\r') {
            return Err(FramingError::EmbeddedDelimiter);
        }
        Ok(format!("{RECORD_PREFIX}{payload}{RECORD_DELIMITER}"))
    }

    /// Encode one event as record bytes.
    pub fn encode_bytes(&self, event: &DecisionEvent) -> Result<Vec<u8>, FramingError> {
        self.encode(event).map(String::into_bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arbiter_core::DecisionType;

    #[test]
    fn record_has_prefix_and_terminator() {
        let record = EventEncoder::new()
            .encode(&DecisionEvent::Complete {
                message: "arbitration complete".to_string(),
            })
            .unwrap();
        assert!(record.starts_with("data: "));
        assert!(record.ends_with("\n\n"));
    }

    #[test]
    fn payload_is_single_line_json() {
        let record = EventEncoder::new()
            .encode(&DecisionEvent::Arbitration {
                decision_type: DecisionType::ApproveDefender,
                decision: "Defender's argument is stronger.".to_string(),
                confidence: 0.82,
                reasoning: None,
            })
            .unwrap();
        let payload = record
            .strip_prefix("data: ")
            .unwrap()
            .strip_suffix("\n\n")
            .unwrap();
        assert!(!payload.contains('\n'));
        let value: serde_json::Value = serde_json::from_str(payload).unwrap();
        assert_eq!(value["type"], "arbitration");
        assert_eq!(value["decision_type"], "approve_defender");
    }

    #[test]
    fn newlines_in_reasoning_are_escaped_not_raw() {
        let record = EventEncoder::new()
            .encode(&DecisionEvent::Arbitration {
                decision_type: DecisionType::SplitDecision,
                decision: "both sides prevail in part".to_string(),
                confidence: 0.5,
                reasoning: Some("line one\nline two\r\nline three".to_string()),
            })
            .unwrap();
        // Exactly the two terminator newlines; reasoning newlines are escaped.
        assert_eq!(record.matches('\n').count(), 2);
        assert!(record.contains("\\n"));
    }

    #[test]
    fn error_event_encodes_message() {
        let record = EventEncoder::new()
            .encode(&DecisionEvent::Error {
                message: "engine timed out".to_string(),
            })
            .unwrap();
        assert!(record.contains("\"type\":\"error\""));
        assert!(record.contains("engine timed out"));
    }
}
