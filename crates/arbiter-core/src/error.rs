//! # Validation Error Types
//!
//! Structured errors for dispute validation. Every variant names the
//! offending field so callers can surface actionable messages without
//! inspecting logs.

use thiserror::Error;

/// Errors arising from dispute validation.
///
/// Validation is the first stage of every arbitration run; these errors are
/// surfaced to the consumer as a terminal `error` event before the pipeline
/// is ever invoked.
#[derive(Error, Debug)]
pub enum ValidationError {
    /// A field that must carry content was empty or whitespace.
    #[error("{field} must not be empty")]
    EmptyField {
        /// Dotted path of the offending field (e.g., "policy.name").
        field: String,
    },

    /// An identifier field did not parse as a UUID.
    #[error("invalid identifier for {field}: \"{value}\"")]
    InvalidIdentifier {
        /// Dotted path of the offending field.
        field: String,
        /// The rejected raw value.
        value: String,
    },

    /// A timestamp field did not parse as RFC 3339.
    #[error("unparseable timestamp for {field}: \"{value}\"")]
    InvalidTimestamp {
        /// Dotted path of the offending field.
        field: String,
        /// The rejected raw value.
        value: String,
    },

    /// An evidence item references a policy other than the disputed one.
    #[error(
        "evidence {evidence_id} references policy {referenced}, but the dispute is over policy {expected}"
    )]
    PolicyMismatch {
        /// The evidence item identifier.
        evidence_id: String,
        /// The policy id the evidence claims to belong to.
        referenced: String,
        /// The policy id of the dispute.
        expected: String,
    },
}
