//! # arbiter-core — Dispute Model and Validation
//!
//! Foundation types for the Arbiter Stack:
//!
//! - **Model** ([`model`]): Policy, Evidence, Dispute, and the streamed
//!   [`DecisionEvent`] variants with their `type`-tagged wire shape.
//!
//! - **Validation** ([`validate`]): the dispute validator that turns raw,
//!   string-typed request payloads into a well-formed [`Dispute`], rejecting
//!   inconsistent input before any pipeline work begins.
//!
//! This crate is pure: no network calls, no async, no side effects.

pub mod error;
pub mod model;
pub mod validate;

// Re-export primary types.
pub use error::ValidationError;
pub use model::{DecisionEvent, DecisionType, Dispute, Evidence, Policy};
pub use validate::{validate, DisputeRequest, EvidenceRequest, PolicyRequest};
