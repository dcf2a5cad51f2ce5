//! # Arbiter Session
//!
//! Turns raw engine output into an ordered decision event stream and runs
//! each arbitration request as an isolated session.
//!
//! Two layers:
//!
//! - [`ArbitrationPipeline`] — incremental parser over the engine's
//!   fragment stream. Extracts complete JSON decision objects as they
//!   arrive and guarantees exactly one terminal event.
//! - [`SessionController`] — validates the request, drives a pipeline on
//!   its own task, forwards events to the consumer, and handles
//!   cancellation and consumer disconnect with a bounded grace period.

pub mod pipeline;
pub mod session;

pub use pipeline::ArbitrationPipeline;
pub use session::{SessionController, SessionHandle, DEFAULT_GRACE};
