//! # Engine Error Types
//!
//! Failures at the inference engine boundary. Every failure inside a
//! session is eventually converted to at most one terminal `error` event;
//! these variants carry the diagnostic context that message is built from.

use thiserror::Error;

/// Errors arising from inference engine operations.
#[derive(Error, Debug)]
pub enum EngineError {
    /// Engine client configuration was missing or invalid.
    #[error("engine configuration error: {0}")]
    Config(#[from] crate::config::ConfigError),

    /// Transport-level HTTP failure talking to the engine.
    #[error("engine request to {endpoint} failed: {source}")]
    Http {
        /// The endpoint being called.
        endpoint: String,
        /// The underlying reqwest error.
        #[source]
        source: reqwest::Error,
    },

    /// The engine answered with a non-success status.
    #[error("engine returned status {status}: {detail}")]
    Upstream {
        /// HTTP status code.
        status: u16,
        /// Response body excerpt or reason phrase.
        detail: String,
    },

    /// The engine did not produce output within the configured deadline.
    #[error("engine timed out after {seconds}s")]
    Timeout {
        /// The deadline that elapsed.
        seconds: u64,
    },

    /// The run was cancelled before the engine finished.
    #[error("engine run cancelled")]
    Cancelled,

    /// The fragment channel closed without an explicit done/failed signal.
    #[error("engine disconnected before signaling completion")]
    Disconnected,
}
