//! # arbiter-engine — Inference Engine Boundary
//!
//! Everything that faces the evidence-weighing inference engine:
//!
//! - **Context** ([`context`]): assembles the evaluation context presented
//!   to the engine, preserving evidence order exactly as submitted.
//!
//! - **Contract** ([`engine`]): the [`ArbiterEngine`] trait — a cooperative
//!   producer yielding opaque fragments over a channel, with an explicit
//!   done/failed terminal signal and token-based cancellation.
//!
//! - **Clients** ([`http`], [`scripted`]): a reqwest-backed client for an
//!   OpenAI-style streaming completion endpoint, and a deterministic
//!   scripted engine for tests and unconfigured deployments.

pub mod config;
pub mod context;
pub mod engine;
pub mod error;
pub mod http;
pub mod scripted;

pub use config::{ConfigError, EngineConfig};
pub use context::EvaluationContext;
pub use engine::{ArbiterEngine, EngineSignal};
pub use error::EngineError;
pub use http::HttpEngine;
pub use scripted::{ScriptedEngine, StalledEngine};
