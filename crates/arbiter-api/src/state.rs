//! # Application State
//!
//! Shared state injected into route handlers: the session controller
//! (which owns the configured engine) plus runtime configuration.

use std::sync::Arc;
use std::time::Duration;

use arbiter_engine::ArbiterEngine;
use arbiter_session::SessionController;

/// Runtime configuration read from the environment.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Listen port (`PORT`, default 8000).
    pub port: u16,
    /// Engine wind-down grace period (`ARBITER_GRACE_SECS`, default 5).
    pub grace: Duration,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let port = std::env::var("PORT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(8000);
        let grace_secs = std::env::var("ARBITER_GRACE_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(5);
        Self {
            port,
            grace: Duration::from_secs(grace_secs),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: 8000,
            grace: Duration::from_secs(5),
        }
    }
}

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub controller: SessionController,
    pub config: AppConfig,
}

impl AppState {
    pub fn new(engine: Arc<dyn ArbiterEngine>, config: AppConfig) -> Self {
        let controller = SessionController::with_grace(engine, config.grace);
        Self { controller, config }
    }
}
