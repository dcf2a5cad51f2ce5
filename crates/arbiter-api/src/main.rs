//! Arbitration service entry point.
//!
//! Reads engine configuration from the environment; when no upstream is
//! configured the service falls back to a scripted placeholder engine so
//! the HTTP surface stays exercisable without an inference backend.

use std::net::SocketAddr;
use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use arbiter_api::state::{AppConfig, AppState};
use arbiter_engine::{ArbiterEngine, EngineConfig, HttpEngine, ScriptedEngine};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = AppConfig::from_env();
    let engine = build_engine();
    let app = arbiter_api::app(AppState::new(engine, config.clone()));

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("arbiter-api listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("failed to bind listener");
    axum::serve(listener, app.into_make_service())
        .await
        .expect("server error");
}

fn build_engine() -> Arc<dyn ArbiterEngine> {
    match EngineConfig::from_env() {
        Ok(engine_config) => match HttpEngine::new(engine_config) {
            Ok(engine) => Arc::new(engine),
            Err(e) => {
                tracing::warn!(error = %e, "engine client init failed, using placeholder engine");
                Arc::new(ScriptedEngine::placeholder())
            }
        },
        Err(e) => {
            tracing::warn!(error = %e, "no inference engine configured, using placeholder engine");
            Arc::new(ScriptedEngine::placeholder())
        }
    }
}
