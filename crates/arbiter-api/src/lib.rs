//! # arbiter-api — Axum HTTP Surface
//!
//! HTTP layer over the arbitration session controller.
//!
//! | Route                   | Module                 | Shape                |
//! |-------------------------|------------------------|----------------------|
//! | `GET /`, `GET /health`  | [`routes::health`]     | Liveness probe       |
//! | `POST /arbitrate`       | [`routes::arbitrate`]  | Unary JSON           |
//! | `POST /arbitrate/stream`| [`routes::arbitrate`]  | `text/event-stream`  |

pub mod error;
pub mod routes;
pub mod state;

use axum::Router;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Assemble the application router.
pub fn app(state: AppState) -> Router {
    Router::new()
        .merge(routes::health::router())
        .merge(routes::arbitrate::router())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
