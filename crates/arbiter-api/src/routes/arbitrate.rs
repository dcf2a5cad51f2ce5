//! # Arbitration Routes
//!
//! Dispute arbitration over two shapes:
//!
//! - `POST /arbitrate` — unary. Validates, runs the session to
//!   completion, and returns the collected decisions in one JSON body.
//! - `POST /arbitrate/stream` — streaming. Returns a `text/event-stream`
//!   body of framed decision events as the engine produces them; client
//!   disconnect cancels the session.

use std::convert::Infallible;

use axum::body::{Body, Bytes};
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::header;
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use futures::StreamExt;
use serde::Serialize;
use tokio_stream::wrappers::ReceiverStream;
use uuid::Uuid;

use arbiter_core::{validate, DecisionEvent, DisputeRequest};
use arbiter_stream::EventEncoder;

use crate::error::AppError;
use crate::state::AppState;

/// Unary arbitration response envelope.
#[derive(Debug, Serialize)]
pub struct ArbitrateResponse {
    pub status: &'static str,
    pub result: ArbitrationResult,
}

/// Collected outcome of one arbitration session.
#[derive(Debug, Serialize)]
pub struct ArbitrationResult {
    pub session_id: Uuid,
    pub decisions: Vec<DecisionEvent>,
    pub message: String,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/arbitrate", post(arbitrate))
        .route("/arbitrate/stream", post(arbitrate_stream))
}

/// Run a full session and return every decision in one body.
///
/// Body parsing and validation run before the session spawns so malformed
/// requests get a 422 instead of an event stream. An engine failure
/// mid-session maps to 502 with any already-emitted decisions in the
/// error details.
async fn arbitrate(
    State(state): State<AppState>,
    payload: Result<Json<DisputeRequest>, JsonRejection>,
) -> Result<Json<ArbitrateResponse>, AppError> {
    let Json(request) = payload?;
    let dispute = validate(&request)?;
    let handle = state.controller.spawn_dispute(dispute);
    let session_id = handle.id;

    let mut decisions = Vec::new();
    let mut message = None;
    for event in handle.run_to_completion().await {
        match event {
            event @ DecisionEvent::Arbitration { .. } => decisions.push(event),
            DecisionEvent::Complete { message: m } => message = Some(m),
            DecisionEvent::Error { message: m } => {
                return Err(AppError::Engine {
                    message: m,
                    partial: decisions,
                });
            }
        }
    }

    Ok(Json(ArbitrateResponse {
        status: "success",
        result: ArbitrationResult {
            session_id,
            decisions,
            message: message.unwrap_or_default(),
        },
    }))
}

/// Stream framed decision events as the engine produces them.
///
/// Validation failures surface in-band as the stream's terminal `error`
/// event so consumers always read a uniform event sequence, but a body
/// that fails to parse gets the structured 422 since no session exists
/// yet. Dropping the response body closes the event channel, which
/// cancels the session.
async fn arbitrate_stream(
    State(state): State<AppState>,
    payload: Result<Json<DisputeRequest>, JsonRejection>,
) -> Result<Response, AppError> {
    let Json(request) = payload?;
    let handle = state.controller.spawn(request);
    tracing::debug!(session = %handle.id, "streaming arbitration session");

    let encoder = EventEncoder::new();
    let frames = ReceiverStream::new(handle.events).map(move |event| {
        let framed = encoder.encode_bytes(&event).unwrap_or_else(|e| {
            tracing::error!(error = %e, "dropping unframeable event");
            Vec::new()
        });
        Ok::<_, Infallible>(Bytes::from(framed))
    });

    Ok((
        [
            (header::CONTENT_TYPE, "text/event-stream"),
            (header::CACHE_CONTROL, "no-cache"),
            (header::CONNECTION, "keep-alive"),
        ],
        Body::from_stream(frames),
    )
        .into_response())
}
