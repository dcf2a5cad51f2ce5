//! # Session Controller
//!
//! One tokio task per arbitration request. The controller validates the
//! raw request, drives an [`ArbitrationPipeline`] over the configured
//! engine, and forwards events to the consumer through a bounded channel.
//!
//! Lifecycle: `Created → Validating → Running → Terminal`. Exactly one
//! terminal event crosses the channel. If the consumer disappears or the
//! session is cancelled, the engine is signalled through its cancellation
//! token and given a bounded grace period to wind down; events produced
//! during wind-down are discarded.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use arbiter_core::{validate, DecisionEvent, Dispute, DisputeRequest};
use arbiter_engine::{ArbiterEngine, EvaluationContext};

use crate::pipeline::ArbitrationPipeline;

/// Time the engine gets to observe cancellation before the session is
/// abandoned locally.
pub const DEFAULT_GRACE: Duration = Duration::from_secs(5);

const EVENT_CHANNEL_CAPACITY: usize = 32;

/// Spawns and supervises arbitration sessions.
#[derive(Clone)]
pub struct SessionController {
    engine: Arc<dyn ArbiterEngine>,
    grace: Duration,
}

/// Consumer end of a running session.
pub struct SessionHandle {
    pub id: Uuid,
    pub events: mpsc::Receiver<DecisionEvent>,
    pub cancel: CancellationToken,
    log: Arc<Mutex<Vec<DecisionEvent>>>,
}

impl SessionHandle {
    /// Receive the next forwarded event. `None` once the session task has
    /// finished and the channel has drained.
    pub async fn next_event(&mut self) -> Option<DecisionEvent> {
        self.events.recv().await
    }

    /// Drain the session to completion, collecting every forwarded event.
    pub async fn run_to_completion(mut self) -> Vec<DecisionEvent> {
        let mut events = Vec::new();
        while let Some(event) = self.events.recv().await {
            events.push(event);
        }
        events
    }

    /// Snapshot of every event this session has forwarded so far.
    pub fn recorded_events(&self) -> Vec<DecisionEvent> {
        self.log
            .lock()
            .map(|entries| entries.clone())
            .unwrap_or_default()
    }
}

impl SessionController {
    pub fn new(engine: Arc<dyn ArbiterEngine>) -> Self {
        Self {
            engine,
            grace: DEFAULT_GRACE,
        }
    }

    pub fn with_grace(engine: Arc<dyn ArbiterEngine>, grace: Duration) -> Self {
        Self { engine, grace }
    }

    /// Validate `request` and run it as a new session.
    ///
    /// Validation happens on the session task; a failure surfaces as the
    /// session's single terminal `error` event rather than as a return
    /// value, so streaming consumers see a uniform event sequence.
    pub fn spawn(&self, request: DisputeRequest) -> SessionHandle {
        let id = Uuid::new_v4();
        let cancel = CancellationToken::new();
        let (tx, rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
        let log = Arc::new(Mutex::new(Vec::new()));

        let engine = Arc::clone(&self.engine);
        let grace = self.grace;
        let task_cancel = cancel.clone();
        let task_log = Arc::clone(&log);
        tokio::spawn(async move {
            tracing::debug!(session = %id, "validating arbitration request");
            match validate(&request) {
                Ok(dispute) => {
                    run_session(id, engine, dispute, task_cancel, grace, tx, task_log).await;
                }
                Err(e) => {
                    tracing::debug!(session = %id, error = %e, "request rejected");
                    let event = DecisionEvent::Error {
                        message: format!("validation failed: {e}"),
                    };
                    record(&task_log, &event);
                    let _ = tx.send(event).await;
                }
            }
        });

        SessionHandle {
            id,
            events: rx,
            cancel,
            log,
        }
    }

    /// Run an already-validated dispute as a new session.
    pub fn spawn_dispute(&self, dispute: Dispute) -> SessionHandle {
        let id = Uuid::new_v4();
        let cancel = CancellationToken::new();
        let (tx, rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
        let log = Arc::new(Mutex::new(Vec::new()));

        let engine = Arc::clone(&self.engine);
        let grace = self.grace;
        let task_cancel = cancel.clone();
        let task_log = Arc::clone(&log);
        tokio::spawn(async move {
            run_session(id, engine, dispute, task_cancel, grace, tx, task_log).await;
        });

        SessionHandle {
            id,
            events: rx,
            cancel,
            log,
        }
    }
}

async fn run_session(
    id: Uuid,
    engine: Arc<dyn ArbiterEngine>,
    dispute: Dispute,
    cancel: CancellationToken,
    grace: Duration,
    tx: mpsc::Sender<DecisionEvent>,
    log: Arc<Mutex<Vec<DecisionEvent>>>,
) {
    tracing::debug!(
        session = %id,
        policy = %dispute.policy.id,
        evidence = dispute.evidence_count(),
        "session running"
    );
    let context = EvaluationContext::from_dispute(&dispute);
    let mut pipeline = ArbitrationPipeline::new(engine.start(context, cancel.clone()));

    loop {
        let event = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                tracing::debug!(session = %id, "session cancelled");
                wind_down(pipeline, grace, id).await;
                return;
            }
            _ = tx.closed() => {
                tracing::debug!(session = %id, "consumer disconnected, cancelling engine");
                cancel.cancel();
                wind_down(pipeline, grace, id).await;
                return;
            }
            event = pipeline.next_event() => event,
        };

        let Some(event) = event else {
            return;
        };
        record(&log, &event);
        let terminal = event.is_terminal();
        if tx.send(event).await.is_err() {
            tracing::debug!(session = %id, "consumer disconnected, cancelling engine");
            cancel.cancel();
            wind_down(pipeline, grace, id).await;
            return;
        }
        if terminal {
            tracing::debug!(session = %id, "session terminal");
            return;
        }
    }
}

/// Drain the pipeline until the engine winds down, discarding events, for
/// at most `grace`.
async fn wind_down(mut pipeline: ArbitrationPipeline, grace: Duration, id: Uuid) {
    let drain = async {
        while pipeline.next_event().await.is_some() {}
    };
    if tokio::time::timeout(grace, drain).await.is_err() {
        tracing::warn!(session = %id, "engine did not wind down within grace period");
    }
}

fn record(log: &Arc<Mutex<Vec<DecisionEvent>>>, event: &DecisionEvent) {
    if let Ok(mut entries) = log.lock() {
        entries.push(event.clone());
    }
}

// ── Tests ──────────────────────────────────────────────────────────────
