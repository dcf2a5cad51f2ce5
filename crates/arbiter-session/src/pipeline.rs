//! # Arbitration Pipeline
//!
//! Incremental parser over an engine's fragment stream.
//!
//! Fragments are concatenated into a buffer; every complete top-level JSON
//! object is extracted (brace scan, string- and escape-aware) and parsed as
//! a candidate decision. Interstitial prose and unparseable objects are
//! skipped. The pipeline guarantees exactly one terminal event
//! (`complete` or `error`), after which [`next_event`] returns `None`.
//!
//! [`next_event`]: ArbitrationPipeline::next_event

use std::collections::VecDeque;

use serde::Deserialize;
use tokio::sync::mpsc;

use arbiter_core::{DecisionEvent, DecisionType};
use arbiter_engine::EngineSignal;

/// Decision text synthesized when the engine completes without producing
/// a single usable decision object.
const NO_DECISION_TEXT: &str =
    "The inference engine produced no usable decision output for this dispute.";

const COMPLETE_MESSAGE: &str = "arbitration complete";

const DISCONNECT_MESSAGE: &str = "engine disconnected before signaling completion";

/// Candidate decision object as emitted by the engine.
#[derive(Debug, Deserialize)]
struct RawDecision {
    decision_type: DecisionType,
    decision: String,
    #[serde(default)]
    confidence: f64,
    #[serde(default)]
    reasoning: Option<String>,
}

impl RawDecision {
    fn into_event(self) -> DecisionEvent {
        DecisionEvent::Arbitration {
            decision_type: self.decision_type,
            decision: self.decision,
            confidence: clamp_confidence(self.confidence),
            reasoning: self.reasoning,
        }
    }
}

fn clamp_confidence(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

/// Pull-based decision event source backed by an engine signal channel.
pub struct ArbitrationPipeline {
    signals: mpsc::Receiver<EngineSignal>,
    buffer: String,
    pending: VecDeque<DecisionEvent>,
    decisions: usize,
    terminal_queued: bool,
    finished: bool,
}

impl ArbitrationPipeline {
    pub fn new(signals: mpsc::Receiver<EngineSignal>) -> Self {
        Self {
            signals,
            buffer: String::new(),
            pending: VecDeque::new(),
            decisions: 0,
            terminal_queued: false,
            finished: false,
        }
    }

    /// Next decision event, in arrival order. Returns `None` once the
    /// terminal event has been yielded.
    pub async fn next_event(&mut self) -> Option<DecisionEvent> {
        loop {
            if self.finished {
                return None;
            }
            if let Some(event) = self.pending.pop_front() {
                if event.is_terminal() {
                    self.finished = true;
                }
                return Some(event);
            }
            debug_assert!(!self.terminal_queued);

            match self.signals.recv().await {
                Some(EngineSignal::Fragment(text)) => {
                    self.buffer.push_str(&text);
                    self.extract_decisions();
                }
                Some(EngineSignal::Done) => self.finish_ok(),
                Some(EngineSignal::Failed(message)) => self.finish_err(message),
                None => self.finish_err(DISCONNECT_MESSAGE.to_string()),
            }
        }
    }

    fn extract_decisions(&mut self) {
        while let Some((start, end)) = find_object(&self.buffer) {
            match serde_json::from_str::<RawDecision>(&self.buffer[start..=end]) {
                Ok(raw) => {
                    self.pending.push_back(raw.into_event());
                    self.decisions += 1;
                }
                Err(e) => {
                    tracing::debug!(error = %e, "skipping unparseable candidate object");
                }
            }
            self.buffer.drain(..=end);
        }
        // Drop prose ahead of the next opening brace so the buffer only
        // ever holds a partial object.
        match self.buffer.find('{') {
            Some(0) => {}
            Some(start) => {
                self.buffer.drain(..start);
            }
            None => self.buffer.clear(),
        }
    }

    fn finish_ok(&mut self) {
        if self.decisions == 0 {
            self.pending.push_back(DecisionEvent::Arbitration {
                decision_type: DecisionType::InsufficientEvidence,
                decision: NO_DECISION_TEXT.to_string(),
                confidence: 0.0,
                reasoning: None,
            });
        }
        self.pending.push_back(DecisionEvent::Complete {
            message: COMPLETE_MESSAGE.to_string(),
        });
        self.terminal_queued = true;
        self.signals.close();
    }

    fn finish_err(&mut self, message: String) {
        self.pending.push_back(DecisionEvent::Error { message });
        self.terminal_queued = true;
        self.signals.close();
    }
}

/// Locate the first complete top-level JSON object in `buffer`, returning
/// the byte range of its braces. `None` when no object has closed yet.
fn find_object(buffer: &str) -> Option<(usize, usize)> {
    let start = buffer.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;
    for (offset, c) in buffer[start..].char_indices() {
        if in_string {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some((start, start + offset));
                }
            }
            _ => {}
        }
    }
    None
}

// ── Tests ──────────────────────────────────────────────────────────────
