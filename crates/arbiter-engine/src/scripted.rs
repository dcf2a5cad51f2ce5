//! # Scripted Engines
//!
//! Deterministic in-tree engines used by tests and by unconfigured
//! deployments. [`ScriptedEngine`] replays a fixed signal script;
//! [`StalledEngine`] never produces output and records whether it observed
//! cancellation.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::context::EvaluationContext;
use crate::engine::{ArbiterEngine, EngineSignal, FRAGMENT_CHANNEL_CAPACITY};

/// An engine that replays a fixed script of signals.
#[derive(Debug, Clone)]
pub struct ScriptedEngine {
    script: Vec<EngineSignal>,
}

impl ScriptedEngine {
    /// Replay the given signals verbatim.
    pub fn new(script: Vec<EngineSignal>) -> Self {
        Self { script }
    }

    /// An engine that completes immediately without producing any decision.
    pub fn silent() -> Self {
        Self::new(vec![EngineSignal::Done])
    }

    /// An engine yielding one complete decision fragment, then done.
    pub fn single_decision(fragment: impl Into<String>) -> Self {
        Self::new(vec![
            EngineSignal::Fragment(fragment.into()),
            EngineSignal::Done,
        ])
    }

    /// The placeholder verdict served when no upstream engine is configured.
    ///
    /// Mirrors an unconfigured deployment answering health checks and smoke
    /// tests with an explicit low-confidence non-decision.
    pub fn placeholder() -> Self {
        Self::single_decision(
            r#"{"decision_type":"insufficient_evidence","decision":"No inference engine is configured; no verdict can be rendered.","confidence":0.0,"reasoning":"Placeholder engine response."}"#,
        )
    }
}

impl ArbiterEngine for ScriptedEngine {
    fn start(
        &self,
        _context: EvaluationContext,
        cancel: CancellationToken,
    ) -> mpsc::Receiver<EngineSignal> {
        let (tx, rx) = mpsc::channel(FRAGMENT_CHANNEL_CAPACITY);
        let script = self.script.clone();
        tokio::spawn(async move {
            for signal in script {
                tokio::select! {
                    biased;
                    _ = cancel.cancelled() => {
                        tracing::debug!("scripted engine observed cancellation");
                        return;
                    }
                    sent = tx.send(signal) => {
                        if sent.is_err() {
                            // Consumer went away; nothing left to deliver.
                            return;
                        }
                    }
                }
            }
        });
        rx
    }
}

/// An engine that produces nothing until cancelled.
///
/// Used to exercise the cancellation path: `was_cancelled` flips once the
/// engine task observes the token.
#[derive(Debug, Clone)]
pub struct StalledEngine {
    cancelled: Arc<AtomicBool>,
}

impl StalledEngine {
    /// Create a stalled engine.
    pub fn new() -> Self {
        Self {
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Whether the engine task has observed cancellation.
    pub fn was_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

impl Default for StalledEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl ArbiterEngine for StalledEngine {
    fn start(
        &self,
        _context: EvaluationContext,
        cancel: CancellationToken,
    ) -> mpsc::Receiver<EngineSignal> {
        let (tx, rx) = mpsc::channel(FRAGMENT_CHANNEL_CAPACITY);
        let cancelled = Arc::clone(&self.cancelled);
        tokio::spawn(async move {
            cancel.cancelled().await;
            cancelled.store(true, Ordering::SeqCst);
            // Hold the sender until now so the channel stays open while
            // stalled; dropping it here closes the stream without a
            // terminal signal.
            drop(tx);
        });
        rx
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arbiter_core::{Dispute, Policy};
    use chrono::Utc;
    use uuid::Uuid;

    fn context() -> EvaluationContext {
        let policy = Policy {
            id: Uuid::new_v4(),
            creator_id: Uuid::new_v4(),
            name: "P".to_string(),
            description: None,
            created_at: Utc::now(),
        };
        let dispute = Dispute::new(policy, vec![], vec![], None).unwrap();
        EvaluationContext::from_dispute(&dispute)
    }

    #[tokio::test]
    async fn scripted_engine_replays_script_in_order() {
        let engine = ScriptedEngine::new(vec![
            EngineSignal::Fragment("a".to_string()),
            EngineSignal::Fragment("b".to_string()),
            EngineSignal::Done,
        ]);
        let mut rx = engine.start(context(), CancellationToken::new());
        assert_eq!(rx.recv().await, Some(EngineSignal::Fragment("a".to_string())));
        assert_eq!(rx.recv().await, Some(EngineSignal::Fragment("b".to_string())));
        assert_eq!(rx.recv().await, Some(EngineSignal::Done));
        assert_eq!(rx.recv().await, None);
    }

    #[tokio::test]
    async fn scripted_engine_stops_on_cancel() {
        let engine = ScriptedEngine::new(vec![
            EngineSignal::Fragment("never delivered".to_string()),
            EngineSignal::Done,
        ]);
        let cancel = CancellationToken::new();
        cancel.cancel();
        let mut rx = engine.start(context(), cancel);
        // The task may deliver nothing or exit immediately; either way the
        // channel closes without a terminal signal.
        while let Some(signal) = rx.recv().await {
            assert_ne!(signal, EngineSignal::Done);
        }
    }

    #[tokio::test]
    async fn stalled_engine_observes_cancellation() {
        let engine = StalledEngine::new();
        let cancel = CancellationToken::new();
        let mut rx = engine.start(context(), cancel.clone());
        assert!(!engine.was_cancelled());

        cancel.cancel();
        // Channel closes once the task wakes and drops the sender.
        assert_eq!(rx.recv().await, None);
        assert!(engine.was_cancelled());
    }

    #[tokio::test]
    async fn placeholder_emits_insufficient_evidence_fragment() {
        let engine = ScriptedEngine::placeholder();
        let mut rx = engine.start(context(), CancellationToken::new());
        match rx.recv().await {
            Some(EngineSignal::Fragment(text)) => {
                assert!(text.contains("insufficient_evidence"));
            }
            other => panic!("expected fragment, got: {other:?}"),
        }
        assert_eq!(rx.recv().await, Some(EngineSignal::Done));
    }
}
