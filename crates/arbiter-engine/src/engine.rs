//! # Engine Contract
//!
//! The inference engine is an externally-driven producer of partial output.
//! It is abstracted as a cooperative producer/consumer boundary: a spawned
//! task yields opaque fragments over a bounded channel and closes with an
//! explicit terminal signal. Cancellation is token-based and cooperative —
//! implementations must stop producing promptly once the token fires.

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::context::EvaluationContext;

/// Channel capacity for engine fragment streams.
///
/// Bounded so a slow consumer applies backpressure to the engine task
/// instead of buffering unbounded output.
pub const FRAGMENT_CHANNEL_CAPACITY: usize = 32;

/// One message from an in-flight engine run.
///
/// A well-behaved engine sends zero or more `Fragment`s followed by exactly
/// one terminal signal (`Done` or `Failed`). A channel that closes without
/// a terminal signal is treated as an engine failure by the consumer —
/// transport close alone never implies success.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineSignal {
    /// An opaque partial-output fragment. Fragment boundaries carry no
    /// semantic meaning.
    Fragment(String),
    /// The engine finished producing output.
    Done,
    /// The engine failed; carries a human-readable description.
    Failed(String),
}

/// The inference engine consumed by the arbitration pipeline.
///
/// `start` must not block: implementations spawn their own task and return
/// the receiving half of the fragment channel immediately. The engine task
/// owns the sending half and must observe `cancel` within a bounded grace
/// period, stopping fragment production once it fires.
pub trait ArbiterEngine: Send + Sync {
    /// Begin one arbitration run against the given evaluation context.
    fn start(
        &self,
        context: EvaluationContext,
        cancel: CancellationToken,
    ) -> mpsc::Receiver<EngineSignal>;
}
