//! # Dispute Model
//!
//! Immutable inputs to an arbitration run (policy, evidence, dispute) and
//! the [`DecisionEvent`] variants streamed back to the consumer.
//!
//! ## Wire Shape
//!
//! [`DecisionEvent`] is internally tagged with a `type` discriminator field,
//! so every decoded record is self-describing:
//!
//! ```json
//! {"type":"arbitration","decision_type":"approve_defender","decision":"...","confidence":0.82}
//! {"type":"complete","message":"arbitration complete"}
//! {"type":"error","message":"..."}
//! ```
//!
//! ## Ordering Invariant
//!
//! Evidence lists preserve insertion order — that order is the order of
//! presentation to the inference engine, and arbitration fairness depends on
//! not silently reordering submissions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ValidationError;

// ── Policy ─────────────────────────────────────────────────────────────

/// A policy subject to arbitration.
///
/// Policies are created by users and can be challenged by opposers who
/// submit evidence against them. Immutable once part of a [`Dispute`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Policy {
    /// Unique policy identifier.
    pub id: Uuid,
    /// The user who created the policy.
    pub creator_id: Uuid,
    /// Human-readable policy name.
    pub name: String,
    /// Detailed description of the policy's purpose and scope.
    pub description: Option<String>,
    /// When the policy was created.
    pub created_at: DateTime<Utc>,
}

// ── Evidence ───────────────────────────────────────────────────────────

/// A single piece of submitted content attributed to one side of a dispute.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evidence {
    /// Unique evidence identifier.
    pub id: Uuid,
    /// The policy this evidence relates to. Must match the dispute's policy.
    pub policy_id: Uuid,
    /// The user who submitted this evidence.
    pub submitter_id: Uuid,
    /// The evidence content: facts, arguments, or documentation.
    pub content: String,
    /// When the evidence was submitted.
    pub created_at: DateTime<Utc>,
}

// ── Dispute ────────────────────────────────────────────────────────────

/// The full input to one arbitration run.
///
/// Construction via [`Dispute::new`] enforces the policy-reference
/// invariant: every evidence item on either side must reference
/// `policy.id`. Evidence lists may be empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dispute {
    /// The policy under dispute.
    pub policy: Policy,
    /// Evidence submitted against the policy, in presentation order.
    pub opposer_evidences: Vec<Evidence>,
    /// Evidence submitted in defense of the policy, in presentation order.
    pub defender_evidences: Vec<Evidence>,
    /// Optional free-text steering input from the requesting user.
    pub user_query: Option<String>,
}

impl Dispute {
    /// Assemble a dispute, rejecting evidence that references a different
    /// policy than the one under dispute.
    pub fn new(
        policy: Policy,
        opposer_evidences: Vec<Evidence>,
        defender_evidences: Vec<Evidence>,
        user_query: Option<String>,
    ) -> Result<Self, ValidationError> {
        for evidence in opposer_evidences.iter().chain(defender_evidences.iter()) {
            if evidence.policy_id != policy.id {
                return Err(ValidationError::PolicyMismatch {
                    evidence_id: evidence.id.to_string(),
                    referenced: evidence.policy_id.to_string(),
                    expected: policy.id.to_string(),
                });
            }
        }
        Ok(Self {
            policy,
            opposer_evidences,
            defender_evidences,
            user_query,
        })
    }

    /// Total number of evidence items across both sides.
    pub fn evidence_count(&self) -> usize {
        self.opposer_evidences.len() + self.defender_evidences.len()
    }
}

// ── Decision Types ─────────────────────────────────────────────────────

/// The closed set of verdict categories the arbiter can produce.
///
/// Values outside the closed set arriving from the inference engine are
/// absorbed by the reserved [`Unknown`](DecisionType::Unknown) sentinel
/// rather than silently dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionType {
    /// The opposition's evidence prevails; the policy challenge succeeds.
    ApproveOpposer,
    /// The defense prevails; the policy stands.
    ApproveDefender,
    /// Both sides prevail in part.
    SplitDecision,
    /// Neither side provided enough evidence for a verdict.
    InsufficientEvidence,
    /// Reserved sentinel for unrecognized engine output.
    #[serde(other)]
    Unknown,
}

impl DecisionType {
    /// The closed set of decision types, excluding the `Unknown` sentinel.
    pub fn known() -> &'static [DecisionType] {
        &[
            Self::ApproveOpposer,
            Self::ApproveDefender,
            Self::SplitDecision,
            Self::InsufficientEvidence,
        ]
    }

    /// The canonical string identifier for serialization.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ApproveOpposer => "approve_opposer",
            Self::ApproveDefender => "approve_defender",
            Self::SplitDecision => "split_decision",
            Self::InsufficientEvidence => "insufficient_evidence",
            Self::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for DecisionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Decision Events ────────────────────────────────────────────────────

/// One unit of streamed pipeline output.
///
/// A run's event sequence is zero or more `Arbitration` events followed by
/// exactly one terminal event (`Complete` or `Error`), always last.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DecisionEvent {
    /// An incremental arbitration finding.
    Arbitration {
        /// Verdict category.
        decision_type: DecisionType,
        /// Textual verdict.
        decision: String,
        /// Confidence in the verdict, within [0.0, 1.0].
        confidence: f64,
        /// Reasoning behind the verdict, when the engine provides one.
        #[serde(skip_serializing_if = "Option::is_none")]
        reasoning: Option<String>,
    },
    /// Terminal marker: the run finished normally. No further events follow.
    Complete {
        /// Human-readable completion note.
        message: String,
    },
    /// Terminal marker: the run failed. No further events follow.
    Error {
        /// Human-readable failure description.
        message: String,
    },
}

impl DecisionEvent {
    /// Whether this event ends a session's event sequence.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Complete { .. } | Self::Error { .. })
    }

    /// The `type` discriminator this event serializes with.
    pub fn type_str(&self) -> &'static str {
        match self {
            Self::Arbitration { .. } => "arbitration",
            Self::Complete { .. } => "complete",
            Self::Error { .. } => "error",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy() -> Policy {
        Policy {
            id: Uuid::new_v4(),
            creator_id: Uuid::new_v4(),
            name: "Data Access Policy".to_string(),
            description: Some("All access must be logged.".to_string()),
            created_at: Utc::now(),
        }
    }

    fn evidence_for(policy_id: Uuid, content: &str) -> Evidence {
        Evidence {
            id: Uuid::new_v4(),
            policy_id,
            submitter_id: Uuid::new_v4(),
            content: content.to_string(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn dispute_new_accepts_matching_evidence() {
        let p = policy();
        let ev = evidence_for(p.id, "access logs missing");
        let dispute = Dispute::new(p, vec![ev], vec![], None).unwrap();
        assert_eq!(dispute.evidence_count(), 1);
    }

    #[test]
    fn dispute_new_rejects_foreign_policy_reference() {
        let p = policy();
        let foreign = evidence_for(Uuid::new_v4(), "unrelated");
        let err = Dispute::new(p, vec![], vec![foreign], None).unwrap_err();
        assert!(matches!(err, ValidationError::PolicyMismatch { .. }));
    }

    #[test]
    fn dispute_new_accepts_empty_evidence_lists() {
        let dispute = Dispute::new(policy(), vec![], vec![], None).unwrap();
        assert_eq!(dispute.evidence_count(), 0);
    }

    #[test]
    fn dispute_preserves_evidence_order() {
        let p = policy();
        let contents = ["first", "second", "third"];
        let evs: Vec<Evidence> = contents
            .iter()
            .map(|c| evidence_for(p.id, c))
            .collect();
        let dispute = Dispute::new(p, evs, vec![], None).unwrap();
        let observed: Vec<&str> = dispute
            .opposer_evidences
            .iter()
            .map(|e| e.content.as_str())
            .collect();
        assert_eq!(observed, contents);
    }

    #[test]
    fn decision_type_serializes_snake_case() {
        let json = serde_json::to_string(&DecisionType::ApproveOpposer).unwrap();
        assert_eq!(json, "\"approve_opposer\"");
    }

    #[test]
    fn decision_type_unknown_absorbs_unrecognized_values() {
        let parsed: DecisionType = serde_json::from_str("\"defer_to_panel\"").unwrap();
        assert_eq!(parsed, DecisionType::Unknown);
    }

    #[test]
    fn decision_type_known_excludes_unknown() {
        assert_eq!(DecisionType::known().len(), 4);
        assert!(!DecisionType::known().contains(&DecisionType::Unknown));
    }

    #[test]
    fn decision_event_tagged_with_type_field() {
        let event = DecisionEvent::Complete {
            message: "done".to_string(),
        };
        let value: serde_json::Value = serde_json::to_value(&event).unwrap();
        assert_eq!(value["type"], "complete");
        assert_eq!(value["message"], "done");
    }

    #[test]
    fn arbitration_event_omits_absent_reasoning() {
        let event = DecisionEvent::Arbitration {
            decision_type: DecisionType::SplitDecision,
            decision: "partial".to_string(),
            confidence: 0.5,
            reasoning: None,
        };
        let json = serde_json::to_string(&event).unwrap();
        assert!(!json.contains("reasoning"));
        assert!(json.contains("\"type\":\"arbitration\""));
    }

    #[test]
    fn terminal_classification() {
        let arb = DecisionEvent::Arbitration {
            decision_type: DecisionType::ApproveDefender,
            decision: "stands".to_string(),
            confidence: 0.9,
            reasoning: None,
        };
        assert!(!arb.is_terminal());
        assert!(DecisionEvent::Complete { message: "m".into() }.is_terminal());
        assert!(DecisionEvent::Error { message: "m".into() }.is_terminal());
    }

    #[test]
    fn event_roundtrips_through_json() {
        let event = DecisionEvent::Arbitration {
            decision_type: DecisionType::ApproveDefender,
            decision: "Defender's argument is stronger.".to_string(),
            confidence: 0.82,
            reasoning: Some("step by step".to_string()),
        };
        let json = serde_json::to_string(&event).unwrap();
        let back: DecisionEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(back, event);
    }
}
