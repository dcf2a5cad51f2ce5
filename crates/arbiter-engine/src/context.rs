//! # Evaluation Context
//!
//! Builds the structured prompt presented to the inference engine for one
//! arbitration run. The context combines the policy, the ordered opposer
//! and defender evidence, and the optional user query.
//!
//! ## Ordering Invariant
//!
//! Evidence appears in the context in exactly the order it was submitted.
//! Arbitration fairness depends on never reordering submissions.

use arbiter_core::{Dispute, Evidence};

/// System instructions framing the engine as a neutral arbiter.
///
/// The instructions pin down the output contract: one JSON object per
/// finding with `decision_type`, `decision`, `confidence`, and `reasoning`.
const SYSTEM_INSTRUCTIONS: &str = "\
You are a neutral policy arbiter. Evaluate the policy and the evidence \
submitted by the opposer and the defender, and decide whether the policy \
was violated. Be objective and impartial. Only use the evidence provided; \
never invent evidence. Reason step by step, then state your findings.

Emit each finding as a single JSON object with the fields:
  decision_type: one of \"approve_opposer\", \"approve_defender\", \
\"split_decision\", \"insufficient_evidence\"
  decision: a clear textual verdict
  confidence: a number between 0.0 and 1.0
  reasoning: the reasoning behind the verdict";

/// The structured evaluation context for one arbitration run.
#[derive(Debug, Clone, PartialEq)]
pub struct EvaluationContext {
    /// Arbiter framing and output contract.
    pub system: String,
    /// Policy, evidence, and query, rendered in presentation order.
    pub input: String,
}

impl EvaluationContext {
    /// Assemble the context from a validated dispute.
    pub fn from_dispute(dispute: &Dispute) -> Self {
        let mut input = String::new();

        input.push_str("Policy under dispute:\n");
        input.push_str(&format!("  name: {}\n", dispute.policy.name));
        if let Some(description) = &dispute.policy.description {
            input.push_str(&format!("  description: {description}\n"));
        }
        input.push_str(&format!("  created: {}\n", dispute.policy.created_at.to_rfc3339()));

        input.push_str("\nOpposer evidence:\n");
        push_evidence_block(&mut input, &dispute.opposer_evidences);

        input.push_str("\nDefender evidence:\n");
        push_evidence_block(&mut input, &dispute.defender_evidences);

        if let Some(query) = &dispute.user_query {
            input.push_str("\nUser query:\n");
            input.push_str(&format!("  {query}\n"));
        }

        Self {
            system: SYSTEM_INSTRUCTIONS.to_string(),
            input,
        }
    }
}

fn push_evidence_block(out: &mut String, evidences: &[Evidence]) {
    if evidences.is_empty() {
        out.push_str("  (none submitted)\n");
        return;
    }
    for (i, evidence) in evidences.iter().enumerate() {
        out.push_str(&format!(
            "  {}. {} (submitted by {} at {})\n",
            i + 1,
            evidence.content,
            evidence.submitter_id,
            evidence.created_at.to_rfc3339(),
        ));
    }
}
