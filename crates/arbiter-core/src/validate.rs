//! # Dispute Validator
//!
//! Normalizes raw, string-typed request payloads into a validated
//! [`Dispute`]. Identifiers must parse as UUIDs, timestamps as RFC 3339,
//! and every evidence item must reference the disputed policy.
//!
//! Validation is pure and synchronous: no network, no inference calls.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ValidationError;
use crate::model::{Dispute, Evidence, Policy};

// ── Raw Request Shapes ─────────────────────────────────────────────────

/// Untrusted policy payload, as carried by one arbitration request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PolicyRequest {
    pub id: String,
    pub creator_id: String,
    pub name: String,
    pub description: Option<String>,
    pub created_at: String,
}

/// Untrusted evidence payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvidenceRequest {
    pub id: String,
    pub policy_id: String,
    pub submitter_id: String,
    pub content: String,
    pub created_at: String,
}

/// Untrusted dispute payload: one full arbitration request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisputeRequest {
    pub policy: PolicyRequest,
    #[serde(default)]
    pub opposer_evidences: Vec<EvidenceRequest>,
    #[serde(default)]
    pub defender_evidences: Vec<EvidenceRequest>,
    #[serde(default)]
    pub user_query: Option<String>,
}

// ── Field Parsers ──────────────────────────────────────────────────────

fn parse_id(field: &str, value: &str) -> Result<Uuid, ValidationError> {
    Uuid::parse_str(value.trim()).map_err(|_| ValidationError::InvalidIdentifier {
        field: field.to_string(),
        value: value.to_string(),
    })
}

fn parse_timestamp(field: &str, value: &str) -> Result<DateTime<Utc>, ValidationError> {
    // Accept RFC 3339 with or without an explicit offset; the original
    // service emitted bare `datetime.utcnow().isoformat()` strings.
    if let Ok(dt) = DateTime::parse_from_rfc3339(value.trim()) {
        return Ok(dt.with_timezone(&Utc));
    }
    value
        .trim()
        .parse::<chrono::NaiveDateTime>()
        .map(|naive| naive.and_utc())
        .map_err(|_| ValidationError::InvalidTimestamp {
            field: field.to_string(),
            value: value.to_string(),
        })
}

fn require_nonempty(field: &str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::EmptyField {
            field: field.to_string(),
        });
    }
    Ok(())
}

fn validate_evidence(
    side: &str,
    index: usize,
    raw: &EvidenceRequest,
    policy_id: Uuid,
) -> Result<Evidence, ValidationError> {
    let prefix = format!("{side}[{index}]");
    let id = parse_id(&format!("{prefix}.id"), &raw.id)?;
    let evidence_policy_id = parse_id(&format!("{prefix}.policy_id"), &raw.policy_id)?;
    let submitter_id = parse_id(&format!("{prefix}.submitter_id"), &raw.submitter_id)?;
    require_nonempty(&format!("{prefix}.content"), &raw.content)?;
    let created_at = parse_timestamp(&format!("{prefix}.created_at"), &raw.created_at)?;

    if evidence_policy_id != policy_id {
        return Err(ValidationError::PolicyMismatch {
            evidence_id: id.to_string(),
            referenced: evidence_policy_id.to_string(),
            expected: policy_id.to_string(),
        });
    }

    Ok(Evidence {
        id,
        policy_id: evidence_policy_id,
        submitter_id,
        content: raw.content.clone(),
        created_at,
    })
}

// ── Validator ──────────────────────────────────────────────────────────

/// Validate a raw arbitration request into a [`Dispute`].
///
/// Checks every field the pipeline depends on and names the offending field
/// on failure. Preserves evidence order exactly as submitted. Empty evidence
/// lists are accepted; the pipeline handles them downstream.
pub fn validate(raw: &DisputeRequest) -> Result<Dispute, ValidationError> {
    let policy_id = parse_id("policy.id", &raw.policy.id)?;
    let creator_id = parse_id("policy.creator_id", &raw.policy.creator_id)?;
    require_nonempty("policy.name", &raw.policy.name)?;
    let created_at = parse_timestamp("policy.created_at", &raw.policy.created_at)?;

    let policy = Policy {
        id: policy_id,
        creator_id,
        name: raw.policy.name.clone(),
        description: raw.policy.description.clone(),
        created_at,
    };

    let opposer_evidences = raw
        .opposer_evidences
        .iter()
        .enumerate()
        .map(|(i, e)| validate_evidence("opposer_evidences", i, e, policy_id))
        .collect::<Result<Vec<_>, _>>()?;

    let defender_evidences = raw
        .defender_evidences
        .iter()
        .enumerate()
        .map(|(i, e)| validate_evidence("defender_evidences", i, e, policy_id))
        .collect::<Result<Vec<_>, _>>()?;

    Dispute::new(
        policy,
        opposer_evidences,
        defender_evidences,
        raw.user_query.clone(),
    )
}
