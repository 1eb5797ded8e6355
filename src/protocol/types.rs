//! Data types shared across the bridge: jobs, phases, memos, deliverables.
//!
//! These are read-only views of protocol state as the external client
//! reports it. The bridge never mutates a job; it only responds to one.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle phase of a job on the exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Client has opened the job and is waiting for a response.
    Request,
    /// Terms are being agreed between client and provider.
    Negotiation,
    /// Payment escrowed; provider owes the work product.
    Transaction,
    /// Work product delivered; client is evaluating.
    Evaluation,
    /// Job finished successfully.
    Completed,
    /// Job rejected by either side.
    Rejected,
    /// Job lapsed without completing its phase.
    Expired,
}

impl Phase {
    /// Whether the job can still advance.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Phase::Completed | Phase::Rejected | Phase::Expired)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Request => "request",
            Phase::Negotiation => "negotiation",
            Phase::Transaction => "transaction",
            Phase::Evaluation => "evaluation",
            Phase::Completed => "completed",
            Phase::Rejected => "rejected",
            Phase::Expired => "expired",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Read-only view of a job as delivered by the external client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    /// On-chain job identifier.
    pub id: u64,
    /// Current lifecycle phase.
    pub phase: Phase,
    /// Free-form requirement payload from the client agent, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requirement: Option<String>,
    /// Wallet address of the client agent that opened the job.
    pub client_address: String,
    /// Job-type name used for registry lookup. May be absent on
    /// malformed or out-of-band updates.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_type: Option<String>,
}

impl Job {
    pub fn new(id: u64, phase: Phase, client_address: impl Into<String>) -> Self {
        Self {
            id,
            phase,
            requirement: None,
            client_address: client_address.into(),
            job_type: None,
        }
    }

    pub fn with_job_type(mut self, job_type: impl Into<String>) -> Self {
        self.job_type = Some(job_type.into());
        self
    }

    pub fn with_requirement(mut self, requirement: impl Into<String>) -> Self {
        self.requirement = Some(requirement.into());
        self
    }
}

/// Kind tag carried by a signing memo.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemoKind {
    /// Plain conversational content.
    Message,
    /// URL pointing at supporting context.
    ContextUrl,
    /// URL pointing at a structured object.
    ObjectUrl,
    /// Transaction hash reference.
    TxHash,
}

/// A protocol message attached to a job, proposing its next phase.
///
/// The receiving side decides whether to sign (advance) or reject.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SigningMemo {
    /// Memo identifier, unique within the job.
    pub id: u64,
    /// Phase the memo proposes to move the job into.
    pub next_phase: Phase,
    /// Memo body.
    pub content: String,
    pub kind: MemoKind,
}

impl SigningMemo {
    pub fn new(id: u64, next_phase: Phase, content: impl Into<String>, kind: MemoKind) -> Self {
        Self {
            id,
            next_phase,
            content: content.into(),
            kind,
        }
    }

    /// Plain-message memo, the common case.
    pub fn message(id: u64, next_phase: Phase, content: impl Into<String>) -> Self {
        Self::new(id, next_phase, content, MemoKind::Message)
    }
}

/// Metadata attached to a deliverable when the pipeline reports it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeliverableMeta {
    /// When the bridge finished composing the deliverable.
    pub produced_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tokens: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

impl DeliverableMeta {
    /// Metadata stamped with the current time.
    pub fn now() -> Self {
        Self {
            produced_at: Utc::now(),
            tokens: None,
            model: None,
        }
    }

    pub fn with_tokens(mut self, tokens: Option<u32>) -> Self {
        self.tokens = tokens;
        self
    }

    pub fn with_model(mut self, model: Option<String>) -> Self {
        self.model = model;
        self
    }
}

/// Work product delivered during settlement.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Deliverable {
    Text {
        value: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        meta: Option<DeliverableMeta>,
    },
    Object {
        value: serde_json::Value,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        meta: Option<DeliverableMeta>,
    },
}

impl Deliverable {
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text {
            value: value.into(),
            meta: None,
        }
    }

    pub fn object(value: serde_json::Value) -> Self {
        Self::Object { value, meta: None }
    }

    pub fn with_meta(self, meta: DeliverableMeta) -> Self {
        match self {
            Self::Text { value, .. } => Self::Text {
                value,
                meta: Some(meta),
            },
            Self::Object { value, .. } => Self::Object {
                value,
                meta: Some(meta),
            },
        }
    }

    pub fn meta(&self) -> Option<&DeliverableMeta> {
        match self {
            Self::Text { meta, .. } | Self::Object { meta, .. } => meta.as_ref(),
        }
    }
}

/// Minimal account view returned by lookup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    pub address: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entity_id: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminal_phases() {
        assert!(Phase::Completed.is_terminal());
        assert!(Phase::Rejected.is_terminal());
        assert!(Phase::Expired.is_terminal());
        assert!(!Phase::Request.is_terminal());
        assert!(!Phase::Transaction.is_terminal());
    }

    #[test]
    fn phase_display_matches_wire_name() {
        assert_eq!(Phase::Negotiation.to_string(), "negotiation");
        let wire = serde_json::to_string(&Phase::Negotiation).unwrap();
        assert_eq!(wire, "\"negotiation\"");
    }

    #[test]
    fn job_builder_sets_optional_fields() {
        let job = Job::new(7, Phase::Request, "0xabc")
            .with_job_type("summarize")
            .with_requirement("three bullet points");
        assert_eq!(job.id, 7);
        assert_eq!(job.job_type.as_deref(), Some("summarize"));
        assert_eq!(job.requirement.as_deref(), Some("three bullet points"));
    }

    #[test]
    fn deliverable_text_serializes_with_kind_tag() {
        let d = Deliverable::text("done").with_meta(
            DeliverableMeta::now()
                .with_tokens(Some(42))
                .with_model(Some("relay-1".to_string())),
        );
        let json = serde_json::to_value(&d).unwrap();
        assert_eq!(json["kind"], "text");
        assert_eq!(json["value"], "done");
        assert_eq!(json["meta"]["tokens"], 42);
        assert_eq!(json["meta"]["model"], "relay-1");
    }

    #[test]
    fn deliverable_meta_accessor_covers_both_variants() {
        let text = Deliverable::text("x").with_meta(DeliverableMeta::now());
        assert!(text.meta().is_some());

        let object = Deliverable::object(serde_json::json!({"ok": true}));
        assert!(object.meta().is_none());
    }
}
