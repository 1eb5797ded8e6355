//! Port to the embedding runtime's inference pipeline.
//!
//! The bridge composes one conversational turn per settlement and expects
//! exactly one reply. The request/response shape of [`InferencePipeline`]
//! makes a second reply structurally impossible; timeout and cancellation
//! are enforced by the delegation adapter, not the pipeline.

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::InferenceError;

/// Source tag stamped on every turn the bridge submits.
pub const SOURCE_TAG: &str = "acp";

/// One conversational message submitted to the pipeline.
#[derive(Debug, Clone)]
pub struct InferenceTurn {
    /// Fresh identifier for this submission.
    pub id: Uuid,
    /// Composed message text.
    pub text: String,
    /// Originating subsystem tag, always [`SOURCE_TAG`].
    pub source: &'static str,
    /// Job this turn settles.
    pub job_id: u64,
    /// Wallet address of the client agent, for pipeline-side routing.
    pub client_address: String,
}

impl InferenceTurn {
    pub fn new(text: impl Into<String>, job_id: u64, client_address: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            text: text.into(),
            source: SOURCE_TAG,
            job_id,
            client_address: client_address.into(),
        }
    }
}

/// The pipeline's single reply to a turn.
#[derive(Debug, Clone, Default)]
pub struct InferenceReply {
    /// Reply text. Empty or whitespace-only means the pipeline produced
    /// nothing deliverable.
    pub text: String,
    /// Model that produced the reply, when the pipeline reports it.
    pub model: Option<String>,
    /// Tokens consumed, when the pipeline reports it.
    pub tokens: Option<u32>,
}

impl InferenceReply {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    /// Whether the reply carries no deliverable content.
    pub fn is_empty(&self) -> bool {
        self.text.trim().is_empty()
    }
}

/// Request/response seam to the runtime's inference pipeline.
#[async_trait]
pub trait InferencePipeline: Send + Sync {
    /// Submit one turn and await its single reply.
    async fn submit(&self, turn: InferenceTurn) -> Result<InferenceReply, InferenceError>;
}
