//! Phase-transition dispatch and AI delegation.
//!
//! An incoming job update carries the job's current phase and, via its
//! signing memo, a proposed next phase. Exactly two combinations mean
//! work for this agent; everything else is classified [`PhaseTransition::Unhandled`]
//! and logged away. Both live paths respond through the protocol client,
//! and settlement additionally runs one turn through the inference
//! pipeline under a mandatory reply timeout and a cancellation token.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::error::DelegationError;
use crate::inference::{InferencePipeline, InferenceReply, InferenceTurn};
use crate::protocol::client::AcpClient;
use crate::protocol::types::{Deliverable, DeliverableMeta, Job, Phase, SigningMemo};

/// Reply timeout applied when the adapter is built without one.
pub const DEFAULT_REPLY_TIMEOUT: Duration =
    Duration::from_secs(crate::config::DEFAULT_REPLY_TIMEOUT_SECS);

/// Reason sent with the acceptance during request declaration.
const ACCEPT_REASON: &str = "job accepted";

/// Transition table for incoming job updates, keyed on
/// (current phase, proposed next phase).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhaseTransition {
    /// `Request` -> `Negotiation`: decide whether to take the job.
    RequestDeclaration,
    /// `Transaction` -> `Evaluation`: produce and deliver the work
    /// product.
    Settlement,
    /// Any other combination, including updates without a memo. Carries
    /// what was seen, for the log line.
    Unhandled {
        current: Phase,
        proposed: Option<Phase>,
    },
}

impl PhaseTransition {
    /// Classify an update by the job's phase and the memo's proposal.
    pub fn classify(current: Phase, memo: Option<&SigningMemo>) -> Self {
        match (current, memo.map(|m| m.next_phase)) {
            (Phase::Request, Some(Phase::Negotiation)) => Self::RequestDeclaration,
            (Phase::Transaction, Some(Phase::Evaluation)) => Self::Settlement,
            (current, proposed) => Self::Unhandled { current, proposed },
        }
    }
}

/// Decides whether this agent can take a job at all.
pub trait CapabilityCheck: Send + Sync {
    /// `Err` carries the rejection reason sent back to the client agent.
    fn assess(&self, job: &Job) -> Result<(), String>;
}

/// Baseline capability check: every job is permitted.
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysPermit;

impl CapabilityCheck for AlwaysPermit {
    fn assess(&self, _job: &Job) -> Result<(), String> {
        Ok(())
    }
}

/// Drives delegated job types through the inference pipeline.
pub struct DelegationAdapter {
    client: Arc<dyn AcpClient>,
    pipeline: Arc<dyn InferencePipeline>,
    capability: Arc<dyn CapabilityCheck>,
    reply_timeout: Duration,
    cancel: CancellationToken,
}

impl DelegationAdapter {
    pub fn new(client: Arc<dyn AcpClient>, pipeline: Arc<dyn InferencePipeline>) -> Self {
        Self {
            client,
            pipeline,
            capability: Arc::new(AlwaysPermit),
            reply_timeout: DEFAULT_REPLY_TIMEOUT,
            cancel: CancellationToken::new(),
        }
    }

    pub fn with_capability_check(mut self, check: Arc<dyn CapabilityCheck>) -> Self {
        self.capability = check;
        self
    }

    /// Replace the mandatory reply timeout. There is no way to disable it.
    pub fn with_reply_timeout(mut self, timeout: Duration) -> Self {
        self.reply_timeout = timeout;
        self
    }

    /// Token that aborts any in-flight inference wait when cancelled.
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Route one job update through the transition table.
    ///
    /// Errors returned here have already been converted to a protocol
    /// rejection where one applies; the router logs them and moves on.
    pub async fn handle(
        &self,
        job: &Job,
        memo: Option<&SigningMemo>,
    ) -> Result<(), DelegationError> {
        match PhaseTransition::classify(job.phase, memo) {
            PhaseTransition::RequestDeclaration => self.declare_request(job).await,
            PhaseTransition::Settlement => {
                // classify yields Settlement only when a memo is present
                let Some(memo) = memo else { return Ok(()) };
                self.settle(job, memo).await
            }
            PhaseTransition::Unhandled { current, proposed } => {
                tracing::debug!(
                    job_id = job.id,
                    current = %current,
                    proposed = ?proposed,
                    "ignoring job update with no configured transition"
                );
                Ok(())
            }
        }
    }

    /// `Request` -> `Negotiation`: capability-check the job, then either
    /// accept it and publish the requirement notice, or reject it.
    async fn declare_request(&self, job: &Job) -> Result<(), DelegationError> {
        if let Err(reason) = self.capability.assess(job) {
            tracing::info!(job_id = job.id, reason = %reason, "declining job");
            self.client.reject_job(job.id, &reason).await?;
            return Ok(());
        }

        self.client.accept_job(job.id, ACCEPT_REASON).await?;

        let notice = job
            .requirement
            .clone()
            .unwrap_or_else(|| "no requirement provided".to_string());
        self.client.create_requirement(job.id, &notice).await?;

        tracing::info!(
            job_id = job.id,
            client = %job.client_address,
            "accepted job and published requirement"
        );
        Ok(())
    }

    /// `Transaction` -> `Evaluation`: counter-sign the transaction memo,
    /// run one turn through the pipeline, and deliver the reply.
    async fn settle(&self, job: &Job, memo: &SigningMemo) -> Result<(), DelegationError> {
        self.client.sign_memo(job.id, memo.id).await?;

        let turn = InferenceTurn::new(
            compose_settlement_message(job),
            job.id,
            &job.client_address,
        );
        tracing::debug!(
            job_id = job.id,
            turn_id = %turn.id,
            "submitting settlement turn to inference pipeline"
        );

        let reply = match self.await_reply(turn).await {
            Ok(reply) if reply.is_empty() => {
                let err = DelegationError::EmptyReply;
                self.reject_after_failure(job, &err).await;
                return Err(err);
            }
            Ok(reply) => reply,
            Err(err) => {
                self.reject_after_failure(job, &err).await;
                return Err(err);
            }
        };

        let InferenceReply {
            text,
            model,
            tokens,
        } = reply;
        let deliverable = Deliverable::text(text)
            .with_meta(DeliverableMeta::now().with_tokens(tokens).with_model(model));
        self.client.deliver(job.id, deliverable).await?;

        tracing::info!(job_id = job.id, "delivered settlement output");
        Ok(())
    }

    /// Wait for the pipeline's single reply, bounded by the timeout and
    /// the cancellation token.
    async fn await_reply(&self, turn: InferenceTurn) -> Result<InferenceReply, DelegationError> {
        let waited_secs = self.reply_timeout.as_secs();
        tokio::select! {
            _ = self.cancel.cancelled() => Err(DelegationError::Cancelled),
            outcome = tokio::time::timeout(self.reply_timeout, self.pipeline.submit(turn)) => {
                match outcome {
                    Ok(Ok(reply)) => Ok(reply),
                    Ok(Err(err)) => Err(DelegationError::Pipeline(err)),
                    Err(_) => Err(DelegationError::ReplyTimeout { waited_secs }),
                }
            }
        }
    }

    /// Reject the job so it can unwind after a failed settlement. A
    /// failure of the rejection itself is logged, not propagated; the
    /// original error is what the caller sees.
    async fn reject_after_failure(&self, job: &Job, err: &DelegationError) {
        let Some(reason) = rejection_reason(err) else {
            return;
        };
        if let Err(reject_err) = self.client.reject_job(job.id, reason).await {
            tracing::warn!(
                job_id = job.id,
                error = %reject_err,
                "failed to reject job after delegation failure"
            );
        }
    }
}

/// Fixed rejection reason for a delegation failure, or `None` when the
/// protocol client itself failed and no response can be trusted to go
/// through.
fn rejection_reason(err: &DelegationError) -> Option<&'static str> {
    match err {
        DelegationError::EmptyReply => Some("no output produced for this job"),
        DelegationError::ReplyTimeout { .. } => Some("no response produced in time"),
        DelegationError::Cancelled => Some("agent is shutting down"),
        DelegationError::Pipeline(_) => Some("agent failed to process this job"),
        DelegationError::Client(_) => None,
    }
}

/// One conversational message per settlement: what was agreed and who
/// asked for it.
fn compose_settlement_message(job: &Job) -> String {
    match job.requirement.as_deref() {
        Some(requirement) => format!(
            "Job {} from {} has been paid for. Produce the deliverable for the agreed requirement: {}",
            job.id, job.client_address, requirement
        ),
        None => format!(
            "Job {} from {} has been paid for. Produce the deliverable for the agreed work.",
            job.id, job.client_address
        ),
    }
}
