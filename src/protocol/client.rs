//! Ports implemented by the embedding runtime's protocol client.
//!
//! The bridge never speaks the wire protocol itself. Everything on-chain
//! (signing, escrow, transport, sessions) lives behind [`AcpClient`];
//! construction lives behind [`ClientConnector`] so the bootstrapper can
//! build a fresh client on every attempt.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;

use crate::error::ClientError;
use crate::protocol::types::{Account, Deliverable, Job, MemoKind, Phase, SigningMemo};

/// Handle to the external protocol client.
///
/// Failures are opaque to the bridge: forwarding operations log and
/// re-raise them unchanged, and the delegation adapter wraps them without
/// inspecting the variant.
#[async_trait]
pub trait AcpClient: Send + Sync + fmt::Debug {
    /// Accept a job during request declaration.
    async fn accept_job(&self, job_id: u64, reason: &str) -> Result<(), ClientError>;

    /// Reject a job with a reason the client agent will see.
    async fn reject_job(&self, job_id: u64, reason: &str) -> Result<(), ClientError>;

    /// Publish the requirement-creation notice after acceptance.
    async fn create_requirement(&self, job_id: u64, text: &str) -> Result<(), ClientError>;

    /// Counter-sign a memo, advancing the job into the memo's phase.
    async fn sign_memo(&self, job_id: u64, memo_id: u64) -> Result<(), ClientError>;

    /// Deliver the work product during settlement.
    async fn deliver(&self, job_id: u64, deliverable: Deliverable) -> Result<(), ClientError>;

    /// Jobs currently open against this agent, paginated.
    async fn active_jobs(&self, page: u32, page_size: u32) -> Result<Vec<Job>, ClientError>;

    /// Jobs that reached `Completed`, paginated.
    async fn completed_jobs(&self, page: u32, page_size: u32) -> Result<Vec<Job>, ClientError>;

    /// Jobs that reached `Rejected` or `Expired`, paginated.
    async fn cancelled_jobs(&self, page: u32, page_size: u32) -> Result<Vec<Job>, ClientError>;

    async fn job_by_id(&self, job_id: u64) -> Result<Job, ClientError>;

    async fn memo_by_id(&self, job_id: u64, memo_id: u64) -> Result<SigningMemo, ClientError>;

    /// Account view for a wallet address.
    async fn account(&self, address: &str) -> Result<Account, ClientError>;

    /// Post an out-of-band notification onto a job's thread.
    async fn create_notification(&self, job_id: u64, message: &str) -> Result<(), ClientError>;

    /// Create a memo on a job, returning the new memo's identifier.
    async fn create_memo(
        &self,
        job_id: u64,
        content: &str,
        kind: MemoKind,
        next_phase: Phase,
    ) -> Result<u64, ClientError>;
}

/// Builds protocol clients for the bootstrapper.
///
/// Each `connect` call must construct a fresh client. A failed instance is
/// never retried; the bootstrapper discards it and asks for another.
#[async_trait]
pub trait ClientConnector: Send + Sync {
    async fn connect(&self) -> Result<Arc<dyn AcpClient>, ClientError>;
}
