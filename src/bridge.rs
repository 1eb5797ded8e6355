//! The embedding surface: job routing and client forwarding.
//!
//! [`AcpBridge`] is what the runtime holds. Inbound, it receives job
//! updates from the external client and routes them by job-type name.
//! Outbound, it forwards queries and creation calls to the client,
//! logging failures and re-raising them unchanged.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::config::AcpConfig;
use crate::delegation::{CapabilityCheck, DelegationAdapter};
use crate::error::ClientError;
use crate::inference::InferencePipeline;
use crate::protocol::client::AcpClient;
use crate::protocol::types::{Account, Job, MemoKind, Phase, SigningMemo};
use crate::registry::{HandlerKind, JobTypeRegistry, RouterContext};

/// Bridge between the runtime and the job exchange.
pub struct AcpBridge {
    registry: Arc<JobTypeRegistry>,
    client: Arc<dyn AcpClient>,
    delegation: DelegationAdapter,
    agent_address: String,
}

impl AcpBridge {
    /// Build a bridge over an established client and the runtime's
    /// inference pipeline. Starts with an empty registry; see
    /// [`AcpBridge::with_registry`].
    pub fn new(
        client: Arc<dyn AcpClient>,
        pipeline: Arc<dyn InferencePipeline>,
        config: &AcpConfig,
    ) -> Self {
        Self {
            registry: Arc::new(JobTypeRegistry::seed()),
            delegation: DelegationAdapter::new(client.clone(), pipeline)
                .with_reply_timeout(config.reply_timeout),
            client,
            agent_address: config.agent_wallet_address.clone(),
        }
    }

    /// Replace the registry, producing a new bridge value. A registry is
    /// immutable once a bridge holds it; routing updates mean building a
    /// new bridge.
    pub fn with_registry(mut self, registry: JobTypeRegistry) -> Self {
        self.registry = Arc::new(registry);
        self
    }

    pub fn with_capability_check(mut self, check: Arc<dyn CapabilityCheck>) -> Self {
        self.delegation = self.delegation.with_capability_check(check);
        self
    }

    /// Token that aborts in-flight delegation waits when cancelled.
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.delegation = self.delegation.with_cancellation(cancel);
        self
    }

    pub fn registry(&self) -> &JobTypeRegistry {
        &self.registry
    }

    /// Entry point for job updates pushed by the external client.
    ///
    /// Never fails. Routing errors are logged and swallowed so one bad
    /// job cannot take down the update listener; where the protocol
    /// allows a response, the failure has already been converted into a
    /// rejection before it reaches the log line.
    pub async fn on_new_task(&self, job: Job, memo: Option<SigningMemo>) {
        let job_id = job.id;

        let Some(job_type) = job.job_type.clone() else {
            tracing::warn!(job_id, phase = %job.phase, "job update carries no job type, ignoring");
            return;
        };
        let Some(entry) = self.registry.get(&job_type) else {
            tracing::warn!(job_id, job_type, "no registry entry for job type, ignoring");
            return;
        };

        match entry.kind() {
            HandlerKind::Predetermined => match entry.handler() {
                Some(handler) => {
                    let ctx = RouterContext {
                        client: self.client.clone(),
                        agent_address: self.agent_address.clone(),
                    };
                    if let Err(err) = handler(job, ctx, memo).await {
                        tracing::warn!(job_id, job_type, error = %err, "predetermined handler failed");
                    }
                }
                None => {
                    tracing::warn!(job_id, job_type, "predetermined job type has no handler bound, skipping");
                }
            },
            HandlerKind::DelegateToAi => {
                if let Err(err) = self.delegation.handle(&job, memo.as_ref()).await {
                    tracing::warn!(job_id, job_type, error = %err, "delegation failed");
                }
            }
        }
    }

    // ── Forwarding: queries and creators pass straight through. ────────

    pub async fn active_jobs(&self, page: u32, page_size: u32) -> Result<Vec<Job>, ClientError> {
        self.client
            .active_jobs(page, page_size)
            .await
            .inspect_err(|err| {
                tracing::warn!(page, page_size, error = %err, "active jobs query failed");
            })
    }

    pub async fn completed_jobs(
        &self,
        page: u32,
        page_size: u32,
    ) -> Result<Vec<Job>, ClientError> {
        self.client
            .completed_jobs(page, page_size)
            .await
            .inspect_err(|err| {
                tracing::warn!(page, page_size, error = %err, "completed jobs query failed");
            })
    }

    pub async fn cancelled_jobs(
        &self,
        page: u32,
        page_size: u32,
    ) -> Result<Vec<Job>, ClientError> {
        self.client
            .cancelled_jobs(page, page_size)
            .await
            .inspect_err(|err| {
                tracing::warn!(page, page_size, error = %err, "cancelled jobs query failed");
            })
    }

    /// Look up one job. Identifiers arrive as strings from runtime
    /// surfaces; the chain wants numbers.
    pub async fn job_by_id(&self, job_id: &str) -> Result<Job, ClientError> {
        let id = parse_job_id(job_id)?;
        self.client.job_by_id(id).await.inspect_err(|err| {
            tracing::warn!(job_id = id, error = %err, "job lookup failed");
        })
    }

    pub async fn memo_by_id(&self, job_id: &str, memo_id: u64) -> Result<SigningMemo, ClientError> {
        let id = parse_job_id(job_id)?;
        self.client.memo_by_id(id, memo_id).await.inspect_err(|err| {
            tracing::warn!(job_id = id, memo_id, error = %err, "memo lookup failed");
        })
    }

    pub async fn account(&self, address: &str) -> Result<Account, ClientError> {
        self.client.account(address).await.inspect_err(|err| {
            tracing::warn!(address, error = %err, "account lookup failed");
        })
    }

    pub async fn create_notification(
        &self,
        job_id: &str,
        message: &str,
    ) -> Result<(), ClientError> {
        let id = parse_job_id(job_id)?;
        self.client
            .create_notification(id, message)
            .await
            .inspect_err(|err| {
                tracing::warn!(job_id = id, error = %err, "notification creation failed");
            })
    }

    pub async fn create_memo(
        &self,
        job_id: &str,
        content: &str,
        kind: MemoKind,
        next_phase: Phase,
    ) -> Result<u64, ClientError> {
        let id = parse_job_id(job_id)?;
        self.client
            .create_memo(id, content, kind, next_phase)
            .await
            .inspect_err(|err| {
                tracing::warn!(job_id = id, next_phase = %next_phase, error = %err, "memo creation failed");
            })
    }
}

fn parse_job_id(raw: &str) -> Result<u64, ClientError> {
    raw.trim()
        .parse()
        .map_err(|_| ClientError::InvalidJobId {
            raw: raw.to_string(),
        })
}
