//! Job-type registry: which handler owns each job type.
//!
//! The registry is immutable after setup. [`JobTypeRegistry::merge`]
//! consumes the current registry and returns a new one, so a routing
//! update always produces a new bridge instance instead of mutating a
//! live one.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use futures::future::BoxFuture;

use crate::protocol::client::AcpClient;
use crate::protocol::types::{Job, SigningMemo};

/// How a job type is handled when an update for it arrives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandlerKind {
    /// An embedder-supplied closure owns the job.
    Predetermined,
    /// The delegation adapter drives the job through the inference
    /// pipeline.
    DelegateToAi,
}

/// Handle given to predetermined handlers for responding to their job.
#[derive(Clone)]
pub struct RouterContext {
    pub client: Arc<dyn AcpClient>,
    /// Wallet address this agent trades under.
    pub agent_address: String,
}

impl fmt::Debug for RouterContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouterContext")
            .field("agent_address", &self.agent_address)
            .finish_non_exhaustive()
    }
}

/// Embedder-supplied closure bound to a job type.
///
/// Runs inline on the router task. Errors are logged by the router and
/// never propagated.
pub type JobHandler = Arc<
    dyn Fn(Job, RouterContext, Option<SigningMemo>) -> BoxFuture<'static, anyhow::Result<()>>
        + Send
        + Sync,
>;

/// Registry entry for one job type.
#[derive(Clone)]
pub struct JobTypeConfig {
    kind: HandlerKind,
    handler: Option<JobHandler>,
}

impl JobTypeConfig {
    /// Predetermined handling with a bound closure.
    pub fn predetermined(handler: JobHandler) -> Self {
        Self {
            kind: HandlerKind::Predetermined,
            handler: Some(handler),
        }
    }

    /// Predetermined handling with no closure bound. Routing such a job
    /// logs a warning and takes no protocol action.
    pub fn predetermined_unbound() -> Self {
        Self {
            kind: HandlerKind::Predetermined,
            handler: None,
        }
    }

    /// Hand the job type to the inference pipeline.
    pub fn delegate_to_ai() -> Self {
        Self {
            kind: HandlerKind::DelegateToAi,
            handler: None,
        }
    }

    pub fn kind(&self) -> HandlerKind {
        self.kind
    }

    pub fn handler(&self) -> Option<&JobHandler> {
        self.handler.as_ref()
    }
}

impl fmt::Debug for JobTypeConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JobTypeConfig")
            .field("kind", &self.kind)
            .field("handler_bound", &self.handler.is_some())
            .finish()
    }
}

/// Mapping from job-type name to its handling config.
#[derive(Debug, Clone, Default)]
pub struct JobTypeRegistry {
    entries: HashMap<String, JobTypeConfig>,
}

impl JobTypeRegistry {
    /// Empty baseline registry.
    pub fn seed() -> Self {
        Self::default()
    }

    /// Replace whole entries keyed by job-type name, returning the new
    /// registry.
    ///
    /// Entries not named in `updates` are kept as they were. There is no
    /// partial update of an entry: the incoming config replaces the old
    /// one outright, so merging the same update twice yields the same
    /// mapping.
    pub fn merge<I>(mut self, updates: I) -> Self
    where
        I: IntoIterator<Item = (String, JobTypeConfig)>,
    {
        for (name, config) in updates {
            self.entries.insert(name, config);
        }
        self
    }

    pub fn get(&self, job_type: &str) -> Option<&JobTypeConfig> {
        self.entries.get(job_type)
    }

    pub fn contains(&self, job_type: &str) -> bool {
        self.entries.contains_key(job_type)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Registered job-type names, unordered.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }
}
