//! Bridge between an AI-agent runtime and an ACP job exchange.
//!
//! The embedding runtime supplies two collaborators behind traits: an
//! [`AcpClient`] that speaks the on-chain protocol, and an
//! [`InferencePipeline`] that turns one conversational message into one
//! reply. On top of those this crate provides:
//!
//! - [`AcpBridge`]: receives job updates and routes them by job-type
//!   name to a predetermined handler or to AI delegation; forwards
//!   queries and creation calls to the client.
//! - [`DelegationAdapter`]: the two live phase transitions (request
//!   declaration, settlement) as an explicit transition table, with a
//!   mandatory inference reply timeout and cancellation.
//! - [`connect_with_backoff`]: builds the client with bounded
//!   exponential-backoff retries, a fresh instance per attempt.
//! - [`JobTypeRegistry`]: the job-type mapping, immutable after setup;
//!   updates produce a new registry and a new bridge.
//!
//! Configuration comes from environment variables via
//! [`AcpConfig::from_env`]; the wallet settings are required and their
//! absence is fatal at startup.

pub mod bootstrap;
pub mod bridge;
pub mod config;
pub mod delegation;
pub mod error;
pub mod inference;
pub mod protocol;
pub mod registry;

pub use bootstrap::connect_with_backoff;
pub use bridge::AcpBridge;
pub use config::AcpConfig;
pub use delegation::{
    AlwaysPermit, CapabilityCheck, DelegationAdapter, PhaseTransition, DEFAULT_REPLY_TIMEOUT,
};
pub use error::{
    BootstrapError, ClientError, ConfigError, DelegationError, Error, InferenceError, Result,
};
pub use inference::{InferencePipeline, InferenceReply, InferenceTurn, SOURCE_TAG};
pub use protocol::client::{AcpClient, ClientConnector};
pub use protocol::types::{
    Account, Deliverable, DeliverableMeta, Job, MemoKind, Phase, SigningMemo,
};
pub use registry::{HandlerKind, JobHandler, JobTypeConfig, JobTypeRegistry, RouterContext};
