//! Error types for the ACP bridge.
//!
//! Errors are grouped by the stage that raises them. Setup-stage errors
//! (`ConfigError`, `BootstrapError`) are fatal and propagate to the
//! embedder. Routing-stage errors (`DelegationError`) are caught and
//! logged by the router, converted to a protocol rejection where one
//! applies, and never escape `on_new_task`. Forwarding operations log
//! client failures and re-raise them unchanged.

/// Top-level error type for the bridge.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Bootstrap error: {0}")]
    Bootstrap(#[from] BootstrapError),

    #[error("Protocol client error: {0}")]
    Client(#[from] ClientError),

    #[error("Inference error: {0}")]
    Inference(#[from] InferenceError),

    #[error("Delegation error: {0}")]
    Delegation(#[from] DelegationError),
}

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),
}

/// Errors from establishing the protocol-client connection.
#[derive(Debug, thiserror::Error)]
pub enum BootstrapError {
    #[error("{service} failed to connect after {attempts} attempts: {reason}")]
    AttemptsExhausted {
        service: String,
        attempts: u32,
        reason: String,
    },
}

/// Errors surfaced by the external protocol client.
///
/// The bridge treats these as opaque: forwarding re-raises them verbatim,
/// delegation wraps them, and nothing retries on their content except the
/// bootstrapper.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("Connection failed: {reason}")]
    Connect { reason: String },

    #[error("Request {operation} failed: {reason}")]
    Request { operation: String, reason: String },

    #[error("Invalid job identifier: {raw:?}")]
    InvalidJobId { raw: String },

    #[error("{what} not found: {id}")]
    NotFound { what: String, id: String },
}

impl ClientError {
    /// Shorthand for the common request-failure case.
    pub fn request(operation: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Request {
            operation: operation.into(),
            reason: reason.into(),
        }
    }
}

/// Errors surfaced by the inference pipeline.
#[derive(Debug, thiserror::Error)]
pub enum InferenceError {
    #[error("Pipeline unavailable: {reason}")]
    Unavailable { reason: String },

    #[error("Inference failed: {reason}")]
    Failed { reason: String },
}

/// Errors raised while delegating a job to the inference pipeline.
///
/// The router logs these; where the protocol allows a response, the
/// delegation adapter has already rejected the job before returning.
#[derive(Debug, thiserror::Error)]
pub enum DelegationError {
    #[error("Protocol client error: {0}")]
    Client(#[from] ClientError),

    #[error("Inference pipeline error: {0}")]
    Pipeline(#[from] InferenceError),

    #[error("No inference reply within {waited_secs}s")]
    ReplyTimeout { waited_secs: u64 },

    #[error("Delegation cancelled before the inference reply arrived")]
    Cancelled,

    #[error("Inference reply contained no deliverable content")]
    EmptyReply,
}

pub type Result<T> = std::result::Result<T, Error>;
