//! Error taxonomy for the voice collaboration engine.
//!
//! Errors are values, not control flow: callers that need a response no
//! matter what (synthesis, approval) never propagate these up as a thrown
//! exception — they catch the relevant variant and fall back per §7 of
//! `SPEC_FULL.md`. `BrainError` exists for the cases that genuinely have no
//! safe fallback (bad config, a poisoned lock, a serialization bug).

use thiserror::Error;

/// Main error type shared across the workspace.
#[derive(Error, Debug)]
pub enum BrainError {
    /// IO related errors (cache disk snapshots, config files).
    #[error("IO error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },

    /// Serialization/deserialization errors.
    #[error("Serialization error: {source}")]
    Serialization {
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Invalid input provided to a function (empty response set, malformed request).
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Configuration errors.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Durable store (memory/learning/pattern) errors.
    #[error("Database error: {0}")]
    DatabaseError(String),

    /// Memory system errors distinct from raw database failures.
    #[error("Memory error: {0}")]
    MemoryError(String),

    /// Lock acquisition errors.
    #[error("Lock error: {0}")]
    LockError(String),

    /// No MCP server satisfies a capability/affinity query.
    #[error("No suitable MCP server for capability '{0}'")]
    NoSuitableServer(String),

    /// The circuit breaker for a connection is open.
    #[error("Circuit open for connection {0}")]
    ServerCircuitOpen(String),

    /// A request exceeded its deadline.
    #[error("Request timed out after {0:?}")]
    RequestTimeout(std::time::Duration),

    /// A cooperative cancellation was observed; no state was mutated.
    #[error("Cancelled: {0}")]
    Cancelled(String),

    /// A model backend failed to produce a response.
    #[error("Model backend error: {0}")]
    BackendError(String),

    /// An orchestration plan failed to meet its quality threshold after fallbacks.
    #[error("Orchestration plan {plan_id} failed quality gate: {reason}")]
    PlanQualityFail { plan_id: String, reason: String },

    /// Risk assessment itself failed; approval must fail closed on this.
    #[error("Risk assessment error: {0}")]
    RiskAssessmentError(String),

    /// Item not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Generic error with a custom message, used sparingly.
    #[error("Error: {0}")]
    Other(String),
}

impl From<serde_json::Error> for BrainError {
    fn from(error: serde_json::Error) -> Self {
        BrainError::Serialization {
            source: Box::new(error),
        }
    }
}

impl From<anyhow::Error> for BrainError {
    fn from(error: anyhow::Error) -> Self {
        BrainError::Other(error.to_string())
    }
}

impl From<toml::de::Error> for BrainError {
    fn from(error: toml::de::Error) -> Self {
        BrainError::ConfigError(error.to_string())
    }
}

impl<T> From<std::sync::PoisonError<T>> for BrainError {
    fn from(error: std::sync::PoisonError<T>) -> Self {
        BrainError::LockError(error.to_string())
    }
}

impl From<sqlx::Error> for BrainError {
    fn from(error: sqlx::Error) -> Self {
        BrainError::DatabaseError(error.to_string())
    }
}

/// Result type used across the workspace.
pub type BrainResult<T> = std::result::Result<T, BrainError>;
