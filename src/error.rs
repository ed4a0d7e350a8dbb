//! Error types for roadrisk.

use thiserror::Error;

/// Errors surfaced by the engine.
///
/// Empty inputs and zero-candidate queries are not errors; they produce empty
/// outputs.
#[derive(Debug, Error)]
pub enum RoadRiskError {
    /// Malformed shape, out-of-range radius/k/window or invalid record geometry.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// A record looked up by id is not in the store.
    #[error("Record not found: {0}")]
    RecordNotFound(u64),

    /// A record source failed to deliver; passed through unchanged.
    #[error("Record source error: {0}")]
    Source(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, RoadRiskError>;
