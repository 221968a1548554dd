use thiserror::Error;

use crate::llm_client::LlmError;

/// Pipeline-level error type.
///
/// Only fatal conditions live here. Recoverable conditions (empty retrieval,
/// empty candidate set, a candidate missing from the screening ranking) are
/// absorbed at the point of occurrence with documented fallback values and a
/// log line — they never cross a stage boundary as errors.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The generation provider returned output that does not parse into the
    /// requested schema (wrong shape, out-of-range score, missing field).
    /// Fatal to the enclosing stage; never retried.
    #[error("schema violation: {0}")]
    SchemaViolation(String),

    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),

    /// A document handed to ingestion is in a format we cannot read.
    /// Fatal: the orchestrator must not start a run over partial ingestion.
    #[error("unsupported input format: {0}")]
    UnsupportedInputFormat(String),

    #[error("validation error: {0}")]
    Validation(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("internal error: {0}")]
    Internal(#[from] anyhow::Error),
}
