//! The structured generation seam.
//!
//! Stages never talk to the API client directly — they hold an
//! `Arc<dyn Generator>` injected at construction, so tests substitute a
//! deterministic stub. `generate_structured` layers the schema contract on
//! top: the raw JSON either parses into the requested type or the call
//! fails with a schema violation. No partial values, no guessing, no retry.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::errors::PipelineError;
use crate::llm_client::{LlmClient, LlmError};

/// A provider that turns a prompt into a JSON value. One round trip per
/// call, synchronous from the caller's point of view.
#[async_trait]
pub trait Generator: Send + Sync {
    async fn generate(&self, prompt: &str, system: &str) -> Result<Value, LlmError>;
}

#[async_trait]
impl Generator for LlmClient {
    async fn generate(&self, prompt: &str, system: &str) -> Result<Value, LlmError> {
        self.call_json(prompt, system).await
    }
}

/// Calls the generator and parses the result into `T`.
///
/// A response that does not conform to `T` (including range-checked fields
/// in the model layer) is a `SchemaViolation` — fatal to the enclosing
/// stage.
pub async fn generate_structured<T: DeserializeOwned>(
    generator: &dyn Generator,
    prompt: &str,
    system: &str,
) -> Result<T, PipelineError> {
    let value = generator.generate(prompt, system).await?;
    serde_json::from_value(value).map_err(|e| PipelineError::SchemaViolation(e.to_string()))
}
