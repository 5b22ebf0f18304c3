use async_trait::async_trait;

use super::types::ChatRequest;
use crate::core::errors::ApiError;

/// Seam over the language-generation and embedding services.
///
/// Both are network-bound, blocking (awaited) calls with no retry at this
/// layer; failures propagate as `ApiError` and are recovered at the
/// orchestrator boundary or at index build, depending on the caller.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// return the provider name (e.g. "openai-compat")
    fn name(&self) -> &str;

    /// check if the provider is healthy/reachable
    async fn health_check(&self) -> Result<bool, ApiError>;

    /// chat completion (non-streaming)
    async fn chat(&self, request: ChatRequest, model_id: &str) -> Result<String, ApiError>;

    /// generate embeddings, one vector per input
    async fn embed(&self, inputs: &[String], model_id: &str) -> Result<Vec<Vec<f32>>, ApiError>;
}
