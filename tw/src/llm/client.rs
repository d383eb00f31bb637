//! LlmClient trait definition

use async_trait::async_trait;

use super::{CompletionRequest, CompletionResponse, LlmError};

/// Stateless LLM client - each call is independent
///
/// The pipeline makes at most one completion call per concern (query
/// interpretation, search enhancement) and falls back to deterministic
/// logic on any failure, so no conversation state is kept.
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Send a single completion request, blocking until complete
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError>;
}
