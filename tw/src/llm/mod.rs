//! LLM capability for query interpretation and search-query enhancement
//!
//! The pipeline never depends on the LLM for correctness, only quality:
//! every caller has a deterministic fallback when completion fails.

use std::sync::Arc;

use tracing::debug;

mod anthropic;
pub mod client;
mod error;
mod types;

pub use anthropic::AnthropicClient;
pub use client::LlmClient;
pub use error::LlmError;
pub use types::{CompletionRequest, CompletionResponse, Message, Role, TokenUsage, ToolCall, ToolDefinition};

use crate::config::LlmConfig;

/// Create an LLM client for the provider named in config
///
/// Currently only "anthropic" is supported. Returns None when the LLM
/// capability is disabled in config.
pub fn create_client(config: &LlmConfig) -> Result<Option<Arc<dyn LlmClient>>, LlmError> {
    if !config.enabled {
        debug!("create_client: LLM disabled in config");
        return Ok(None);
    }

    debug!(provider = %config.provider, model = %config.model, "create_client: called");
    match config.provider.as_str() {
        "anthropic" => Ok(Some(Arc::new(AnthropicClient::from_config(config)?))),
        other => Err(LlmError::InvalidResponse(format!(
            "Unknown LLM provider: '{}'. Supported: anthropic",
            other
        ))),
    }
}

/// Rewrite a venue search query for better recall
///
/// Returns None on any failure; callers use the original query unchanged.
pub async fn enhance_search_query(llm: &Arc<dyn LlmClient>, query: &str) -> Option<String> {
    debug!(%query, "enhance_search_query: called");

    let system_prompt = "Rewrite this place-search query to be more effective. \
                         Keep the same location and activity. \
                         Output ONLY the rewritten query, nothing else.";

    let request = CompletionRequest {
        system_prompt: system_prompt.to_string(),
        messages: vec![Message::user(query.to_string())],
        tools: vec![],
        max_tokens: 100,
    };

    match llm.complete(request).await {
        Ok(response) => {
            let rewritten = response.content.map(|t| t.trim().to_string()).filter(|t| !t.is_empty());
            debug!(?rewritten, "enhance_search_query: done");
            rewritten
        }
        Err(e) => {
            debug!(error = %e, "enhance_search_query: LLM call failed");
            None
        }
    }
}
