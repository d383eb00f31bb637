//! Query interpretation - raw request text into RawIntents
//!
//! Two interchangeable strategies behind one contract:
//!
//! - [`AiInterpreter`] - LLM structured output, higher quality
//! - [`HeuristicInterpreter`] - deterministic patterns, always available
//!
//! The state machine is deliberately simple: try the AI strategy at most
//! once when it is configured, and on any failure (timeout, malformed
//! output, capability disabled) fall through to the heuristic, which
//! never fails. No retries - resilience comes from the fallback, not
//! from retry loops.

mod ai;
mod heuristic;

use async_trait::async_trait;
use thiserror::Error;
use tracing::{debug, warn};

use crate::domain::{PlanRequest, RawIntent};

pub use ai::AiInterpreter;
pub use heuristic::HeuristicInterpreter;

/// Errors from query interpretation
///
/// These are always recovered by the heuristic fallback; callers of
/// [`interpret_with_fallback`] never see them.
#[derive(Debug, Error)]
pub enum InterpretError {
    #[error("LLM error: {0}")]
    Llm(#[from] crate::llm::LlmError),

    #[error("Malformed interpretation output: {0}")]
    Malformed(String),
}

/// Strategy contract: request text into raw intents
#[async_trait]
pub trait Interpreter: Send + Sync {
    async fn interpret(&self, request: &PlanRequest) -> Result<Vec<RawIntent>, InterpretError>;
}

/// Run the AI strategy when available, falling back to the heuristic
///
/// The heuristic is the terminal state and cannot fail.
pub async fn interpret_with_fallback(
    ai: Option<&AiInterpreter>,
    heuristic: &HeuristicInterpreter,
    request: &PlanRequest,
) -> Vec<RawIntent> {
    if let Some(ai) = ai {
        match ai.interpret(request).await {
            Ok(intents) => {
                debug!(count = intents.len(), "interpret_with_fallback: AI strategy succeeded");
                return intents;
            }
            Err(e) => {
                warn!(error = %e, "interpret_with_fallback: AI strategy failed, using heuristic");
            }
        }
    } else {
        debug!("interpret_with_fallback: no AI strategy configured");
    }

    heuristic.interpret_infallible(request)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::IntentSource;
    use crate::llm::client::mock::MockLlmClient;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_fallback_when_ai_absent() {
        let heuristic = HeuristicInterpreter::new();
        let request = PlanRequest::new("coffee in Soho at 10am", "nyc");

        let intents = interpret_with_fallback(None, &heuristic, &request).await;
        assert_eq!(intents.len(), 1);
        assert_eq!(intents[0].source, IntentSource::Fixed);
    }

    #[tokio::test]
    async fn test_fallback_when_ai_fails() {
        let llm = Arc::new(MockLlmClient::failing());
        let ai = AiInterpreter::new(llm);
        let heuristic = HeuristicInterpreter::new();
        let request = PlanRequest::new("museum visit", "nyc");

        let intents = interpret_with_fallback(Some(&ai), &heuristic, &request).await;
        // Heuristic result, not an error
        assert_eq!(intents.len(), 1);
        assert!(intents[0].activity.contains("museum"));
    }
}
