//! AI-assisted interpretation strategy
//!
//! Asks the LLM for structured output via a forced tool call carrying
//! two candidate lists: "fixed" entries with explicit user-stated times
//! and "flexible" entries to be scheduled. Any malformed or missing
//! response is a failure, never a partial result - the caller falls
//! back to the heuristic strategy.

use std::sync::Arc;

use serde::Deserialize;
use tracing::debug;

use super::{InterpretError, Interpreter};
use crate::domain::{IntentSource, PlanRequest, RawIntent};
use crate::llm::{CompletionRequest, LlmClient, Message, ToolDefinition};

const INTERPRET_TOOL: &str = "submit_interpretation";

const SYSTEM_PROMPT: &str = "You interpret a free-text description of a day's plans into structured \
     activities. Split the request into entries with an explicit stated time \
     (fixed) and entries without one (flexible). Keep activity descriptions \
     short. Report locations exactly as the user phrased them. Call \
     submit_interpretation exactly once with every activity you find.";

/// One entry in the structured interpretation output
///
/// `venue_preference` is a single optional field; preference hints from
/// anywhere in the user's phrasing land here.
#[derive(Debug, Deserialize)]
struct IntentEntry {
    activity: String,
    location: Option<String>,
    time: Option<String>,
    venue_preference: Option<String>,
    #[serde(default)]
    keywords: Vec<String>,
}

/// Full structured interpretation output
#[derive(Debug, Deserialize)]
struct Interpretation {
    #[serde(default)]
    fixed: Vec<IntentEntry>,
    #[serde(default)]
    flexible: Vec<IntentEntry>,
}

/// LLM-backed interpretation strategy
pub struct AiInterpreter {
    llm: Arc<dyn LlmClient>,
}

impl AiInterpreter {
    pub fn new(llm: Arc<dyn LlmClient>) -> Self {
        Self { llm }
    }

    fn build_tool() -> ToolDefinition {
        let entry_schema = serde_json::json!({
            "type": "object",
            "properties": {
                "activity": {
                    "type": "string",
                    "description": "Short activity description, e.g. 'coffee'"
                },
                "location": {
                    "type": "string",
                    "description": "Location exactly as the user phrased it"
                },
                "time": {
                    "type": "string",
                    "description": "Time phrase as stated, e.g. '10am', 'around noon'"
                },
                "venue_preference": {
                    "type": "string",
                    "description": "Venue preference hint, e.g. 'somewhere quiet'"
                },
                "keywords": {
                    "type": "array",
                    "items": { "type": "string" },
                    "description": "Extra search keywords"
                }
            },
            "required": ["activity"]
        });

        ToolDefinition::new(
            INTERPRET_TOOL,
            "Submit the interpreted activities. Call this once with all entries.",
            serde_json::json!({
                "type": "object",
                "properties": {
                    "fixed": {
                        "type": "array",
                        "items": entry_schema,
                        "description": "Activities with an explicit user-stated time"
                    },
                    "flexible": {
                        "type": "array",
                        "items": entry_schema,
                        "description": "Activities without a stated time"
                    }
                },
                "required": ["fixed", "flexible"]
            }),
        )
    }

    fn build_user_message(request: &PlanRequest) -> String {
        let mut message = format!("Plans for a day in {}:\n{}", request.city, request.query);
        if let Some(date) = request.date {
            message.push_str(&format!("\nDate: {date}"));
        }
        if let Some(start) = &request.start_time {
            message.push_str(&format!("\nPreferred start time: {start}"));
        }
        message
    }

    fn convert(entry: IntentEntry, source: IntentSource) -> RawIntent {
        RawIntent {
            location: entry.location.filter(|l| !l.trim().is_empty()),
            activity: entry.activity,
            time_text: entry.time.filter(|t| !t.trim().is_empty()),
            venue_preference: entry.venue_preference.filter(|p| !p.trim().is_empty()),
            keywords: entry.keywords,
            source,
        }
    }
}

#[async_trait::async_trait]
impl Interpreter for AiInterpreter {
    async fn interpret(&self, request: &PlanRequest) -> Result<Vec<RawIntent>, InterpretError> {
        debug!(query = %request.query, "interpret: called");

        let completion = CompletionRequest {
            system_prompt: SYSTEM_PROMPT.to_string(),
            messages: vec![Message::user(Self::build_user_message(request))],
            tools: vec![Self::build_tool()],
            max_tokens: 2048,
        };

        let response = self.llm.complete(completion).await?;

        let input = response
            .tool_input(INTERPRET_TOOL)
            .ok_or_else(|| InterpretError::Malformed("No submit_interpretation tool call".to_string()))?;

        let parsed: Interpretation = serde_json::from_value(input.clone())
            .map_err(|e| InterpretError::Malformed(format!("Bad interpretation payload: {e}")))?;

        if parsed.fixed.is_empty() && parsed.flexible.is_empty() {
            return Err(InterpretError::Malformed("Interpretation produced zero entries".to_string()));
        }

        // Fixed entries first: downstream deduplication is first-write-wins
        let mut intents: Vec<RawIntent> = parsed
            .fixed
            .into_iter()
            .map(|e| Self::convert(e, IntentSource::Fixed))
            .collect();
        intents.extend(parsed.flexible.into_iter().map(|e| Self::convert(e, IntentSource::Flexible)));

        debug!(count = intents.len(), "interpret: parsed intents");
        Ok(intents)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::client::mock::MockLlmClient;
    use crate::llm::{CompletionResponse, TokenUsage, ToolCall};

    fn tool_response(input: serde_json::Value) -> CompletionResponse {
        CompletionResponse {
            content: None,
            tool_calls: vec![ToolCall {
                id: "t1".to_string(),
                name: INTERPRET_TOOL.to_string(),
                input,
            }],
            usage: TokenUsage::default(),
        }
    }

    #[tokio::test]
    async fn test_parses_fixed_and_flexible() {
        let input = serde_json::json!({
            "fixed": [
                {"activity": "coffee", "location": "Soho", "time": "10am"}
            ],
            "flexible": [
                {"activity": "browse a bookshop", "venue_preference": "independent"}
            ]
        });
        let llm = Arc::new(MockLlmClient::new(vec![Ok(tool_response(input))]));
        let interpreter = AiInterpreter::new(llm);

        let intents = interpreter
            .interpret(&PlanRequest::new("coffee in Soho at 10am, then a bookshop", "nyc"))
            .await
            .unwrap();

        assert_eq!(intents.len(), 2);
        assert_eq!(intents[0].source, IntentSource::Fixed);
        assert_eq!(intents[0].time_text.as_deref(), Some("10am"));
        assert_eq!(intents[1].source, IntentSource::Flexible);
        assert_eq!(intents[1].venue_preference.as_deref(), Some("independent"));
    }

    #[tokio::test]
    async fn test_fixed_entries_come_first() {
        let input = serde_json::json!({
            "fixed": [{"activity": "lunch", "time": "1pm"}],
            "flexible": [{"activity": "walk"}]
        });
        let llm = Arc::new(MockLlmClient::new(vec![Ok(tool_response(input))]));
        let intents = AiInterpreter::new(llm)
            .interpret(&PlanRequest::new("q", "nyc"))
            .await
            .unwrap();

        assert_eq!(intents[0].source, IntentSource::Fixed);
        assert_eq!(intents[1].source, IntentSource::Flexible);
    }

    #[tokio::test]
    async fn test_missing_tool_call_is_error() {
        let response = CompletionResponse {
            content: Some("I couldn't parse that".to_string()),
            tool_calls: vec![],
            usage: TokenUsage::default(),
        };
        let llm = Arc::new(MockLlmClient::new(vec![Ok(response)]));

        let result = AiInterpreter::new(llm).interpret(&PlanRequest::new("q", "nyc")).await;
        assert!(matches!(result, Err(InterpretError::Malformed(_))));
    }

    #[tokio::test]
    async fn test_zero_entries_is_error_not_partial() {
        let input = serde_json::json!({"fixed": [], "flexible": []});
        let llm = Arc::new(MockLlmClient::new(vec![Ok(tool_response(input))]));

        let result = AiInterpreter::new(llm).interpret(&PlanRequest::new("q", "nyc")).await;
        assert!(matches!(result, Err(InterpretError::Malformed(_))));
    }

    #[tokio::test]
    async fn test_llm_error_propagates() {
        let llm = Arc::new(MockLlmClient::failing());
        let result = AiInterpreter::new(llm).interpret(&PlanRequest::new("q", "nyc")).await;
        assert!(matches!(result, Err(InterpretError::Llm(_))));
    }
}
