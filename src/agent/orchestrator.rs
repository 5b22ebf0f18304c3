//! The reasoning loop: decide whether to answer directly or invoke a tool,
//! execute at most one tool per utterance, and fold the result back into a
//! reply.

use std::sync::Arc;

use serde_json::Value;

use super::instructions::build_system_prompt;
use super::transcript::Transcript;
use crate::core::errors::ApiError;
use crate::llm::{ChatRequest, LlmProvider};
use crate::tools::ToolRegistry;

enum Decision {
    Final(String),
    ToolCall { name: String, args: Value },
}

/// One assistant session. Owns its transcript exclusively; callers must not
/// process more than one utterance at a time.
pub struct Orchestrator {
    llm: Arc<dyn LlmProvider>,
    registry: Arc<ToolRegistry>,
    transcript: Transcript,
    chat_model: String,
    temperature: Option<f64>,
}

impl Orchestrator {
    pub fn new(
        llm: Arc<dyn LlmProvider>,
        registry: Arc<ToolRegistry>,
        chat_model: String,
        temperature: Option<f64>,
    ) -> Self {
        let system_prompt = build_system_prompt(&registry.menu());
        Self {
            llm,
            registry,
            transcript: Transcript::new(system_prompt),
            chat_model,
            temperature,
        }
    }

    /// Resolve one user utterance to a reply.
    ///
    /// Every failure inside the turn is caught here: the session never ends
    /// on an error, and the transcript always records what the user was
    /// shown.
    pub async fn handle(&mut self, utterance: &str) -> String {
        self.transcript.push_user(utterance);

        let reply = match self.run_turn().await {
            Ok(text) => text,
            Err(err) => {
                tracing::error!("turn failed: {}", err);
                format!("Sorry, there was an error processing your request: {}", err)
            }
        };

        self.transcript.push_assistant(reply.clone());
        reply
    }

    async fn run_turn(&mut self) -> Result<String, ApiError> {
        let response = self.consult().await?;

        match parse_decision(&response) {
            Decision::Final(text) => Ok(text),
            Decision::ToolCall { name, args } => {
                tracing::info!("invoking tool {}", name);
                let output = self.registry.execute(&name, &args).await;
                self.transcript.push_tool_result(&name, &output);

                // One re-consultation so the tool output is phrased for the
                // user. A second tool request at this point is protocol
                // noise; fall back to the tool's own text.
                let followup = self.consult().await?;
                match parse_decision(&followup) {
                    Decision::Final(text) if !text.trim().is_empty() => Ok(text),
                    _ => Ok(output),
                }
            }
        }
    }

    async fn consult(&self) -> Result<String, ApiError> {
        let request = ChatRequest::new(self.transcript.to_chat_messages())
            .with_temperature(self.temperature);
        self.llm.chat(request, &self.chat_model).await
    }

    /// Clear the transcript back to only the system turn. Idempotent; does
    /// not touch the shared catalog index.
    pub fn reset(&mut self) {
        self.transcript.reset();
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }
}

fn parse_decision(text: &str) -> Decision {
    if let Some(value) = parse_json_from_text(text) {
        if let Some(decision) = decision_from_value(&value) {
            return decision;
        }
    }
    Decision::Final(text.trim().to_string())
}

fn decision_from_value(value: &Value) -> Option<Decision> {
    let action = value
        .get("type")
        .or_else(|| value.get("action"))
        .and_then(|v| v.as_str())
        .unwrap_or("");

    if action == "tool_call" {
        let name = value
            .get("tool_name")
            .or_else(|| value.get("name"))
            .or_else(|| value.get("tool"))
            .and_then(|v| v.as_str())?;
        let args = value
            .get("tool_args")
            .or_else(|| value.get("args"))
            .cloned()
            .unwrap_or_else(|| Value::Object(serde_json::Map::new()));
        return Some(Decision::ToolCall {
            name: name.to_string(),
            args,
        });
    }

    if action == "final" {
        let content = value
            .get("content")
            .and_then(|v| v.as_str())
            .unwrap_or("")
            .to_string();
        return Some(Decision::Final(content));
    }

    None
}

fn parse_json_from_text(text: &str) -> Option<Value> {
    let trimmed = text.trim();
    if let Ok(value) = serde_json::from_str::<Value>(trimmed) {
        return Some(value);
    }

    let start = trimmed.find('{')?;
    let end = trimmed.rfind('}')?;
    if end <= start {
        return None;
    }
    serde_json::from_str::<Value>(&trimmed[start..=end]).ok()
}
