//! Tool registry: named, schema-typed capabilities the orchestrator may
//! invoke instead of answering directly.
//!
//! Execution contract: a tool never raises past its boundary. The one-step
//! reasoning loop has no separate error channel, so every failure mode is
//! converted into a descriptive string result at dispatch.

pub mod orders;
pub mod search;

use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

pub use orders::{GetOrderTool, GetOrdersByPriorityTool};
pub use search::SearchProductsTool;

#[derive(Debug, Error)]
pub enum ToolError {
    /// Rejected before any upstream call; the message is corrective.
    #[error("{0}")]
    InvalidInput(String),
    /// Execution failed; the message describes what went wrong.
    #[error("{0}")]
    Execution(String),
}

#[async_trait]
pub trait Tool: Send + Sync {
    fn name(&self) -> &'static str;

    /// Natural-language description used for the routing decision.
    fn description(&self) -> &'static str;

    /// JSON schema of the tool's input, surfaced in the tool menu.
    fn input_schema(&self) -> Value;

    async fn execute(&self, args: &Value) -> Result<String, ToolError>;
}

/// One entry of the tool menu presented to the language model.
#[derive(Debug, Clone, Serialize)]
pub struct ToolMenuEntry {
    pub name: String,
    pub description: String,
    pub input_schema: Value,
}

/// Explicit, statically declared tool list, built once at assistant
/// construction. Dispatch is by stable name.
pub struct ToolRegistry {
    tools: Vec<Arc<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new(tools: Vec<Arc<dyn Tool>>) -> Self {
        Self { tools }
    }

    pub fn menu(&self) -> Vec<ToolMenuEntry> {
        self.tools
            .iter()
            .map(|tool| ToolMenuEntry {
                name: tool.name().to_string(),
                description: tool.description().to_string(),
                input_schema: tool.input_schema(),
            })
            .collect()
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.tools.iter().map(|tool| tool.name()).collect()
    }

    /// Execute a tool by name. Never fails: unknown names and tool errors
    /// all resolve to a descriptive string the model can be shown.
    pub async fn execute(&self, name: &str, args: &Value) -> String {
        let Some(tool) = self.tools.iter().find(|tool| tool.name() == name) else {
            return format!(
                "Unknown tool: {}. Available tools: {}",
                name,
                self.names().join(", ")
            );
        };

        match tool.execute(args).await {
            Ok(output) => output,
            Err(err) => {
                tracing::warn!("tool {} resolved to an error result: {}", name, err);
                err.to_string()
            }
        }
    }
}

/// Pull a string argument out of a directive's args, tolerating the key
/// variants models actually produce, plus a bare string payload.
pub(crate) fn string_arg(args: &Value, keys: &[&str]) -> Option<String> {
    if let Some(text) = args.as_str() {
        return Some(text.trim().to_string());
    }
    for key in keys {
        if let Some(value) = args.get(key) {
            if let Some(text) = value.as_str() {
                return Some(text.trim().to_string());
            }
            if value.is_number() {
                return Some(value.to_string());
            }
        }
    }
    None
}
