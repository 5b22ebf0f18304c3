//! Conversation state: an append-only, session-owned sequence of turns.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::llm::ChatMessage;

/// One turn of dialogue. Order is semantically significant; the sequence
/// defines the history presented to the language model.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ConversationTurn {
    System {
        text: String,
        at: DateTime<Utc>,
    },
    User {
        text: String,
        at: DateTime<Utc>,
    },
    Assistant {
        text: String,
        at: DateTime<Utc>,
    },
    ToolResult {
        tool: String,
        text: String,
        at: DateTime<Utc>,
    },
}

/// Append-only transcript. The first turn is always the `System` turn
/// carrying the behavioral instructions; it is only removed by `reset`,
/// which clears the whole sequence and re-seeds it.
#[derive(Debug, Clone)]
pub struct Transcript {
    system_prompt: String,
    turns: Vec<ConversationTurn>,
}

impl Transcript {
    pub fn new(system_prompt: String) -> Self {
        let mut transcript = Self {
            system_prompt,
            turns: Vec::new(),
        };
        transcript.seed_system_turn();
        transcript
    }

    fn seed_system_turn(&mut self) {
        self.turns.push(ConversationTurn::System {
            text: self.system_prompt.clone(),
            at: Utc::now(),
        });
    }

    pub fn push_user(&mut self, text: impl Into<String>) {
        self.turns.push(ConversationTurn::User {
            text: text.into(),
            at: Utc::now(),
        });
    }

    pub fn push_assistant(&mut self, text: impl Into<String>) {
        self.turns.push(ConversationTurn::Assistant {
            text: text.into(),
            at: Utc::now(),
        });
    }

    pub fn push_tool_result(&mut self, tool: impl Into<String>, text: impl Into<String>) {
        self.turns.push(ConversationTurn::ToolResult {
            tool: tool.into(),
            text: text.into(),
            at: Utc::now(),
        });
    }

    /// Clear everything and re-seed the system turn. Idempotent.
    pub fn reset(&mut self) {
        self.turns.clear();
        self.seed_system_turn();
    }

    pub fn turns(&self) -> &[ConversationTurn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// The transcript as chat messages for the language model. Tool results
    /// are presented as system messages so the model can phrase them without
    /// mistaking them for user input.
    pub fn to_chat_messages(&self) -> Vec<ChatMessage> {
        self.turns
            .iter()
            .map(|turn| match turn {
                ConversationTurn::System { text, .. } => ChatMessage::system(text.clone()),
                ConversationTurn::User { text, .. } => ChatMessage::user(text.clone()),
                ConversationTurn::Assistant { text, .. } => ChatMessage::assistant(text.clone()),
                ConversationTurn::ToolResult { tool, text, .. } => {
                    ChatMessage::system(format!("Tool `{}` result:\n{}", tool, text))
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_turn_is_always_the_system_turn() {
        let transcript = Transcript::new("instructions".to_string());
        assert_eq!(transcript.len(), 1);
        assert!(matches!(
            transcript.turns()[0],
            ConversationTurn::System { .. }
        ));
    }

    #[test]
    fn reset_clears_to_exactly_one_system_turn() {
        let mut transcript = Transcript::new("instructions".to_string());
        transcript.push_user("hi");
        transcript.push_assistant("hello");
        transcript.push_tool_result("search_products", "Products found: ...");
        assert_eq!(transcript.len(), 4);

        transcript.reset();
        assert_eq!(transcript.len(), 1);
        assert!(matches!(
            transcript.turns()[0],
            ConversationTurn::System { .. }
        ));
    }

    #[test]
    fn reset_is_idempotent() {
        let mut transcript = Transcript::new("instructions".to_string());
        transcript.push_user("hi");
        transcript.reset();
        transcript.reset();
        assert_eq!(transcript.len(), 1);
    }

    #[test]
    fn chat_messages_preserve_order_and_roles() {
        let mut transcript = Transcript::new("sys".to_string());
        transcript.push_user("question");
        transcript.push_tool_result("get_order", "Order details: ...");
        transcript.push_assistant("answer");

        let messages = transcript.to_chat_messages();
        assert_eq!(messages.len(), 4);
        assert_eq!(messages[0].role, "system");
        assert_eq!(messages[1].role, "user");
        assert_eq!(messages[2].role, "system");
        assert!(messages[2].content.contains("get_order"));
        assert_eq!(messages[3].role, "assistant");
    }

    #[test]
    fn timestamps_are_monotone_non_decreasing() {
        let mut transcript = Transcript::new("sys".to_string());
        for i in 0..5 {
            transcript.push_user(format!("turn {}", i));
        }
        let stamps: Vec<_> = transcript
            .turns()
            .iter()
            .map(|turn| match turn {
                ConversationTurn::System { at, .. }
                | ConversationTurn::User { at, .. }
                | ConversationTurn::Assistant { at, .. }
                | ConversationTurn::ToolResult { at, .. } => *at,
            })
            .collect();
        assert!(stamps.windows(2).all(|pair| pair[0] <= pair[1]));
    }
}
