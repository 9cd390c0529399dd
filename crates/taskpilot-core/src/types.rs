// SPDX-FileCopyrightText: 2026 Taskpilot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Domain types and the provider wire model.
//!
//! Timestamps are stored and exchanged as RFC 3339 strings; identifiers are
//! UUID v4 strings. Both match the TEXT columns in the storage layer.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Maximum task title length in characters.
pub const TITLE_MAX_LEN: usize = 500;
/// Maximum task description length in characters.
pub const DESCRIPTION_MAX_LEN: usize = 5000;
/// Maximum chat message content length in characters.
pub const MESSAGE_MAX_LEN: usize = 10_000;
/// Maximum conversation title length in characters.
pub const CONVERSATION_TITLE_MAX_LEN: usize = 255;

// --- Task entities ---

/// Lifecycle state of a task.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    #[default]
    ToDo,
    InProgress,
    Review,
    Done,
}

impl TaskStatus {
    /// True for the terminal `done` state.
    pub fn is_done(self) -> bool {
        matches!(self, TaskStatus::Done)
    }
}

/// Priority of a task.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum TaskPriority {
    Low,
    #[default]
    Medium,
    High,
    Urgent,
}

/// A single todo item, owned exclusively by one user.
///
/// Invariant: `completed_at` is non-null exactly when `status` is
/// [`TaskStatus::Done`]. Every mutation path maintains it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub owner_id: String,
    pub title: String,
    pub description: Option<String>,
    pub status: TaskStatus,
    pub priority: TaskPriority,
    pub created_at: String,
    pub updated_at: String,
    pub completed_at: Option<String>,
}

// --- Conversation entities ---

/// A chat session between one user and the assistant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conversation {
    pub id: String,
    pub owner_id: String,
    /// Auto-derived from the first user message; may be user-overridden later.
    pub title: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// Author of a persisted message.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum MessageRole {
    User,
    Assistant,
    Tool,
}

/// One immutable turn within a conversation.
///
/// `owner_id` is denormalized onto the message so isolation checks are a
/// single-column filter rather than a join.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub conversation_id: String,
    pub owner_id: String,
    pub role: MessageRole,
    pub content: String,
    /// JSON-serialized [`ToolInvocation`] list attached to assistant turns.
    pub tool_calls: Option<String>,
    pub created_at: String,
}

/// Record of one tool execution within a request cycle.
///
/// Ephemeral: built during the think/act loop, attached to the assistant
/// message as its audit trail, never stored in its own table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolInvocation {
    pub tool_name: String,
    pub parameters: serde_json::Value,
    pub result: serde_json::Value,
}

// --- Provider wire model ---

/// Role of a message sent to the inference provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChatRole {
    User,
    Assistant,
}

/// One content part within a provider-bound message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentPart {
    Text {
        text: String,
    },
    ToolUse {
        id: String,
        name: String,
        input: serde_json::Value,
    },
    ToolResult {
        tool_use_id: String,
        content: String,
        is_error: bool,
    },
}

/// A message in the provider conversation format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub parts: Vec<ContentPart>,
}

impl ChatMessage {
    /// A plain-text user message.
    pub fn user_text(text: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            parts: vec![ContentPart::Text { text: text.into() }],
        }
    }

    /// A plain-text assistant message.
    pub fn assistant_text(text: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            parts: vec![ContentPart::Text { text: text.into() }],
        }
    }
}

/// Declaration of one callable tool, in the shape providers expect.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolSpec {
    pub name: String,
    pub description: String,
    pub input_schema: serde_json::Value,
}

/// A completion request handed to a [`crate::ProviderAdapter`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderRequest {
    /// Fixed system persona, defined once per deployment.
    pub system: String,
    /// Ordered history plus the turn under construction.
    pub messages: Vec<ChatMessage>,
    /// Tools the model may request.
    pub tools: Vec<ToolSpec>,
    pub model: String,
    pub max_tokens: u32,
}

/// One block of assistant output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AssistantBlock {
    Text {
        text: String,
    },
    ToolUse {
        id: String,
        name: String,
        input: serde_json::Value,
    },
}

/// Why the model stopped generating.
///
/// The orchestrator's loop is an exhaustive match over this tag rather than
/// duck-typing on response shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    /// Final natural-language reply; the turn is over.
    EndTurn,
    /// The model is requesting one or more tool executions.
    ToolUse,
    /// Output was truncated by the token limit.
    MaxTokens,
}

/// A full response from the inference provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderResponse {
    pub blocks: Vec<AssistantBlock>,
    pub stop_reason: StopReason,
}

impl ProviderResponse {
    /// Concatenated text of all text blocks.
    pub fn text(&self) -> String {
        self.blocks
            .iter()
            .filter_map(|b| match b {
                AssistantBlock::Text { text } => Some(text.as_str()),
                AssistantBlock::ToolUse { .. } => None,
            })
            .collect::<Vec<_>>()
            .join("")
    }

    /// All tool-use blocks, in the order the model emitted them.
    pub fn tool_uses(&self) -> Vec<(&str, &str, &serde_json::Value)> {
        self.blocks
            .iter()
            .filter_map(|b| match b {
                AssistantBlock::ToolUse { id, name, input } => {
                    Some((id.as_str(), name.as_str(), input))
                }
                AssistantBlock::Text { .. } => None,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_round_trips_as_snake_case() {
        assert_eq!(TaskStatus::InProgress.to_string(), "in_progress");
        assert_eq!("to_do".parse::<TaskStatus>().unwrap(), TaskStatus::ToDo);
        assert_eq!("done".parse::<TaskStatus>().unwrap(), TaskStatus::Done);
        assert!("finished".parse::<TaskStatus>().is_err());
    }

    #[test]
    fn priority_defaults_to_medium() {
        assert_eq!(TaskPriority::default(), TaskPriority::Medium);
        assert_eq!(TaskStatus::default(), TaskStatus::ToDo);
    }

    #[test]
    fn role_round_trips() {
        assert_eq!(MessageRole::Assistant.to_string(), "assistant");
        assert_eq!("tool".parse::<MessageRole>().unwrap(), MessageRole::Tool);
    }

    #[test]
    fn response_splits_text_and_tool_uses() {
        let resp = ProviderResponse {
            blocks: vec![
                AssistantBlock::Text {
                    text: "Adding it now. ".into(),
                },
                AssistantBlock::ToolUse {
                    id: "tu_1".into(),
                    name: "add_task".into(),
                    input: serde_json::json!({"title": "buy milk"}),
                },
            ],
            stop_reason: StopReason::ToolUse,
        };
        assert_eq!(resp.text(), "Adding it now. ");
        let uses = resp.tool_uses();
        assert_eq!(uses.len(), 1);
        assert_eq!(uses[0].1, "add_task");
    }
}
