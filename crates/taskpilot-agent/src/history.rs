// SPDX-FileCopyrightText: 2026 Taskpilot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Stateless conversation-history assembly.
//!
//! The server keeps no per-request session state; every request rebuilds the
//! model's context from persisted rows. An unknown or foreign conversation id
//! silently starts a fresh conversation rather than erroring, so ids never
//! leak across owners.

use std::sync::Arc;

use taskpilot_core::types::{ChatMessage, MessageRole};
use taskpilot_core::{StorageAdapter, TaskpilotError};
use tracing::debug;

/// Result of loading (or starting) a conversation.
#[derive(Debug, Clone)]
pub struct AssembledHistory {
    /// The conversation this request will append to. Freshly generated when
    /// the caller supplied no id or an id that does not resolve for them.
    pub conversation_id: String,
    /// Prior turns in provider format, oldest first.
    pub messages: Vec<ChatMessage>,
    /// Whether the conversation row already exists in storage.
    pub existed: bool,
}

/// Rebuilds provider-format history from persisted messages.
pub struct HistoryAssembler {
    storage: Arc<dyn StorageAdapter>,
    history_limit: i64,
}

impl HistoryAssembler {
    pub fn new(storage: Arc<dyn StorageAdapter>, history_limit: i64) -> Self {
        Self {
            storage,
            history_limit,
        }
    }

    /// Loads the owner's conversation history, or starts a new conversation.
    ///
    /// Tool-role rows are audit records and are skipped; the model sees only
    /// the user/assistant turns.
    pub async fn assemble(
        &self,
        owner_id: &str,
        conversation_id: Option<&str>,
    ) -> Result<AssembledHistory, TaskpilotError> {
        if let Some(id) = conversation_id
            && self.storage.get_conversation(owner_id, id).await?.is_some()
        {
            let rows = self
                .storage
                .messages_for_conversation(owner_id, id, Some(self.history_limit))
                .await?;

            let messages: Vec<ChatMessage> = rows
                .into_iter()
                .filter_map(|m| match m.role {
                    MessageRole::User => Some(ChatMessage::user_text(m.content)),
                    MessageRole::Assistant => Some(ChatMessage::assistant_text(m.content)),
                    MessageRole::Tool => None,
                })
                .collect();

            debug!(
                conversation_id = id,
                turns = messages.len(),
                "assembled existing conversation"
            );
            return Ok(AssembledHistory {
                conversation_id: id.to_string(),
                messages,
                existed: true,
            });
        }

        let fresh_id = uuid::Uuid::new_v4().to_string();
        debug!(conversation_id = %fresh_id, "starting new conversation");
        Ok(AssembledHistory {
            conversation_id: fresh_id,
            messages: Vec::new(),
            existed: false,
        })
    }
}
