// SPDX-FileCopyrightText: 2026 Taskpilot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The think/act loop.
//!
//! One request cycle alternates between provider completions ("think") and
//! tool dispatches ("act") until the model ends its turn or the iteration
//! bound is hit. Tool failures are fed back to the model as error results,
//! never surfaced as transport errors.

use std::sync::Arc;

use taskpilot_core::types::{
    AssistantBlock, ChatMessage, ChatRole, ContentPart, ProviderRequest, StopReason,
    ToolInvocation,
};
use taskpilot_core::{ProviderAdapter, TaskpilotError};
use taskpilot_tools::ToolDispatcher;
use tracing::{debug, info, warn};

/// Reply used when the model ends its turn with an empty message after a
/// tool failure.
const FAILURE_FALLBACK_REPLY: &str =
    "Sorry, I ran into a problem completing that. Could you try again?";

/// Reply used when the iteration bound is exhausted before the model ends
/// its turn.
const LOOP_LIMIT_REPLY: &str =
    "I wasn't able to finish that request. Could you break it into smaller steps?";

/// Reply used when the model ends its turn with no text and no tool failed.
const EMPTY_REPLY_FALLBACK: &str =
    "I don't have a response for that. Could you rephrase your request?";

/// Outcome of one full request cycle.
#[derive(Debug, Clone)]
pub struct AgentOutcome {
    /// Final natural-language reply for the user.
    pub reply: String,
    /// Every tool execution performed during the cycle, in order.
    pub invocations: Vec<ToolInvocation>,
}

/// Drives the think/act loop for one request at a time.
///
/// Holds no per-conversation state; callers pass the assembled history in
/// and persist the outcome themselves.
pub struct AgentOrchestrator {
    provider: Arc<dyn ProviderAdapter>,
    dispatcher: Arc<ToolDispatcher>,
    system_prompt: String,
    model: String,
    max_tokens: u32,
    max_tool_iterations: u32,
}

impl AgentOrchestrator {
    pub fn new(
        provider: Arc<dyn ProviderAdapter>,
        dispatcher: Arc<ToolDispatcher>,
        system_prompt: String,
        model: String,
        max_tokens: u32,
        max_tool_iterations: u32,
    ) -> Self {
        Self {
            provider,
            dispatcher,
            system_prompt,
            model,
            max_tokens,
            max_tool_iterations,
        }
    }

    /// Runs one request cycle for `owner_id`.
    ///
    /// `history` is the prior conversation (oldest first); `user_message` is
    /// the new turn. Returns the final reply plus the audit trail of tool
    /// invocations.
    pub async fn run(
        &self,
        owner_id: &str,
        history: Vec<ChatMessage>,
        user_message: &str,
    ) -> Result<AgentOutcome, TaskpilotError> {
        let mut messages = history;
        messages.push(ChatMessage::user_text(user_message));

        let mut invocations: Vec<ToolInvocation> = Vec::new();
        let mut had_tool_error = false;

        for iteration in 0..self.max_tool_iterations {
            let request = ProviderRequest {
                system: self.system_prompt.clone(),
                messages: messages.clone(),
                tools: self.dispatcher.specs(),
                model: self.model.clone(),
                max_tokens: self.max_tokens,
            };

            let response = self.provider.complete(request).await?;
            debug!(iteration, stop_reason = ?response.stop_reason, "provider turn complete");

            match response.stop_reason {
                StopReason::EndTurn => {
                    let reply = final_reply(response.text(), had_tool_error);
                    info!(
                        iterations = iteration + 1,
                        tool_calls = invocations.len(),
                        "request cycle complete"
                    );
                    return Ok(AgentOutcome {
                        reply,
                        invocations,
                    });
                }
                StopReason::MaxTokens => {
                    // Truncated output is still the model's best answer.
                    warn!(iteration, "response truncated by token limit");
                    let reply = final_reply(response.text(), had_tool_error);
                    return Ok(AgentOutcome {
                        reply,
                        invocations,
                    });
                }
                StopReason::ToolUse => {
                    let tool_uses: Vec<(String, String, serde_json::Value)> = response
                        .tool_uses()
                        .into_iter()
                        .map(|(id, name, input)| {
                            (id.to_string(), name.to_string(), input.clone())
                        })
                        .collect();

                    // Echo the assistant turn back verbatim, then answer every
                    // tool_use block with a matching result part.
                    messages.push(ChatMessage {
                        role: ChatRole::Assistant,
                        parts: response
                            .blocks
                            .iter()
                            .map(|b| match b {
                                AssistantBlock::Text { text } => {
                                    ContentPart::Text { text: text.clone() }
                                }
                                AssistantBlock::ToolUse { id, name, input } => {
                                    ContentPart::ToolUse {
                                        id: id.clone(),
                                        name: name.clone(),
                                        input: input.clone(),
                                    }
                                }
                            })
                            .collect(),
                    });

                    let mut result_parts: Vec<ContentPart> = Vec::new();
                    for (id, name, input) in tool_uses {
                        let output = self.dispatcher.dispatch(owner_id, &name, input.clone()).await;
                        if output.is_error {
                            had_tool_error = true;
                        }
                        invocations.push(ToolInvocation {
                            tool_name: name,
                            parameters: input,
                            result: output.content.clone(),
                        });
                        result_parts.push(ContentPart::ToolResult {
                            tool_use_id: id,
                            content: output.content.to_string(),
                            is_error: output.is_error,
                        });
                    }
                    messages.push(ChatMessage {
                        role: ChatRole::User,
                        parts: result_parts,
                    });
                }
            }
        }

        warn!(
            bound = self.max_tool_iterations,
            tool_calls = invocations.len(),
            "iteration bound exhausted"
        );
        Ok(AgentOutcome {
            reply: LOOP_LIMIT_REPLY.to_string(),
            invocations,
        })
    }
}

/// Substitutes a fallback when the model produced no visible text.
fn final_reply(text: String, had_tool_error: bool) -> String {
    let trimmed = text.trim();
    if !trimmed.is_empty() {
        return text;
    }
    if had_tool_error {
        FAILURE_FALLBACK_REPLY.to_string()
    } else {
        EMPTY_REPLY_FALLBACK.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use taskpilot_config::model::StorageConfig;
    use taskpilot_core::types::ProviderResponse;
    use taskpilot_core::StorageAdapter;
    use taskpilot_storage::SqliteStorage;

    /// Provider that replays a fixed script of responses.
    struct ScriptedProvider {
        script: Mutex<VecDeque<ProviderResponse>>,
        requests: Mutex<Vec<ProviderRequest>>,
    }

    impl ScriptedProvider {
        fn new(responses: Vec<ProviderResponse>) -> Self {
            Self {
                script: Mutex::new(responses.into()),
                requests: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl ProviderAdapter for ScriptedProvider {
        async fn complete(
            &self,
            request: ProviderRequest,
        ) -> Result<ProviderResponse, TaskpilotError> {
            self.requests.lock().unwrap().push(request);
            self.script
                .lock()
                .unwrap()
                .pop_front()
                .ok_or_else(|| TaskpilotError::Internal("script exhausted".into()))
        }
    }

    fn text_response(text: &str) -> ProviderResponse {
        ProviderResponse {
            blocks: vec![AssistantBlock::Text { text: text.into() }],
            stop_reason: StopReason::EndTurn,
        }
    }

    fn tool_use_response(name: &str, input: serde_json::Value) -> ProviderResponse {
        ProviderResponse {
            blocks: vec![AssistantBlock::ToolUse {
                id: format!("tu_{name}"),
                name: name.into(),
                input,
            }],
            stop_reason: StopReason::ToolUse,
        }
    }

    async fn orchestrator(
        responses: Vec<ProviderResponse>,
        max_iterations: u32,
    ) -> (
        AgentOrchestrator,
        Arc<ScriptedProvider>,
        Arc<dyn StorageAdapter>,
        tempfile::TempDir,
    ) {
        let dir = tempfile::tempdir().unwrap();
        let config = StorageConfig {
            database_path: dir.path().join("agent.db").display().to_string(),
        };
        let storage = SqliteStorage::new(config);
        storage.initialize().await.unwrap();
        let storage: Arc<dyn StorageAdapter> = Arc::new(storage);

        let provider = Arc::new(ScriptedProvider::new(responses));
        let orchestrator = AgentOrchestrator::new(
            provider.clone(),
            Arc::new(ToolDispatcher::with_task_tools(storage.clone())),
            "Test persona.".into(),
            "test-model".into(),
            256,
            max_iterations,
        );
        (orchestrator, provider, storage, dir)
    }

    #[tokio::test]
    async fn plain_reply_without_tools() {
        let (orchestrator, provider, _storage, _dir) =
            orchestrator(vec![text_response("Hello! How can I help?")], 5).await;

        let outcome = orchestrator.run("u1", vec![], "hi").await.unwrap();
        assert_eq!(outcome.reply, "Hello! How can I help?");
        assert!(outcome.invocations.is_empty());

        // The request carried the persona, the user turn, and the tool schema.
        let requests = provider.requests.lock().unwrap();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].system, "Test persona.");
        assert_eq!(requests[0].tools.len(), 5);
        assert_eq!(requests[0].messages.len(), 1);
    }

    #[tokio::test]
    async fn tool_use_cycle_creates_task_and_records_invocation() {
        let (orchestrator, provider, storage, _dir) = orchestrator(
            vec![
                tool_use_response("add_task", serde_json::json!({"title": "buy milk"})),
                text_response("Done! I've added 'buy milk' to your list."),
            ],
            5,
        )
        .await;

        let outcome = orchestrator.run("u1", vec![], "add milk").await.unwrap();
        assert!(outcome.reply.contains("buy milk"));
        assert_eq!(outcome.invocations.len(), 1);
        assert_eq!(outcome.invocations[0].tool_name, "add_task");
        assert_eq!(outcome.invocations[0].result["success"], true);

        // The task really exists, under the right owner.
        let tasks = storage.list_tasks("u1", None).await.unwrap();
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].title, "buy milk");

        // Second provider call saw the assistant turn and the tool result.
        let requests = provider.requests.lock().unwrap();
        assert_eq!(requests.len(), 2);
        let second = &requests[1];
        assert_eq!(second.messages.len(), 3);
        assert!(matches!(
            second.messages[2].parts[0],
            ContentPart::ToolResult { is_error: false, .. }
        ));
    }

    #[tokio::test]
    async fn failed_tool_is_fed_back_as_error_result() {
        let (orchestrator, provider, _storage, _dir) = orchestrator(
            vec![
                tool_use_response("complete_task", serde_json::json!({"task_id": "missing"})),
                text_response("I couldn't find that task in your list."),
            ],
            5,
        )
        .await;

        let outcome = orchestrator.run("u1", vec![], "finish it").await.unwrap();
        assert!(outcome.reply.contains("couldn't find"));
        assert_eq!(outcome.invocations[0].result["code"], "NOT_FOUND");

        let requests = provider.requests.lock().unwrap();
        assert!(matches!(
            requests[1].messages[2].parts[0],
            ContentPart::ToolResult { is_error: true, .. }
        ));
    }

    #[tokio::test]
    async fn empty_reply_after_tool_error_gets_fallback() {
        let (orchestrator, _provider, _storage, _dir) = orchestrator(
            vec![
                tool_use_response("delete_task", serde_json::json!({"task_id": "missing"})),
                text_response(""),
            ],
            5,
        )
        .await;

        let outcome = orchestrator.run("u1", vec![], "delete it").await.unwrap();
        assert_eq!(outcome.reply, FAILURE_FALLBACK_REPLY);
    }

    #[tokio::test]
    async fn empty_reply_without_tool_error_gets_neutral_fallback() {
        let (orchestrator, _provider, _storage, _dir) =
            orchestrator(vec![text_response("   ")], 5).await;

        let outcome = orchestrator.run("u1", vec![], "hm").await.unwrap();
        assert_eq!(outcome.reply, EMPTY_REPLY_FALLBACK);
        assert!(outcome.invocations.is_empty());
    }

    #[tokio::test]
    async fn mid_chain_failure_keeps_earlier_effects() {
        // One assistant turn requests three tools; the third references a
        // task that does not exist.
        let chain = ProviderResponse {
            blocks: vec![
                AssistantBlock::ToolUse {
                    id: "tu_1".into(),
                    name: "add_task".into(),
                    input: serde_json::json!({"title": "buy milk"}),
                },
                AssistantBlock::ToolUse {
                    id: "tu_2".into(),
                    name: "add_task".into(),
                    input: serde_json::json!({"title": "buy eggs"}),
                },
                AssistantBlock::ToolUse {
                    id: "tu_3".into(),
                    name: "complete_task".into(),
                    input: serde_json::json!({"task_id": "long-gone"}),
                },
            ],
            stop_reason: StopReason::ToolUse,
        };
        let (orchestrator, provider, storage, _dir) = orchestrator(
            vec![
                chain,
                text_response("Added milk and eggs, but I couldn't find the task to complete."),
            ],
            5,
        )
        .await;

        let outcome = orchestrator.run("u1", vec![], "do all three").await.unwrap();

        // The first two mutations persisted despite the third failing.
        let tasks = storage.list_tasks("u1", None).await.unwrap();
        let titles: Vec<&str> = tasks.iter().map(|t| t.title.as_str()).collect();
        assert!(titles.contains(&"buy milk"));
        assert!(titles.contains(&"buy eggs"));

        assert_eq!(outcome.invocations.len(), 3);
        assert_eq!(outcome.invocations[0].result["success"], true);
        assert_eq!(outcome.invocations[1].result["success"], true);
        assert_eq!(outcome.invocations[2].result["code"], "NOT_FOUND");
        assert!(outcome.reply.contains("couldn't find"));

        // Every tool_use block got a matching result part, error flagged only
        // on the third.
        let requests = provider.requests.lock().unwrap();
        let results = &requests[1].messages[2].parts;
        assert_eq!(results.len(), 3);
        assert!(matches!(
            results[0],
            ContentPart::ToolResult { is_error: false, .. }
        ));
        assert!(matches!(
            results[2],
            ContentPart::ToolResult { is_error: true, .. }
        ));
    }

    #[tokio::test]
    async fn iteration_bound_yields_generic_reply() {
        // The model keeps asking for tools past the bound of 2.
        let (orchestrator, provider, _storage, _dir) = orchestrator(
            vec![
                tool_use_response("list_tasks", serde_json::json!({})),
                tool_use_response("list_tasks", serde_json::json!({})),
                text_response("never reached"),
            ],
            2,
        )
        .await;

        let outcome = orchestrator.run("u1", vec![], "loop").await.unwrap();
        assert_eq!(outcome.reply, LOOP_LIMIT_REPLY);
        assert_eq!(outcome.invocations.len(), 2);
        assert_eq!(provider.requests.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn truncated_response_still_returns_text() {
        let (orchestrator, _provider, _storage, _dir) = orchestrator(
            vec![ProviderResponse {
                blocks: vec![AssistantBlock::Text {
                    text: "Here are your ta".into(),
                }],
                stop_reason: StopReason::MaxTokens,
            }],
            5,
        )
        .await;

        let outcome = orchestrator.run("u1", vec![], "list").await.unwrap();
        assert_eq!(outcome.reply, "Here are your ta");
    }

    #[tokio::test]
    async fn provider_failure_propagates() {
        let (orchestrator, _provider, _storage, _dir) = orchestrator(vec![], 5).await;
        let result = orchestrator.run("u1", vec![], "hi").await;
        assert!(result.is_err());
    }
}
