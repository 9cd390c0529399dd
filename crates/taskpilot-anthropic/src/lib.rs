// SPDX-FileCopyrightText: 2026 Taskpilot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Anthropic Claude provider adapter for the Taskpilot assistant.
//!
//! This crate implements [`ProviderAdapter`] for the Anthropic Messages API
//! with non-streaming completion.

pub mod client;
pub mod types;

use std::time::Duration;

use async_trait::async_trait;
use taskpilot_config::model::AnthropicConfig;
use taskpilot_core::error::TaskpilotError;
use taskpilot_core::traits::ProviderAdapter;
use taskpilot_core::types::{
    AssistantBlock, ChatRole, ContentPart, ProviderRequest, ProviderResponse, StopReason,
};
use tracing::{info, warn};

use crate::client::AnthropicClient;
use crate::types::{
    ApiContent, ApiContentBlock, ApiMessage, MessageRequest, ResponseContentBlock, ToolDefinition,
};

/// Anthropic Claude provider implementing [`ProviderAdapter`].
///
/// API key resolution order: config -> `ANTHROPIC_API_KEY` env var -> error.
pub struct AnthropicProvider {
    client: AnthropicClient,
}

impl AnthropicProvider {
    /// Creates a new Anthropic provider from the given configuration.
    pub fn new(config: &AnthropicConfig) -> Result<Self, TaskpilotError> {
        let api_key = resolve_api_key(&config.api_key)?;
        let client = AnthropicClient::new(
            api_key,
            config.api_version.clone(),
            Duration::from_secs(config.request_timeout_secs),
        )?;

        info!(model = config.default_model, "Anthropic provider initialized");

        Ok(Self { client })
    }

    /// Creates a provider with an existing client (for testing).
    #[cfg(test)]
    fn with_client(client: AnthropicClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ProviderAdapter for AnthropicProvider {
    async fn complete(&self, request: ProviderRequest) -> Result<ProviderResponse, TaskpilotError> {
        let api_request = to_message_request(&request);
        let response = self.client.complete_message(&api_request).await?;

        let blocks = response
            .content
            .into_iter()
            .map(|block| match block {
                ResponseContentBlock::Text { text } => AssistantBlock::Text { text },
                ResponseContentBlock::ToolUse { id, name, input } => {
                    AssistantBlock::ToolUse { id, name, input }
                }
            })
            .collect();

        Ok(ProviderResponse {
            blocks,
            stop_reason: parse_stop_reason(response.stop_reason.as_deref()),
        })
    }
}

/// Converts a [`ProviderRequest`] to an Anthropic [`MessageRequest`].
fn to_message_request(request: &ProviderRequest) -> MessageRequest {
    let messages: Vec<ApiMessage> = request
        .messages
        .iter()
        .map(|m| ApiMessage {
            role: match m.role {
                ChatRole::User => "user".to_string(),
                ChatRole::Assistant => "assistant".to_string(),
            },
            content: convert_parts(&m.parts),
        })
        .collect();

    let tools: Vec<ToolDefinition> = request
        .tools
        .iter()
        .map(|t| ToolDefinition {
            name: t.name.clone(),
            description: t.description.clone(),
            input_schema: t.input_schema.clone(),
        })
        .collect();

    MessageRequest {
        model: request.model.clone(),
        messages,
        system: Some(request.system.clone()),
        max_tokens: request.max_tokens,
        tools: if tools.is_empty() { None } else { Some(tools) },
    }
}

/// Converts core [`ContentPart`]s to Anthropic API [`ApiContent`].
fn convert_parts(parts: &[ContentPart]) -> ApiContent {
    if parts.len() == 1
        && let ContentPart::Text { text } = &parts[0]
    {
        return ApiContent::Text(text.clone());
    }

    let blocks: Vec<ApiContentBlock> = parts
        .iter()
        .map(|part| match part {
            ContentPart::Text { text } => ApiContentBlock::Text { text: text.clone() },
            ContentPart::ToolUse { id, name, input } => ApiContentBlock::ToolUse {
                id: id.clone(),
                name: name.clone(),
                input: input.clone(),
            },
            ContentPart::ToolResult {
                tool_use_id,
                content,
                is_error,
            } => ApiContentBlock::ToolResult {
                tool_use_id: tool_use_id.clone(),
                content: content.clone(),
                is_error: if *is_error { Some(true) } else { None },
            },
        })
        .collect();

    ApiContent::Blocks(blocks)
}

/// Maps the API's stop-reason string onto the core tag.
///
/// Unknown values are treated as the end of the turn; the model produced a
/// complete message either way.
fn parse_stop_reason(raw: Option<&str>) -> StopReason {
    match raw {
        Some("tool_use") => StopReason::ToolUse,
        Some("max_tokens") => StopReason::MaxTokens,
        Some("end_turn") | Some("stop_sequence") | None => StopReason::EndTurn,
        Some(other) => {
            warn!(stop_reason = other, "unrecognized stop reason");
            StopReason::EndTurn
        }
    }
}

/// Resolves the API key from config or environment.
fn resolve_api_key(config_key: &Option<String>) -> Result<String, TaskpilotError> {
    if let Some(key) = config_key
        && !key.is_empty()
    {
        return Ok(key.clone());
    }

    std::env::var("ANTHROPIC_API_KEY").map_err(|_| {
        TaskpilotError::Config(
            "Anthropic API key not found. Set anthropic.api_key in config or ANTHROPIC_API_KEY environment variable.".into(),
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use taskpilot_core::types::{ChatMessage, ToolSpec};
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn resolve_api_key_from_config() {
        let result = resolve_api_key(&Some("sk-test-123".into()));
        assert_eq!(result.unwrap(), "sk-test-123");
    }

    #[test]
    fn resolve_api_key_none_falls_back_to_env() {
        let result = resolve_api_key(&None);
        // Will succeed if the env var is set, fail otherwise.
        if result.is_err() {
            let err = result.unwrap_err().to_string();
            assert!(err.contains("API key not found"), "got: {err}");
        }
    }

    #[test]
    fn stop_reason_mapping() {
        assert_eq!(parse_stop_reason(Some("end_turn")), StopReason::EndTurn);
        assert_eq!(parse_stop_reason(Some("tool_use")), StopReason::ToolUse);
        assert_eq!(parse_stop_reason(Some("max_tokens")), StopReason::MaxTokens);
        assert_eq!(parse_stop_reason(Some("pause_turn")), StopReason::EndTurn);
        assert_eq!(parse_stop_reason(None), StopReason::EndTurn);
    }

    #[test]
    fn single_text_part_serializes_as_string() {
        let parts = vec![ContentPart::Text {
            text: "Hello".into(),
        }];
        match convert_parts(&parts) {
            ApiContent::Text(t) => assert_eq!(t, "Hello"),
            other => panic!("expected Text, got {other:?}"),
        }
    }

    #[test]
    fn tool_result_parts_become_blocks() {
        let parts = vec![ContentPart::ToolResult {
            tool_use_id: "tu_1".into(),
            content: "{\"success\":true}".into(),
            is_error: false,
        }];
        match convert_parts(&parts) {
            ApiContent::Blocks(blocks) => {
                assert_eq!(blocks.len(), 1);
                match &blocks[0] {
                    ApiContentBlock::ToolResult { is_error, .. } => assert!(is_error.is_none()),
                    other => panic!("expected ToolResult, got {other:?}"),
                }
            }
            other => panic!("expected Blocks, got {other:?}"),
        }
    }

    #[test]
    fn request_conversion_includes_system_and_tools() {
        let request = ProviderRequest {
            system: "You are a task assistant.".into(),
            messages: vec![ChatMessage::user_text("add milk")],
            tools: vec![ToolSpec {
                name: "add_task".into(),
                description: "Create a task".into(),
                input_schema: serde_json::json!({"type": "object"}),
            }],
            model: "claude-sonnet-4-20250514".into(),
            max_tokens: 1024,
        };

        let api_req = to_message_request(&request);
        assert_eq!(api_req.system.as_deref(), Some("You are a task assistant."));
        assert_eq!(api_req.messages.len(), 1);
        assert_eq!(api_req.messages[0].role, "user");
        assert_eq!(api_req.tools.as_ref().unwrap().len(), 1);
        assert_eq!(api_req.max_tokens, 1024);
    }

    #[tokio::test]
    async fn complete_maps_tool_use_response() {
        let server = MockServer::start().await;

        let response_body = serde_json::json!({
            "id": "msg_1",
            "type": "message",
            "role": "assistant",
            "content": [
                {"type": "text", "text": "On it."},
                {"type": "tool_use", "id": "toolu_1", "name": "add_task", "input": {"title": "buy milk"}}
            ],
            "model": "claude-sonnet-4-20250514",
            "stop_reason": "tool_use",
            "usage": {"input_tokens": 30, "output_tokens": 20}
        });

        Mock::given(method("POST"))
            .and(path("/"))
            .and(body_partial_json(serde_json::json!({
                "system": "Persona.",
                "max_tokens": 512
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(&response_body))
            .mount(&server)
            .await;

        let client = AnthropicClient::new(
            "test-key".into(),
            "2023-06-01".into(),
            Duration::from_secs(5),
        )
        .unwrap()
        .with_base_url(server.uri());
        let provider = AnthropicProvider::with_client(client);

        let response = provider
            .complete(ProviderRequest {
                system: "Persona.".into(),
                messages: vec![ChatMessage::user_text("add milk")],
                tools: vec![],
                model: "claude-sonnet-4-20250514".into(),
                max_tokens: 512,
            })
            .await
            .unwrap();

        assert_eq!(response.stop_reason, StopReason::ToolUse);
        assert_eq!(response.text(), "On it.");
        let uses = response.tool_uses();
        assert_eq!(uses.len(), 1);
        assert_eq!(uses[0].1, "add_task");
        assert_eq!(uses[0].2["title"], "buy milk");
    }
}
