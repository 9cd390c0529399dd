// SPDX-FileCopyrightText: 2026 Taskpilot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock LLM provider adapter for deterministic testing.
//!
//! `MockProvider` implements `ProviderAdapter` with pre-configured responses,
//! enabling fast, CI-runnable tests without external API calls.

use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use taskpilot_core::TaskpilotError;
use taskpilot_core::traits::ProviderAdapter;
use taskpilot_core::types::{
    AssistantBlock, ProviderRequest, ProviderResponse, StopReason,
};

/// A mock LLM provider that returns pre-configured responses.
///
/// Responses are popped from a FIFO queue. When the queue is empty, a
/// default end-turn text response is returned. Every request is recorded
/// so tests can assert on what the model saw.
pub struct MockProvider {
    responses: Arc<Mutex<VecDeque<ProviderResponse>>>,
    requests: Arc<Mutex<Vec<ProviderRequest>>>,
}

impl MockProvider {
    /// Create a new mock provider with an empty response queue.
    pub fn new() -> Self {
        Self {
            responses: Arc::new(Mutex::new(VecDeque::new())),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Create a mock provider pre-loaded with the given responses.
    pub fn with_responses(responses: Vec<ProviderResponse>) -> Self {
        Self {
            responses: Arc::new(Mutex::new(VecDeque::from(responses))),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Add a response to the end of the queue.
    pub async fn add_response(&self, response: ProviderResponse) {
        self.responses.lock().await.push_back(response);
    }

    /// All requests the provider has received, in order.
    pub async fn recorded_requests(&self) -> Vec<ProviderRequest> {
        self.requests.lock().await.clone()
    }

    /// An end-turn response with only the given text.
    pub fn text_response(text: &str) -> ProviderResponse {
        ProviderResponse {
            blocks: vec![AssistantBlock::Text { text: text.into() }],
            stop_reason: StopReason::EndTurn,
        }
    }

    /// A tool-use response requesting a single tool call.
    pub fn tool_use_response(name: &str, input: serde_json::Value) -> ProviderResponse {
        ProviderResponse {
            blocks: vec![AssistantBlock::ToolUse {
                id: format!("tu_{name}"),
                name: name.into(),
                input,
            }],
            stop_reason: StopReason::ToolUse,
        }
    }
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ProviderAdapter for MockProvider {
    async fn complete(&self, request: ProviderRequest) -> Result<ProviderResponse, TaskpilotError> {
        self.requests.lock().await.push(request);
        Ok(self
            .responses
            .lock()
            .await
            .pop_front()
            .unwrap_or_else(|| Self::text_response("mock response")))
    }
}
