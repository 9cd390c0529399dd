// SPDX-FileCopyrightText: 2026 Taskpilot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Provider adapter trait for the inference capability.

use async_trait::async_trait;

use crate::error::TaskpilotError;
use crate::types::{ProviderRequest, ProviderResponse};

/// Adapter for the external language-model service.
///
/// The orchestrator treats the provider as a black box that turns a system
/// persona, ordered history, and tool schema into either a final text reply
/// or a set of tool-call requests. Implementations must bound the call with
/// a timeout; the orchestrator never waits indefinitely.
#[async_trait]
pub trait ProviderAdapter: Send + Sync {
    /// Sends a completion request and returns the full response.
    async fn complete(&self, request: ProviderRequest) -> Result<ProviderResponse, TaskpilotError>;
}
