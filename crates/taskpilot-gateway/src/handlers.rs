// SPDX-FileCopyrightText: 2026 Taskpilot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP request handlers for the chat API.
//!
//! Handles POST /{owner_id}/chat and GET /health.

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use taskpilot_core::TaskpilotError;
use taskpilot_core::types::{
    CONVERSATION_TITLE_MAX_LEN, MESSAGE_MAX_LEN, Message, MessageRole, ToolInvocation,
};
use taskpilot_security::sanitize_error_message;
use tracing::{error, info};

use crate::auth::CallerIdentity;
use crate::server::GatewayState;

/// Request body for POST /{owner_id}/chat.
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    /// The user's message text.
    pub message: String,
    /// Optional conversation to continue.
    #[serde(default)]
    pub conversation_id: Option<String>,
}

/// Response body for POST /{owner_id}/chat.
#[derive(Debug, Serialize)]
pub struct ChatResponse {
    /// The conversation this turn belongs to (may be newly created).
    pub conversation_id: String,
    /// The assistant's reply.
    pub message: String,
    /// Tool executions performed during this request cycle.
    pub tool_calls: Vec<ToolInvocation>,
    /// ISO 8601 timestamp of the assistant's reply.
    pub timestamp: String,
}

/// Response body for GET /health.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// Error response body, matching the tool error taxonomy.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

fn error_body(status: StatusCode, message: &str, code: &str) -> Response {
    (
        status,
        Json(ErrorResponse {
            error: message.to_string(),
            code: code.to_string(),
        }),
    )
        .into_response()
}

/// Maps an internal error onto an HTTP response with a sanitized message.
fn map_error(err: &TaskpilotError) -> Response {
    let status = match err {
        TaskpilotError::Validation { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        TaskpilotError::NotFound { .. } => StatusCode::NOT_FOUND,
        TaskpilotError::PermissionDenied { .. } => StatusCode::FORBIDDEN,
        TaskpilotError::Timeout { .. } => StatusCode::GATEWAY_TIMEOUT,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    error_body(status, &sanitize_error_message(&err.to_string()), err.code())
}

/// POST /{owner_id}/chat
///
/// Runs one full request cycle: validate, assemble history, think/act,
/// persist, respond. The cycle runs in a spawned task so persistence
/// completes even if the client disconnects mid-request.
pub async fn post_chat(
    State(state): State<GatewayState>,
    Path(owner_id): Path<String>,
    Extension(caller): Extension<CallerIdentity>,
    Json(body): Json<ChatRequest>,
) -> Response {
    if caller.0 != owner_id {
        return error_body(
            StatusCode::FORBIDDEN,
            "token does not authorize this user",
            "PERMISSION_DENIED",
        );
    }

    let message = body.message.trim().to_string();
    if message.is_empty() {
        return error_body(
            StatusCode::UNPROCESSABLE_ENTITY,
            "message must not be empty",
            "VALIDATION_ERROR",
        );
    }
    if message.chars().count() > MESSAGE_MAX_LEN {
        return error_body(
            StatusCode::UNPROCESSABLE_ENTITY,
            &format!("message must be at most {MESSAGE_MAX_LEN} characters"),
            "VALIDATION_ERROR",
        );
    }

    let cycle = tokio::spawn(run_cycle(
        state,
        owner_id,
        message,
        body.conversation_id,
    ));

    match cycle.await {
        Ok(Ok(response)) => (StatusCode::OK, Json(response)).into_response(),
        Ok(Err(err)) => {
            error!(error = %err, "request cycle failed");
            map_error(&err)
        }
        Err(join_err) => {
            error!(error = %join_err, "request cycle task panicked");
            error_body(
                StatusCode::INTERNAL_SERVER_ERROR,
                "an internal error occurred",
                "INTERNAL_ERROR",
            )
        }
    }
}

/// The full cycle: history in, reply and persisted rows out.
async fn run_cycle(
    state: GatewayState,
    owner_id: String,
    message: String,
    conversation_id: Option<String>,
) -> Result<ChatResponse, TaskpilotError> {
    let history = state
        .history
        .assemble(&owner_id, conversation_id.as_deref())
        .await?;
    let conversation_id = history.conversation_id.clone();

    let outcome = state
        .orchestrator
        .run(&owner_id, history.messages, &message)
        .await?;

    let now = chrono::Utc::now().to_rfc3339();
    let title: String = message.chars().take(CONVERSATION_TITLE_MAX_LEN).collect();

    if history.existed {
        state
            .storage
            .touch_conversation(&owner_id, &conversation_id, Some(&title), &now)
            .await?;
    } else {
        state
            .storage
            .create_conversation(&taskpilot_core::types::Conversation {
                id: conversation_id.clone(),
                owner_id: owner_id.clone(),
                title: Some(title),
                created_at: now.clone(),
                updated_at: now.clone(),
            })
            .await?;
    }

    state
        .storage
        .insert_message(&Message {
            id: uuid::Uuid::new_v4().to_string(),
            conversation_id: conversation_id.clone(),
            owner_id: owner_id.clone(),
            role: MessageRole::User,
            content: message,
            tool_calls: None,
            created_at: now.clone(),
        })
        .await?;

    let tool_calls_json = if outcome.invocations.is_empty() {
        None
    } else {
        Some(
            serde_json::to_string(&outcome.invocations)
                .map_err(|e| TaskpilotError::Internal(format!("serializing tool calls: {e}")))?,
        )
    };
    state
        .storage
        .insert_message(&Message {
            id: uuid::Uuid::new_v4().to_string(),
            conversation_id: conversation_id.clone(),
            owner_id: owner_id.clone(),
            role: MessageRole::Assistant,
            content: outcome.reply.clone(),
            tool_calls: tool_calls_json,
            created_at: now.clone(),
        })
        .await?;

    info!(
        conversation_id = %conversation_id,
        tool_calls = outcome.invocations.len(),
        "chat turn persisted"
    );

    Ok(ChatResponse {
        conversation_id,
        message: outcome.reply,
        tool_calls: outcome.invocations,
        timestamp: now,
    })
}

/// GET /health
///
/// Unauthenticated liveness probe.
pub async fn get_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}
