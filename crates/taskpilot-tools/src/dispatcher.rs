// SPDX-FileCopyrightText: 2026 Taskpilot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Tool dispatch with owner-identity injection.

use std::sync::Arc;

use taskpilot_core::StorageAdapter;
use taskpilot_core::types::ToolSpec;
use tracing::{debug, warn};

use crate::error::ToolError;
use crate::tasks::{AddTaskTool, CompleteTaskTool, DeleteTaskTool, ListTasksTool, UpdateTaskTool};
use crate::tool::ToolRegistry;

/// Keys the model must never control. The authenticated identity is always
/// passed out-of-band, so any of these in the arguments is dropped.
const IDENTITY_KEYS: &[&str] = &["owner_id", "user_id"];

/// Result of a dispatched tool call, ready to be serialized into a tool
/// result block.
#[derive(Debug, Clone)]
pub struct ToolOutput {
    pub content: serde_json::Value,
    pub is_error: bool,
}

impl ToolOutput {
    fn ok(content: serde_json::Value) -> Self {
        Self {
            content,
            is_error: false,
        }
    }

    fn err(error: &ToolError) -> Self {
        Self {
            content: error.to_value(),
            is_error: true,
        }
    }
}

/// Executes tool calls on behalf of an authenticated owner.
///
/// `dispatch` is total: every failure mode, including an unknown tool name,
/// becomes a structured error [`ToolOutput`] rather than an `Err`, so the
/// agent loop can always feed the result back to the model.
pub struct ToolDispatcher {
    registry: ToolRegistry,
}

impl ToolDispatcher {
    /// Builds a dispatcher around an existing registry.
    pub fn new(registry: ToolRegistry) -> Self {
        Self { registry }
    }

    /// Builds a dispatcher with the standard five task tools registered.
    pub fn with_task_tools(storage: Arc<dyn StorageAdapter>) -> Self {
        let mut registry = ToolRegistry::new();
        registry.register(Arc::new(AddTaskTool::new(storage.clone())));
        registry.register(Arc::new(ListTasksTool::new(storage.clone())));
        registry.register(Arc::new(CompleteTaskTool::new(storage.clone())));
        registry.register(Arc::new(UpdateTaskTool::new(storage.clone())));
        registry.register(Arc::new(DeleteTaskTool::new(storage)));
        Self { registry }
    }

    /// Tool definitions for the provider request.
    pub fn specs(&self) -> Vec<ToolSpec> {
        self.registry.specs()
    }

    /// Executes `tool_name` for `owner_id` with model-supplied `args`.
    pub async fn dispatch(
        &self,
        owner_id: &str,
        tool_name: &str,
        mut args: serde_json::Value,
    ) -> ToolOutput {
        let Some(tool) = self.registry.get(tool_name) else {
            warn!(tool = tool_name, "unknown tool requested");
            return ToolOutput::err(&ToolError::validation(format!(
                "Unknown tool `{tool_name}`"
            )));
        };

        if let Some(map) = args.as_object_mut() {
            for key in IDENTITY_KEYS {
                if map.remove(*key).is_some() {
                    warn!(tool = tool_name, key, "dropped identity key from tool arguments");
                }
            }
        }

        debug!(tool = tool_name, "dispatching tool call");
        match tool.invoke(owner_id, args).await {
            Ok(content) => ToolOutput::ok(content),
            Err(err) => {
                debug!(tool = tool_name, code = err.code(), "tool call failed");
                ToolOutput::err(&err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use taskpilot_config::model::StorageConfig;
    use taskpilot_storage::SqliteStorage;

    async fn dispatcher() -> (ToolDispatcher, Arc<dyn StorageAdapter>, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let config = StorageConfig {
            database_path: dir.path().join("dispatch.db").display().to_string(),
        };
        let storage = SqliteStorage::new(config);
        storage.initialize().await.unwrap();
        let storage: Arc<dyn StorageAdapter> = Arc::new(storage);
        (ToolDispatcher::with_task_tools(storage.clone()), storage, dir)
    }

    #[tokio::test]
    async fn dispatches_to_registered_tool() {
        let (dispatcher, _storage, _dir) = dispatcher().await;
        let out = dispatcher
            .dispatch("u1", "add_task", serde_json::json!({"title": "walk dog"}))
            .await;
        assert!(!out.is_error);
        assert_eq!(out.content["task"]["title"], "walk dog");
        assert_eq!(out.content["task"]["owner_id"], "u1");
    }

    #[tokio::test]
    async fn unknown_tool_is_a_structured_error() {
        let (dispatcher, _storage, _dir) = dispatcher().await;
        let out = dispatcher
            .dispatch("u1", "format_disk", serde_json::json!({}))
            .await;
        assert!(out.is_error);
        assert_eq!(out.content["code"], "VALIDATION_ERROR");
        assert!(out.content["error"].as_str().unwrap().contains("format_disk"));
    }

    #[tokio::test]
    async fn identity_keys_in_arguments_are_ignored() {
        let (dispatcher, storage, _dir) = dispatcher().await;
        let out = dispatcher
            .dispatch(
                "u1",
                "add_task",
                serde_json::json!({"title": "sneaky", "owner_id": "u2", "user_id": "u2"}),
            )
            .await;
        assert!(!out.is_error);
        assert_eq!(out.content["task"]["owner_id"], "u1");

        // u2 never received anything.
        let tasks = storage.list_tasks("u2", None).await.unwrap();
        assert!(tasks.is_empty());
    }

    #[tokio::test]
    async fn tool_failures_become_error_outputs() {
        let (dispatcher, _storage, _dir) = dispatcher().await;
        let out = dispatcher
            .dispatch(
                "u1",
                "complete_task",
                serde_json::json!({"task_id": "no-such-task"}),
            )
            .await;
        assert!(out.is_error);
        assert_eq!(out.content["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn specs_cover_all_five_tools() {
        let (dispatcher, _storage, _dir) = dispatcher().await;
        let names: Vec<String> = dispatcher.specs().into_iter().map(|s| s.name).collect();
        assert_eq!(
            names,
            vec![
                "add_task",
                "complete_task",
                "delete_task",
                "list_tasks",
                "update_task"
            ]
        );
    }
}
