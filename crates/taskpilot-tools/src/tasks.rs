// SPDX-FileCopyrightText: 2026 Taskpilot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The five task-management tools.
//!
//! Each tool wraps the Task Store behind the [`Tool`] interface. All storage
//! access goes through owner-scoped queries, so a task belonging to another
//! user is reported as not found -- never as forbidden.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use taskpilot_core::StorageAdapter;
use taskpilot_core::types::{
    DESCRIPTION_MAX_LEN, Task, TaskPriority, TaskStatus, TITLE_MAX_LEN,
};
use tracing::debug;

use crate::error::ToolError;
use crate::tool::Tool;

fn now() -> String {
    chrono::Utc::now().to_rfc3339()
}

fn parse_input<T: serde::de::DeserializeOwned>(input: serde_json::Value) -> Result<T, ToolError> {
    serde_json::from_value(input).map_err(|e| ToolError::validation(format!("invalid arguments: {e}")))
}

fn validate_title(title: &str) -> Result<(), ToolError> {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        return Err(ToolError::Validation {
            message: "Title must not be empty".to_string(),
            details: Some(serde_json::json!({"field": "title"})),
        });
    }
    if trimmed.chars().count() > TITLE_MAX_LEN {
        return Err(ToolError::Validation {
            message: format!("Title must be at most {TITLE_MAX_LEN} characters"),
            details: Some(serde_json::json!({"field": "title"})),
        });
    }
    Ok(())
}

fn validate_description(description: &str) -> Result<(), ToolError> {
    if description.chars().count() > DESCRIPTION_MAX_LEN {
        return Err(ToolError::Validation {
            message: format!("Description must be at most {DESCRIPTION_MAX_LEN} characters"),
            details: Some(serde_json::json!({"field": "description"})),
        });
    }
    Ok(())
}

fn task_result(task: &Task) -> serde_json::Value {
    serde_json::json!({
        "success": true,
        "task": task,
    })
}

// --- add_task ---

/// Creates a new task in the caller's task list.
pub struct AddTaskTool {
    storage: Arc<dyn StorageAdapter>,
}

impl AddTaskTool {
    pub fn new(storage: Arc<dyn StorageAdapter>) -> Self {
        Self { storage }
    }
}

#[derive(Debug, Deserialize)]
struct AddTaskParams {
    title: String,
    #[serde(default)]
    description: Option<String>,
}

#[async_trait]
impl Tool for AddTaskTool {
    fn name(&self) -> &str {
        "add_task"
    }

    fn description(&self) -> &str {
        "Create a new task in the user's task list. Use this when the user wants to add, create, or remember something they need to do."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "title": {
                    "type": "string",
                    "description": "The task title. Clear and concise (e.g. 'Buy groceries', 'Call mom')."
                },
                "description": {
                    "type": "string",
                    "description": "Optional additional details about the task."
                }
            },
            "required": ["title"]
        })
    }

    async fn invoke(
        &self,
        owner_id: &str,
        input: serde_json::Value,
    ) -> Result<serde_json::Value, ToolError> {
        let params: AddTaskParams = parse_input(input)?;
        validate_title(&params.title)?;
        let description = params.description.filter(|d| !d.trim().is_empty());
        if let Some(ref d) = description {
            validate_description(d)?;
        }

        let timestamp = now();
        let task = Task {
            id: uuid::Uuid::new_v4().to_string(),
            owner_id: owner_id.to_string(),
            title: params.title.trim().to_string(),
            description,
            status: TaskStatus::default(),
            priority: TaskPriority::default(),
            created_at: timestamp.clone(),
            updated_at: timestamp,
            completed_at: None,
        };
        self.storage.create_task(&task).await?;
        debug!(task_id = %task.id, "task created");
        Ok(task_result(&task))
    }
}

// --- list_tasks ---

/// Lists the caller's tasks, optionally filtered by status.
pub struct ListTasksTool {
    storage: Arc<dyn StorageAdapter>,
}

impl ListTasksTool {
    pub fn new(storage: Arc<dyn StorageAdapter>) -> Self {
        Self { storage }
    }
}

#[derive(Debug, Deserialize)]
struct ListTasksParams {
    #[serde(default)]
    status: Option<String>,
}

#[async_trait]
impl Tool for ListTasksTool {
    fn name(&self) -> &str {
        "list_tasks"
    }

    fn description(&self) -> &str {
        "Retrieve the user's tasks. Use this when the user wants to see their tasks, check what they need to do, or review their list. Optionally filter by status."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "status": {
                    "type": "string",
                    "enum": ["to_do", "in_progress", "review", "done"],
                    "description": "Optional status filter."
                }
            },
            "required": []
        })
    }

    async fn invoke(
        &self,
        owner_id: &str,
        input: serde_json::Value,
    ) -> Result<serde_json::Value, ToolError> {
        let params: ListTasksParams = parse_input(input)?;
        let status = match params.status.as_deref().filter(|s| !s.is_empty()) {
            Some(raw) => Some(raw.parse::<TaskStatus>().map_err(|_| {
                ToolError::validation(format!(
                    "Unknown status `{raw}`; expected one of to_do, in_progress, review, done"
                ))
            })?),
            None => None,
        };

        let tasks = self.storage.list_tasks(owner_id, status).await?;
        Ok(serde_json::json!({
            "success": true,
            "count": tasks.len(),
            "tasks": tasks,
        }))
    }
}

// --- complete_task ---

/// Marks a task as done.
pub struct CompleteTaskTool {
    storage: Arc<dyn StorageAdapter>,
}

impl CompleteTaskTool {
    pub fn new(storage: Arc<dyn StorageAdapter>) -> Self {
        Self { storage }
    }
}

#[derive(Debug, Deserialize)]
struct CompleteTaskParams {
    task_id: String,
}

#[async_trait]
impl Tool for CompleteTaskTool {
    fn name(&self) -> &str {
        "complete_task"
    }

    fn description(&self) -> &str {
        "Mark a task as completed. Use this when the user indicates they've finished a task or want to mark it as done. You must know the task_id -- list tasks first if you don't."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "task_id": {
                    "type": "string",
                    "description": "The unique identifier (UUID) of the task to complete."
                }
            },
            "required": ["task_id"]
        })
    }

    async fn invoke(
        &self,
        owner_id: &str,
        input: serde_json::Value,
    ) -> Result<serde_json::Value, ToolError> {
        let params: CompleteTaskParams = parse_input(input)?;
        let Some(mut task) = self.storage.get_task(owner_id, &params.task_id).await? else {
            return Err(ToolError::not_found("Task not found"));
        };

        // Completing an already-done task is a no-op, not an error.
        if !task.status.is_done() {
            let timestamp = now();
            task.status = TaskStatus::Done;
            task.completed_at = Some(timestamp.clone());
            task.updated_at = timestamp;
            if !self.storage.update_task(&task).await? {
                return Err(ToolError::not_found("Task not found"));
            }
        }
        debug!(task_id = %task.id, "task completed");
        Ok(task_result(&task))
    }
}

// --- update_task ---

/// Updates a task's title, description, status, or priority.
pub struct UpdateTaskTool {
    storage: Arc<dyn StorageAdapter>,
}

impl UpdateTaskTool {
    pub fn new(storage: Arc<dyn StorageAdapter>) -> Self {
        Self { storage }
    }
}

#[derive(Debug, Deserialize)]
struct UpdateTaskParams {
    task_id: String,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    priority: Option<String>,
}

#[async_trait]
impl Tool for UpdateTaskTool {
    fn name(&self) -> &str {
        "update_task"
    }

    fn description(&self) -> &str {
        "Update an existing task's title, description, status, or priority. Use this when the user wants to modify task details. Only provide the fields being changed."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "task_id": {
                    "type": "string",
                    "description": "The unique identifier (UUID) of the task to update."
                },
                "title": {
                    "type": "string",
                    "description": "New title for the task."
                },
                "description": {
                    "type": "string",
                    "description": "New description for the task."
                },
                "status": {
                    "type": "string",
                    "enum": ["to_do", "in_progress", "review", "done"],
                    "description": "New status for the task."
                },
                "priority": {
                    "type": "string",
                    "enum": ["low", "medium", "high", "urgent"],
                    "description": "New priority for the task."
                }
            },
            "required": ["task_id"]
        })
    }

    async fn invoke(
        &self,
        owner_id: &str,
        input: serde_json::Value,
    ) -> Result<serde_json::Value, ToolError> {
        let params: UpdateTaskParams = parse_input(input)?;
        let Some(mut task) = self.storage.get_task(owner_id, &params.task_id).await? else {
            return Err(ToolError::not_found("Task not found"));
        };

        if let Some(title) = params.title {
            validate_title(&title)?;
            task.title = title.trim().to_string();
        }
        if let Some(description) = params.description {
            validate_description(&description)?;
            task.description = if description.trim().is_empty() {
                None
            } else {
                Some(description)
            };
        }
        if let Some(raw) = params.status {
            task.status = raw.parse::<TaskStatus>().map_err(|_| {
                ToolError::validation(format!(
                    "Unknown status `{raw}`; expected one of to_do, in_progress, review, done"
                ))
            })?;
        }
        if let Some(raw) = params.priority {
            task.priority = raw.parse::<TaskPriority>().map_err(|_| {
                ToolError::validation(format!(
                    "Unknown priority `{raw}`; expected one of low, medium, high, urgent"
                ))
            })?;
        }

        let timestamp = now();
        // Keep completed_at consistent with the (possibly changed) status.
        task.completed_at = if task.status.is_done() {
            Some(task.completed_at.unwrap_or_else(|| timestamp.clone()))
        } else {
            None
        };
        task.updated_at = timestamp;

        if !self.storage.update_task(&task).await? {
            return Err(ToolError::not_found("Task not found"));
        }
        debug!(task_id = %task.id, "task updated");
        Ok(task_result(&task))
    }
}

// --- delete_task ---

/// Permanently deletes a task.
pub struct DeleteTaskTool {
    storage: Arc<dyn StorageAdapter>,
}

impl DeleteTaskTool {
    pub fn new(storage: Arc<dyn StorageAdapter>) -> Self {
        Self { storage }
    }
}

#[derive(Debug, Deserialize)]
struct DeleteTaskParams {
    task_id: String,
}

#[async_trait]
impl Tool for DeleteTaskTool {
    fn name(&self) -> &str {
        "delete_task"
    }

    fn description(&self) -> &str {
        "Permanently delete a task from the user's task list. Use this when the user wants to remove a task they no longer need."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "task_id": {
                    "type": "string",
                    "description": "The unique identifier (UUID) of the task to delete."
                }
            },
            "required": ["task_id"]
        })
    }

    async fn invoke(
        &self,
        owner_id: &str,
        input: serde_json::Value,
    ) -> Result<serde_json::Value, ToolError> {
        let params: DeleteTaskParams = parse_input(input)?;
        let Some(task) = self.storage.get_task(owner_id, &params.task_id).await? else {
            return Err(ToolError::not_found("Task not found"));
        };

        if !self.storage.delete_task(owner_id, &params.task_id).await? {
            return Err(ToolError::not_found("Task not found"));
        }
        debug!(task_id = %params.task_id, "task deleted");
        Ok(serde_json::json!({
            "success": true,
            "task_id": params.task_id,
            "message": format!("Task '{}' deleted", task.title),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use taskpilot_config::model::StorageConfig;
    use taskpilot_storage::SqliteStorage;

    async fn storage() -> (Arc<dyn StorageAdapter>, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let config = StorageConfig {
            database_path: dir.path().join("tools.db").display().to_string(),
        };
        let storage = SqliteStorage::new(config);
        storage.initialize().await.unwrap();
        (Arc::new(storage), dir)
    }

    async fn add(storage: &Arc<dyn StorageAdapter>, owner: &str, title: &str) -> String {
        let tool = AddTaskTool::new(storage.clone());
        let out = tool
            .invoke(owner, serde_json::json!({"title": title}))
            .await
            .unwrap();
        out["task"]["id"].as_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn add_task_defaults_and_serializes() {
        let (storage, _dir) = storage().await;
        let tool = AddTaskTool::new(storage.clone());
        let out = tool
            .invoke("u1", serde_json::json!({"title": "  buy milk  "}))
            .await
            .unwrap();

        assert_eq!(out["success"], true);
        assert_eq!(out["task"]["title"], "buy milk");
        assert_eq!(out["task"]["status"], "to_do");
        assert_eq!(out["task"]["priority"], "medium");
        assert!(out["task"]["completed_at"].is_null());
    }

    #[tokio::test]
    async fn add_task_rejects_bad_titles() {
        let (storage, _dir) = storage().await;
        let tool = AddTaskTool::new(storage);

        let err = tool
            .invoke("u1", serde_json::json!({"title": "   "}))
            .await
            .unwrap_err();
        assert_eq!(err.code(), "VALIDATION_ERROR");

        let long = "x".repeat(TITLE_MAX_LEN + 1);
        let err = tool
            .invoke("u1", serde_json::json!({"title": long}))
            .await
            .unwrap_err();
        assert_eq!(err.code(), "VALIDATION_ERROR");

        let err = tool.invoke("u1", serde_json::json!({})).await.unwrap_err();
        assert_eq!(err.code(), "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn complete_task_sets_done_and_timestamp() {
        let (storage, _dir) = storage().await;
        let task_id = add(&storage, "u1", "finish report").await;

        let tool = CompleteTaskTool::new(storage.clone());
        let out = tool
            .invoke("u1", serde_json::json!({"task_id": task_id}))
            .await
            .unwrap();
        assert_eq!(out["task"]["status"], "done");
        assert!(out["task"]["completed_at"].is_string());

        // Idempotent: completing again returns the same done task.
        let again = tool
            .invoke("u1", serde_json::json!({"task_id": out["task"]["id"]}))
            .await
            .unwrap();
        assert_eq!(again["task"]["completed_at"], out["task"]["completed_at"]);
    }

    #[tokio::test]
    async fn foreign_task_is_not_found_not_forbidden() {
        let (storage, _dir) = storage().await;
        let task_id = add(&storage, "u2", "their secret").await;

        let complete = CompleteTaskTool::new(storage.clone());
        let err = complete
            .invoke("u1", serde_json::json!({"task_id": &task_id}))
            .await
            .unwrap_err();
        assert_eq!(err.code(), "NOT_FOUND");

        let delete = DeleteTaskTool::new(storage.clone());
        let err = delete
            .invoke("u1", serde_json::json!({"task_id": &task_id}))
            .await
            .unwrap_err();
        assert_eq!(err.code(), "NOT_FOUND");

        // The owner's task is untouched.
        let task = storage.get_task("u2", &task_id).await.unwrap().unwrap();
        assert_eq!(task.status, TaskStatus::ToDo);
    }

    #[tokio::test]
    async fn update_task_moves_status_both_ways() {
        let (storage, _dir) = storage().await;
        let task_id = add(&storage, "u1", "review PR").await;

        let tool = UpdateTaskTool::new(storage.clone());
        let out = tool
            .invoke("u1", serde_json::json!({"task_id": &task_id, "status": "done"}))
            .await
            .unwrap();
        assert!(out["task"]["completed_at"].is_string());

        // Moving off done clears completed_at.
        let out = tool
            .invoke(
                "u1",
                serde_json::json!({"task_id": &task_id, "status": "in_progress"}),
            )
            .await
            .unwrap();
        assert_eq!(out["task"]["status"], "in_progress");
        assert!(out["task"]["completed_at"].is_null());
    }

    #[tokio::test]
    async fn update_task_rejects_unknown_enum_values() {
        let (storage, _dir) = storage().await;
        let task_id = add(&storage, "u1", "x").await;

        let tool = UpdateTaskTool::new(storage);
        let err = tool
            .invoke(
                "u1",
                serde_json::json!({"task_id": &task_id, "status": "finished"}),
            )
            .await
            .unwrap_err();
        assert_eq!(err.code(), "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn list_tasks_counts_and_filters() {
        let (storage, _dir) = storage().await;
        add(&storage, "u1", "one").await;
        let done_id = add(&storage, "u1", "two").await;
        CompleteTaskTool::new(storage.clone())
            .invoke("u1", serde_json::json!({"task_id": done_id}))
            .await
            .unwrap();

        let tool = ListTasksTool::new(storage.clone());
        let out = tool.invoke("u1", serde_json::json!({})).await.unwrap();
        assert_eq!(out["count"], 2);

        let out = tool
            .invoke("u1", serde_json::json!({"status": "done"}))
            .await
            .unwrap();
        assert_eq!(out["count"], 1);

        // An empty list is success, not an error.
        let out = tool.invoke("nobody", serde_json::json!({})).await.unwrap();
        assert_eq!(out["count"], 0);
        assert!(out["tasks"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn delete_task_names_the_task() {
        let (storage, _dir) = storage().await;
        let task_id = add(&storage, "u1", "old chore").await;

        let tool = DeleteTaskTool::new(storage.clone());
        let out = tool
            .invoke("u1", serde_json::json!({"task_id": &task_id}))
            .await
            .unwrap();
        assert_eq!(out["success"], true);
        assert!(out["message"].as_str().unwrap().contains("old chore"));
        assert!(storage.get_task("u1", &task_id).await.unwrap().is_none());
    }
}
