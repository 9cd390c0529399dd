// SPDX-FileCopyrightText: 2026 Taskpilot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Storage adapter trait for the Task Store and Conversation Store.
//!
//! Every read, update, and delete takes the caller's `owner_id` and filters
//! on it inside the query. No method exists that can touch a row without an
//! owner filter; a task or conversation owned by someone else behaves
//! exactly like one that does not exist.

use async_trait::async_trait;

use crate::error::TaskpilotError;
use crate::types::{Conversation, Message, Task, TaskStatus};

/// Adapter for the persistence backend.
#[async_trait]
pub trait StorageAdapter: Send + Sync {
    /// Initializes the storage backend (migrations, connection, pragmas).
    async fn initialize(&self) -> Result<(), TaskpilotError>;

    /// Closes the storage backend, flushing pending writes.
    async fn close(&self) -> Result<(), TaskpilotError>;

    // --- Task Store ---

    /// Inserts a new task. The task's `owner_id` is set by the caller from
    /// the authenticated identity, never from model-supplied input.
    async fn create_task(&self, task: &Task) -> Result<(), TaskpilotError>;

    /// Fetches a task by id, scoped to `owner_id`. Foreign-owned tasks
    /// return `None`.
    async fn get_task(&self, owner_id: &str, task_id: &str)
    -> Result<Option<Task>, TaskpilotError>;

    /// Lists the owner's tasks, newest first, optionally filtered by status.
    async fn list_tasks(
        &self,
        owner_id: &str,
        status: Option<TaskStatus>,
    ) -> Result<Vec<Task>, TaskpilotError>;

    /// Writes back a full task row, scoped to its `owner_id`.
    /// Returns false when no matching row existed.
    async fn update_task(&self, task: &Task) -> Result<bool, TaskpilotError>;

    /// Deletes a task, scoped to `owner_id`. Returns false when no matching
    /// row existed.
    async fn delete_task(&self, owner_id: &str, task_id: &str) -> Result<bool, TaskpilotError>;

    // --- Conversation Store ---

    /// Inserts a new conversation row.
    async fn create_conversation(&self, conversation: &Conversation)
    -> Result<(), TaskpilotError>;

    /// Fetches a conversation by id, scoped to `owner_id`.
    async fn get_conversation(
        &self,
        owner_id: &str,
        conversation_id: &str,
    ) -> Result<Option<Conversation>, TaskpilotError>;

    /// Bumps `updated_at` (and sets the title if still unset), scoped to
    /// `owner_id`.
    async fn touch_conversation(
        &self,
        owner_id: &str,
        conversation_id: &str,
        title: Option<&str>,
        updated_at: &str,
    ) -> Result<(), TaskpilotError>;

    /// Appends a message. Messages are immutable once inserted.
    async fn insert_message(&self, message: &Message) -> Result<(), TaskpilotError>;

    /// Returns a conversation's messages in chronological order, scoped to
    /// `owner_id`, optionally limited to the most recent `limit`.
    async fn messages_for_conversation(
        &self,
        owner_id: &str,
        conversation_id: &str,
        limit: Option<i64>,
    ) -> Result<Vec<Message>, TaskpilotError>;
}
