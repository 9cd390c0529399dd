// SPDX-FileCopyrightText: 2026 Taskpilot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite implementation of the StorageAdapter trait.

use async_trait::async_trait;
use tokio::sync::OnceCell;
use tracing::debug;

use taskpilot_config::model::StorageConfig;
use taskpilot_core::types::{Conversation, Message, Task, TaskStatus};
use taskpilot_core::{StorageAdapter, TaskpilotError};

use crate::database::Database;
use crate::queries;

/// SQLite-backed storage adapter.
///
/// Wraps a [`Database`] handle and delegates all query operations to the
/// typed query modules. The database is lazily initialized on the first
/// call to [`StorageAdapter::initialize`].
pub struct SqliteStorage {
    config: StorageConfig,
    db: OnceCell<Database>,
}

impl SqliteStorage {
    /// Create a new SqliteStorage with the given configuration.
    ///
    /// The database connection is not opened until `initialize` is called.
    pub fn new(config: StorageConfig) -> Self {
        Self {
            config,
            db: OnceCell::new(),
        }
    }

    /// Returns a reference to the underlying Database, or an error if not
    /// initialized.
    fn db(&self) -> Result<&Database, TaskpilotError> {
        self.db.get().ok_or_else(|| TaskpilotError::Storage {
            source: "storage not initialized -- call initialize() first".into(),
        })
    }
}

#[async_trait]
impl StorageAdapter for SqliteStorage {
    async fn initialize(&self) -> Result<(), TaskpilotError> {
        let db = Database::open(&self.config.database_path).await?;
        self.db.set(db).map_err(|_| TaskpilotError::Storage {
            source: "storage already initialized".into(),
        })?;
        debug!(path = %self.config.database_path, "SQLite storage initialized");
        Ok(())
    }

    async fn close(&self) -> Result<(), TaskpilotError> {
        self.db()?.close().await
    }

    // --- Task Store ---

    async fn create_task(&self, task: &Task) -> Result<(), TaskpilotError> {
        queries::tasks::create_task(self.db()?, task).await
    }

    async fn get_task(
        &self,
        owner_id: &str,
        task_id: &str,
    ) -> Result<Option<Task>, TaskpilotError> {
        queries::tasks::get_task(self.db()?, owner_id, task_id).await
    }

    async fn list_tasks(
        &self,
        owner_id: &str,
        status: Option<TaskStatus>,
    ) -> Result<Vec<Task>, TaskpilotError> {
        queries::tasks::list_tasks(self.db()?, owner_id, status).await
    }

    async fn update_task(&self, task: &Task) -> Result<bool, TaskpilotError> {
        queries::tasks::update_task(self.db()?, task).await
    }

    async fn delete_task(&self, owner_id: &str, task_id: &str) -> Result<bool, TaskpilotError> {
        queries::tasks::delete_task(self.db()?, owner_id, task_id).await
    }

    // --- Conversation Store ---

    async fn create_conversation(
        &self,
        conversation: &Conversation,
    ) -> Result<(), TaskpilotError> {
        queries::conversations::create_conversation(self.db()?, conversation).await
    }

    async fn get_conversation(
        &self,
        owner_id: &str,
        conversation_id: &str,
    ) -> Result<Option<Conversation>, TaskpilotError> {
        queries::conversations::get_conversation(self.db()?, owner_id, conversation_id).await
    }

    async fn touch_conversation(
        &self,
        owner_id: &str,
        conversation_id: &str,
        title: Option<&str>,
        updated_at: &str,
    ) -> Result<(), TaskpilotError> {
        queries::conversations::touch_conversation(
            self.db()?,
            owner_id,
            conversation_id,
            title,
            updated_at,
        )
        .await
    }

    async fn insert_message(&self, message: &Message) -> Result<(), TaskpilotError> {
        queries::messages::insert_message(self.db()?, message).await
    }

    async fn messages_for_conversation(
        &self,
        owner_id: &str,
        conversation_id: &str,
        limit: Option<i64>,
    ) -> Result<Vec<Message>, TaskpilotError> {
        queries::messages::messages_for_conversation(self.db()?, owner_id, conversation_id, limit)
            .await
    }
}
