// SPDX-FileCopyrightText: 2026 Taskpilot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test harness for end-to-end integration testing.
//!
//! `TestHarness` assembles a complete assistant stack with a mock provider,
//! a temp SQLite database, the five task tools, and the orchestrator.

use std::sync::Arc;

use taskpilot_agent::{AgentOrchestrator, HistoryAssembler, SYSTEM_INSTRUCTIONS};
use taskpilot_config::model::StorageConfig;
use taskpilot_core::types::ProviderResponse;
use taskpilot_core::{StorageAdapter, TaskpilotError};
use taskpilot_storage::SqliteStorage;
use taskpilot_tools::ToolDispatcher;

use crate::mock_provider::MockProvider;

/// Builder for creating test environments with configurable options.
pub struct TestHarnessBuilder {
    responses: Vec<ProviderResponse>,
    max_tool_iterations: u32,
    history_limit: i64,
}

impl TestHarnessBuilder {
    fn new() -> Self {
        Self {
            responses: Vec::new(),
            max_tool_iterations: 5,
            history_limit: 50,
        }
    }

    /// Set mock provider responses.
    pub fn with_responses(mut self, responses: Vec<ProviderResponse>) -> Self {
        self.responses = responses;
        self
    }

    /// Override the think/act iteration bound.
    pub fn with_max_tool_iterations(mut self, bound: u32) -> Self {
        self.max_tool_iterations = bound;
        self
    }

    /// Override the history window.
    pub fn with_history_limit(mut self, limit: i64) -> Self {
        self.history_limit = limit;
        self
    }

    /// Build the test harness, creating all required subsystems.
    pub async fn build(self) -> Result<TestHarness, TaskpilotError> {
        let temp_dir = tempfile::TempDir::new()
            .map_err(|e| TaskpilotError::Storage { source: e.into() })?;
        let storage_config = StorageConfig {
            database_path: temp_dir.path().join("test.db").display().to_string(),
        };
        let storage = SqliteStorage::new(storage_config);
        storage.initialize().await?;
        let storage: Arc<dyn StorageAdapter> = Arc::new(storage);

        let provider = Arc::new(MockProvider::with_responses(self.responses));
        let dispatcher = Arc::new(ToolDispatcher::with_task_tools(storage.clone()));
        let orchestrator = Arc::new(AgentOrchestrator::new(
            provider.clone(),
            dispatcher,
            SYSTEM_INSTRUCTIONS.to_string(),
            "test-model".to_string(),
            512,
            self.max_tool_iterations,
        ));
        let history = Arc::new(HistoryAssembler::new(storage.clone(), self.history_limit));

        Ok(TestHarness {
            storage,
            provider,
            orchestrator,
            history,
            _temp_dir: temp_dir,
        })
    }
}

/// A fully assembled assistant stack on a temp database.
pub struct TestHarness {
    pub storage: Arc<dyn StorageAdapter>,
    pub provider: Arc<MockProvider>,
    pub orchestrator: Arc<AgentOrchestrator>,
    pub history: Arc<HistoryAssembler>,
    _temp_dir: tempfile::TempDir,
}

impl TestHarness {
    /// Start building a harness.
    pub fn builder() -> TestHarnessBuilder {
        TestHarnessBuilder::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn harness_drives_a_full_cycle() {
        let harness = TestHarness::builder()
            .with_responses(vec![
                MockProvider::tool_use_response(
                    "add_task",
                    serde_json::json!({"title": "water plants"}),
                ),
                MockProvider::text_response("Done! Added 'water plants'."),
            ])
            .build()
            .await
            .unwrap();

        let outcome = harness
            .orchestrator
            .run("u1", vec![], "remind me to water the plants")
            .await
            .unwrap();

        assert!(outcome.reply.contains("water plants"));
        let tasks = harness.storage.list_tasks("u1", None).await.unwrap();
        assert_eq!(tasks.len(), 1);
    }
}
