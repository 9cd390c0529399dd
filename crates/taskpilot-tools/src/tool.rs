// SPDX-FileCopyrightText: 2026 Taskpilot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Tool trait and registry.
//!
//! The [`Tool`] trait defines the unified interface for the task-management
//! operations. The [`ToolRegistry`] manages tool lookup by name and
//! generates the tool definitions handed to the LLM provider.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use taskpilot_core::types::ToolSpec;

use crate::error::ToolError;

/// Unified trait for the assistant's tools.
///
/// Every tool provides a name, description, JSON Schema for its parameters,
/// and an async `invoke`. The owner identity is a separate trusted argument
/// and never part of the model-supplied `input` JSON -- the dispatcher
/// strips any identity key the model tries to smuggle in.
#[async_trait]
pub trait Tool: Send + Sync {
    /// The tool's unique name (used for lookup and API serialization).
    fn name(&self) -> &str;

    /// Human-readable description of what the tool does, written for the
    /// model.
    fn description(&self) -> &str;

    /// JSON Schema describing the tool's input parameters.
    fn parameters_schema(&self) -> serde_json::Value;

    /// Executes the tool for `owner_id` with the parsed JSON input.
    async fn invoke(
        &self,
        owner_id: &str,
        input: serde_json::Value,
    ) -> Result<serde_json::Value, ToolError>;
}

/// Registry of available tools, indexed by name.
pub struct ToolRegistry {
    tools: HashMap<String, Arc<dyn Tool>>,
}

impl ToolRegistry {
    /// Creates an empty tool registry.
    pub fn new() -> Self {
        Self {
            tools: HashMap::new(),
        }
    }

    /// Registers a tool. The tool is indexed by its `name()`.
    pub fn register(&mut self, tool: Arc<dyn Tool>) {
        self.tools.insert(tool.name().to_string(), tool);
    }

    /// Looks up a tool by name.
    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.get(name).cloned()
    }

    /// Returns provider-format tool definitions for all registered tools,
    /// sorted by name for a stable prompt.
    pub fn specs(&self) -> Vec<ToolSpec> {
        let mut specs: Vec<ToolSpec> = self
            .tools
            .values()
            .map(|t| ToolSpec {
                name: t.name().to_string(),
                description: t.description().to_string(),
                input_schema: t.parameters_schema(),
            })
            .collect();
        specs.sort_by(|a, b| a.name.cmp(&b.name));
        specs
    }

    /// Returns the number of registered tools.
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// Returns true if no tools are registered.
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}
