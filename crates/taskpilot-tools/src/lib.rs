// SPDX-FileCopyrightText: 2026 Taskpilot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The closed set of task-management tools exposed to the model, plus the
//! dispatcher that executes them.
//!
//! The [`ToolDispatcher`] is the only path from model output to the Task
//! Store. It injects the authenticated owner identity into every call,
//! validates arguments, and converts every failure into a structured,
//! sanitized JSON error -- a Rust error never crosses the dispatcher
//! boundary.

pub mod dispatcher;
pub mod error;
pub mod tasks;
pub mod tool;

pub use dispatcher::{ToolDispatcher, ToolOutput};
pub use error::ToolError;
pub use tool::{Tool, ToolRegistry};
