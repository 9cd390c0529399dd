// SPDX-FileCopyrightText: 2026 Taskpilot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Conversation assembly and the think/act orchestrator loop.

pub mod history;
pub mod instructions;
pub mod orchestrator;

pub use history::{AssembledHistory, HistoryAssembler};
pub use instructions::SYSTEM_INSTRUCTIONS;
pub use orchestrator::{AgentOrchestrator, AgentOutcome};
