// SPDX-FileCopyrightText: 2026 Taskpilot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Shared test utilities: a scripted mock provider and a full-stack harness.

pub mod harness;
pub mod mock_provider;

pub use harness::{TestHarness, TestHarnessBuilder};
pub use mock_provider::MockProvider;
