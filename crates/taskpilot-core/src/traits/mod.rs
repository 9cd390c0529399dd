// SPDX-FileCopyrightText: 2026 Taskpilot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Adapter traits at the seams of the system.

pub mod provider;
pub mod storage;

pub use provider::ProviderAdapter;
pub use storage::StorageAdapter;
