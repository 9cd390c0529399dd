// SPDX-FileCopyrightText: 2026 Taskpilot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core trait definitions, error types, and domain types for the Taskpilot
//! conversational task assistant.
//!
//! Every other crate in the workspace depends on this one. It defines:
//! - [`TaskpilotError`], the single error type crossing crate boundaries
//! - The persisted domain entities ([`Task`], [`Conversation`], [`Message`])
//! - The provider wire model ([`ProviderRequest`], [`ProviderResponse`])
//! - The [`ProviderAdapter`] and [`StorageAdapter`] seams

pub mod error;
pub mod traits;
pub mod types;

pub use error::TaskpilotError;
pub use traits::provider::ProviderAdapter;
pub use traits::storage::StorageAdapter;
