// SPDX-FileCopyrightText: 2026 Taskpilot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP gateway for the Taskpilot assistant.
//!
//! Exposes the chat endpoint and health probe, authenticates callers with
//! HMAC bearer tokens, and drives the request cycle end to end.

pub mod auth;
pub mod handlers;
pub mod server;

pub use auth::{AuthConfig, CallerIdentity, sign_token};
pub use handlers::{ChatRequest, ChatResponse};
pub use server::{GatewayState, ServerConfig, router, start_server};
