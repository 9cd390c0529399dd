// SPDX-FileCopyrightText: 2026 Taskpilot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Taskpilot assistant.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup.

use serde::{Deserialize, Serialize};

/// Top-level Taskpilot configuration.
///
/// Loaded from TOML files following the XDG hierarchy, with environment
/// variable overrides. All sections are optional and default to sensible
/// values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct TaskpilotConfig {
    /// Agent identity and think/act loop settings.
    #[serde(default)]
    pub agent: AgentConfig,

    /// Anthropic API settings.
    #[serde(default)]
    pub anthropic: AnthropicConfig,

    /// Storage backend settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// HTTP gateway settings.
    #[serde(default)]
    pub gateway: GatewayConfig,
}

/// Agent identity and behavior configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AgentConfig {
    /// Display name of the assistant.
    #[serde(default = "default_agent_name")]
    pub name: String,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Maximum provider round-trips per request before the think/act loop
    /// gives up with a generic reply.
    #[serde(default = "default_max_tool_iterations")]
    pub max_tool_iterations: u32,

    /// Maximum number of prior messages loaded as conversation context.
    #[serde(default = "default_history_limit")]
    pub history_limit: i64,

    /// Inline system persona override. When unset the built-in persona is used.
    #[serde(default)]
    pub system_prompt: Option<String>,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            name: default_agent_name(),
            log_level: default_log_level(),
            max_tool_iterations: default_max_tool_iterations(),
            history_limit: default_history_limit(),
            system_prompt: None,
        }
    }
}

fn default_agent_name() -> String {
    "taskpilot".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_max_tool_iterations() -> u32 {
    5
}

fn default_history_limit() -> i64 {
    50
}

/// Anthropic API configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AnthropicConfig {
    /// API key. Falls back to the `ANTHROPIC_API_KEY` environment variable.
    #[serde(default)]
    pub api_key: Option<String>,

    /// API version header value.
    #[serde(default = "default_api_version")]
    pub api_version: String,

    /// Model identifier used for every request.
    #[serde(default = "default_model")]
    pub default_model: String,

    /// Maximum tokens to generate per completion.
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Whole-request timeout in seconds. A timed-out call surfaces as a
    /// retryable error rather than hanging the request.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl Default for AnthropicConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_version: default_api_version(),
            default_model: default_model(),
            max_tokens: default_max_tokens(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

fn default_api_version() -> String {
    "2023-06-01".to_string()
}

fn default_model() -> String {
    "claude-sonnet-4-20250514".to_string()
}

fn default_max_tokens() -> u32 {
    1024
}

fn default_request_timeout_secs() -> u64 {
    60
}

/// Storage backend configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
        }
    }
}

fn default_database_path() -> String {
    dirs::data_dir()
        .map(|d| d.join("taskpilot/taskpilot.db").display().to_string())
        .unwrap_or_else(|| "taskpilot.db".to_string())
}

/// HTTP gateway configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct GatewayConfig {
    /// Host address to bind.
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to bind.
    #[serde(default = "default_port")]
    pub port: u16,

    /// HMAC secret used to verify bearer tokens. When unset the gateway
    /// rejects every request (fail-closed).
    #[serde(default)]
    pub auth_secret: Option<String>,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            auth_secret: None,
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8787
}
