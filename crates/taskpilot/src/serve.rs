// SPDX-FileCopyrightText: 2026 Taskpilot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `taskpilot serve` command implementation.
//!
//! Wires SQLite storage, the Anthropic provider, the five task tools, and
//! the orchestrator into the HTTP gateway and serves until the process
//! exits.

use std::sync::Arc;

use taskpilot_agent::{AgentOrchestrator, HistoryAssembler, SYSTEM_INSTRUCTIONS};
use taskpilot_anthropic::AnthropicProvider;
use taskpilot_config::model::TaskpilotConfig;
use taskpilot_core::error::TaskpilotError;
use taskpilot_core::StorageAdapter;
use taskpilot_gateway::{AuthConfig, GatewayState, ServerConfig, start_server};
use taskpilot_storage::SqliteStorage;
use taskpilot_tools::ToolDispatcher;
use tracing::{error, info};

/// Runs the `taskpilot serve` command.
pub async fn run_serve(config: TaskpilotConfig) -> Result<(), TaskpilotError> {
    init_tracing(&config.agent.log_level);

    info!("starting taskpilot serve");

    // Fail-closed: refuse to start without an auth secret.
    let Some(auth_secret) = config.gateway.auth_secret.clone().filter(|s| !s.is_empty())
    else {
        return Err(TaskpilotError::Config(
            "gateway.auth_secret is required. Set it in config or via TASKPILOT_GATEWAY_AUTH_SECRET."
                .to_string(),
        ));
    };

    // Initialize storage.
    let storage = {
        let storage = SqliteStorage::new(config.storage.clone());
        storage.initialize().await?;
        Arc::new(storage) as Arc<dyn StorageAdapter>
    };
    info!(
        database_path = config.storage.database_path.as_str(),
        "storage initialized"
    );

    // Initialize the Anthropic provider.
    let provider = {
        let p = AnthropicProvider::new(&config.anthropic).map_err(|e| {
            error!(error = %e, "failed to initialize Anthropic provider");
            eprintln!(
                "error: Anthropic API key required. Set anthropic.api_key in config or the ANTHROPIC_API_KEY environment variable."
            );
            e
        })?;
        Arc::new(p)
    };

    // The five task tools behind the dispatcher.
    let dispatcher = Arc::new(ToolDispatcher::with_task_tools(storage.clone()));
    info!(tools = dispatcher.specs().len(), "tool dispatcher initialized");

    let system_prompt = config
        .agent
        .system_prompt
        .clone()
        .filter(|p| !p.trim().is_empty())
        .unwrap_or_else(|| SYSTEM_INSTRUCTIONS.to_string());

    let orchestrator = Arc::new(AgentOrchestrator::new(
        provider,
        dispatcher,
        system_prompt,
        config.anthropic.default_model.clone(),
        config.anthropic.max_tokens,
        config.agent.max_tool_iterations,
    ));
    let history = Arc::new(HistoryAssembler::new(
        storage.clone(),
        config.agent.history_limit,
    ));

    let state = GatewayState {
        storage,
        orchestrator,
        history,
        auth: AuthConfig {
            secret: Some(auth_secret),
        },
    };
    let server_config = ServerConfig {
        host: config.gateway.host.clone(),
        port: config.gateway.port,
    };

    start_server(&server_config, state).await
}

/// Initializes the tracing subscriber from the configured log level.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("taskpilot={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .init();
}
