// SPDX-FileCopyrightText: 2026 Taskpilot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Gateway HTTP server built on axum.
//!
//! Sets up routes, middleware, and shared state for the gateway.

use std::sync::Arc;

use axum::{
    Router,
    middleware as axum_middleware,
    routing::{get, post},
};
use taskpilot_agent::{AgentOrchestrator, HistoryAssembler};
use taskpilot_core::{StorageAdapter, TaskpilotError};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::auth::{AuthConfig, auth_middleware};
use crate::handlers;

/// Shared state for axum request handlers.
#[derive(Clone)]
pub struct GatewayState {
    /// Persistence backend for conversations and messages.
    pub storage: Arc<dyn StorageAdapter>,
    /// The think/act loop driver.
    pub orchestrator: Arc<AgentOrchestrator>,
    /// Stateless history assembly.
    pub history: Arc<HistoryAssembler>,
    /// Authentication configuration.
    pub auth: AuthConfig,
}

/// Server bind configuration (mirrors GatewayConfig from taskpilot-config).
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Host address to bind.
    pub host: String,
    /// Port to bind.
    pub port: u16,
}

/// Builds the gateway router.
///
/// - GET /health is public.
/// - POST /{owner_id}/chat requires a bearer token.
pub fn router(state: GatewayState) -> Router {
    let public_routes = Router::new().route("/health", get(handlers::get_health));

    let api_routes = Router::new()
        .route("/{owner_id}/chat", post(handlers::post_chat))
        .route_layer(axum_middleware::from_fn_with_state(
            state.auth.clone(),
            auth_middleware,
        ))
        .with_state(state);

    Router::new()
        .merge(public_routes)
        .merge(api_routes)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

/// Starts the gateway HTTP server and serves until the process exits.
pub async fn start_server(config: &ServerConfig, state: GatewayState) -> Result<(), TaskpilotError> {
    let app = router(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| TaskpilotError::Internal(format!("failed to bind gateway to {addr}: {e}")))?;

    tracing::info!("gateway listening on {addr}");

    axum::serve(listener, app)
        .await
        .map_err(|e| TaskpilotError::Internal(format!("gateway server error: {e}")))?;

    Ok(())
}
