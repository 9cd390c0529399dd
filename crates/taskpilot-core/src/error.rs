// SPDX-FileCopyrightText: 2026 Taskpilot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Taskpilot assistant.

use thiserror::Error;

/// The primary error type used across all Taskpilot crates.
///
/// Variants map onto the error taxonomy exposed to callers and to the
/// model: validation, not-found, permission, storage, provider, timeout,
/// and internal failures.
#[derive(Debug, Error)]
pub enum TaskpilotError {
    /// Configuration errors (invalid TOML, missing required fields, type mismatches).
    #[error("configuration error: {0}")]
    Config(String),

    /// Storage backend errors (database connection, query failure, serialization).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Input failed shape or bounds validation.
    #[error("validation error: {message}")]
    Validation { message: String },

    /// Referenced entity absent, or owned by a different caller.
    ///
    /// Foreign-owned entities are deliberately reported as not found so that
    /// their existence never leaks across owners.
    #[error("not found: {message}")]
    NotFound { message: String },

    /// Caller identity does not match the data it is trying to touch.
    #[error("permission denied: {message}")]
    PermissionDenied { message: String },

    /// LLM provider errors (API failure, token limits, model not found).
    #[error("provider error: {message}")]
    Provider {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Operation timed out.
    #[error("operation timed out after {duration:?}")]
    Timeout { duration: std::time::Duration },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl TaskpilotError {
    /// Stable machine-readable code for the error taxonomy.
    pub fn code(&self) -> &'static str {
        match self {
            TaskpilotError::Validation { .. } => "VALIDATION_ERROR",
            TaskpilotError::NotFound { .. } => "NOT_FOUND",
            TaskpilotError::PermissionDenied { .. } => "PERMISSION_DENIED",
            TaskpilotError::Storage { .. } => "DATABASE_ERROR",
            TaskpilotError::Config(_)
            | TaskpilotError::Provider { .. }
            | TaskpilotError::Timeout { .. }
            | TaskpilotError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Whether a caller may reasonably retry the same request.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            TaskpilotError::Timeout { .. }
                | TaskpilotError::Provider { .. }
                | TaskpilotError::Storage { .. }
        )
    }
}
