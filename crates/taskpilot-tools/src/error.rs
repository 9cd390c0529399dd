// SPDX-FileCopyrightText: 2026 Taskpilot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Structured tool errors.
//!
//! Absent and foreign-owned entities share the [`ToolError::NotFound`]
//! variant on purpose: reporting them differently would leak the existence
//! of other users' data.

use taskpilot_core::TaskpilotError;
use taskpilot_security::sanitize_error_message;
use thiserror::Error;

/// Error produced by a tool invocation.
#[derive(Debug, Error)]
pub enum ToolError {
    /// Arguments failed shape or bounds validation.
    #[error("{message}")]
    Validation {
        message: String,
        details: Option<serde_json::Value>,
    },

    /// Referenced entity absent, or owned by a different caller.
    #[error("{message}")]
    NotFound { message: String },

    /// Caller identity mismatch.
    #[error("{message}")]
    PermissionDenied { message: String },

    /// Storage layer failure.
    #[error("{message}")]
    Database { message: String },

    /// Unexpected failure inside a tool.
    #[error("{message}")]
    Internal { message: String },
}

impl ToolError {
    /// Convenience constructor for validation failures.
    pub fn validation(message: impl Into<String>) -> Self {
        ToolError::Validation {
            message: message.into(),
            details: None,
        }
    }

    /// Convenience constructor for not-found failures.
    pub fn not_found(message: impl Into<String>) -> Self {
        ToolError::NotFound {
            message: message.into(),
        }
    }

    /// Stable machine-readable code.
    pub fn code(&self) -> &'static str {
        match self {
            ToolError::Validation { .. } => "VALIDATION_ERROR",
            ToolError::NotFound { .. } => "NOT_FOUND",
            ToolError::PermissionDenied { .. } => "PERMISSION_DENIED",
            ToolError::Database { .. } => "DATABASE_ERROR",
            ToolError::Internal { .. } => "INTERNAL_ERROR",
        }
    }

    /// The JSON shape returned across the dispatcher boundary.
    ///
    /// The message is sanitized first: tool results may be forwarded
    /// verbatim into a model prompt or shown to the end user.
    pub fn to_value(&self) -> serde_json::Value {
        let mut value = serde_json::json!({
            "error": sanitize_error_message(&self.to_string()),
            "code": self.code(),
        });
        if let ToolError::Validation {
            details: Some(details),
            ..
        } = self
        {
            value["details"] = details.clone();
        }
        value
    }
}

impl From<TaskpilotError> for ToolError {
    fn from(err: TaskpilotError) -> Self {
        match err {
            TaskpilotError::Validation { message } => ToolError::Validation {
                message,
                details: None,
            },
            TaskpilotError::NotFound { message } => ToolError::NotFound { message },
            TaskpilotError::PermissionDenied { message } => ToolError::PermissionDenied { message },
            TaskpilotError::Storage { source } => ToolError::Database {
                message: source.to_string(),
            },
            other => ToolError::Internal {
                message: other.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_value_carries_code() {
        let value = ToolError::not_found("Task not found").to_value();
        assert_eq!(value["error"], "Task not found");
        assert_eq!(value["code"], "NOT_FOUND");
        assert!(value.get("details").is_none());
    }

    #[test]
    fn database_errors_are_sanitized() {
        let err = ToolError::Database {
            message: "cannot open /var/lib/taskpilot/taskpilot.db".to_string(),
        };
        let value = err.to_value();
        assert_eq!(value["code"], "DATABASE_ERROR");
        let msg = value["error"].as_str().unwrap();
        assert!(!msg.contains("/var/lib"), "path leaked: {msg}");
    }

    #[test]
    fn validation_details_are_attached() {
        let err = ToolError::Validation {
            message: "title too long".to_string(),
            details: Some(serde_json::json!({"field": "title"})),
        };
        let value = err.to_value();
        assert_eq!(value["details"]["field"], "title");
    }
}
