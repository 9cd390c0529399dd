// SPDX-FileCopyrightText: 2026 Taskpilot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Figment-to-miette error bridge.
//!
//! Converts Figment deserialization errors into miette diagnostics with
//! valid key listings so a startup misconfiguration reads like a compiler
//! error rather than a serde backtrace.

use miette::Diagnostic;
use thiserror::Error;

/// A configuration error with diagnostic information.
#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    /// An unknown key was found in the configuration.
    #[error("unknown configuration key `{key}`")]
    #[diagnostic(
        code(taskpilot::config::unknown_key),
        help("valid keys: {valid_keys}")
    )]
    UnknownKey {
        /// The unrecognized key name.
        key: String,
        /// List of valid keys for the section.
        valid_keys: String,
    },

    /// A configuration value has the wrong type.
    #[error("invalid type for key `{key}`: {detail}")]
    #[diagnostic(code(taskpilot::config::invalid_type))]
    InvalidType {
        /// The key with the wrong type.
        key: String,
        /// Description of the type mismatch.
        detail: String,
    },

    /// A required configuration key is missing.
    #[error("missing required key `{key}`")]
    #[diagnostic(
        code(taskpilot::config::missing_key),
        help("add `{key} = <value>` to your taskpilot.toml")
    )]
    MissingKey {
        /// The missing key name.
        key: String,
    },

    /// A validation error for a config value.
    #[error("validation error: {message}")]
    #[diagnostic(code(taskpilot::config::validation))]
    Validation {
        /// Description of the validation failure.
        message: String,
    },

    /// Catch-all for other configuration errors.
    #[error("configuration error: {0}")]
    #[diagnostic(code(taskpilot::config::other))]
    Other(String),
}

/// Convert a `figment::Error` into a list of `ConfigError` diagnostics.
///
/// A single figment error may contain multiple underlying errors; all of
/// them are surfaced at once.
pub fn figment_to_config_errors(err: figment::Error) -> Vec<ConfigError> {
    use figment::error::Kind;

    let mut errors = Vec::new();

    for error in err {
        let config_error = match &error.kind {
            Kind::UnknownField(field, expected) => ConfigError::UnknownKey {
                key: field.clone(),
                valid_keys: expected.join(", "),
            },
            Kind::MissingField(field) => ConfigError::MissingKey {
                key: field.clone().into_owned(),
            },
            Kind::InvalidType(actual, expected) => {
                let key = error
                    .path
                    .iter()
                    .map(|s| s.to_string())
                    .collect::<Vec<_>>()
                    .join(".");
                ConfigError::InvalidType {
                    key,
                    detail: format!("found {actual}, expected {expected}"),
                }
            }
            _ => ConfigError::Other(format!("{error}")),
        };

        errors.push(config_error);
    }

    errors
}

/// Render all config errors to stderr via miette's fancy report handler.
pub fn render_errors(errors: &[ConfigError]) {
    for error in errors {
        let report = miette::Report::msg(format!("{error}"));
        eprintln!("{report:?}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::load_config_from_str;

    #[test]
    fn unknown_key_becomes_diagnostic() {
        let err = load_config_from_str("[agent]\nnaem = \"x\"\n").unwrap_err();
        let errors = figment_to_config_errors(err);
        assert!(!errors.is_empty());
        assert!(
            errors
                .iter()
                .any(|e| matches!(e, ConfigError::UnknownKey { .. }))
        );
    }

    #[test]
    fn invalid_type_becomes_diagnostic() {
        let err = load_config_from_str("[gateway]\nport = \"not-a-port\"\n").unwrap_err();
        let errors = figment_to_config_errors(err);
        assert!(!errors.is_empty());
    }
}
