// SPDX-FileCopyrightText: 2026 Taskpilot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration system for the Taskpilot assistant.
//!
//! TOML configuration with strict parsing (`deny_unknown_fields`), XDG file
//! hierarchy lookup, environment variable overrides, and miette-rendered
//! diagnostics at startup.

pub mod diagnostic;
pub mod loader;
pub mod model;
pub mod validation;

pub use diagnostic::{ConfigError, render_errors};
pub use loader::{load_config, load_config_from_path, load_config_from_str};
pub use model::TaskpilotConfig;

/// Load configuration from the XDG hierarchy and validate it.
///
/// Returns either a valid [`TaskpilotConfig`] or the full list of diagnostic
/// errors (loading and validation do not fail fast).
pub fn load_and_validate() -> Result<TaskpilotConfig, Vec<ConfigError>> {
    match loader::load_config() {
        Ok(config) => {
            validation::validate_config(&config)?;
            Ok(config)
        }
        Err(err) => Err(diagnostic::figment_to_config_errors(err)),
    }
}

/// Load configuration from a TOML string and validate it. Test/tooling entry.
pub fn load_and_validate_str(toml_content: &str) -> Result<TaskpilotConfig, Vec<ConfigError>> {
    match loader::load_config_from_str(toml_content) {
        Ok(config) => {
            validation::validate_config(&config)?;
            Ok(config)
        }
        Err(err) => Err(diagnostic::figment_to_config_errors(err)),
    }
}
