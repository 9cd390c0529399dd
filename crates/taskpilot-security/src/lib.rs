// SPDX-FileCopyrightText: 2026 Taskpilot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Sanitization of error text before it leaves the system.
//!
//! Tool results and error messages may be forwarded verbatim into a model
//! prompt or shown to the end user, so anything resembling a connection
//! string, credential, or filesystem path is scrubbed first.

pub mod sanitize;

pub use sanitize::sanitize_error_message;
