// SPDX-FileCopyrightText: 2026 Officiant Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Officiant roll automation.

use thiserror::Error;

/// The primary error type used across decoders, the correlator, and the session runner.
#[derive(Debug, Error)]
pub enum OfficiantError {
    /// Configuration errors (invalid TOML, unresolved account references, bad commands).
    #[error("configuration error: {0}")]
    Config(String),

    /// A decoder was handed a message carrying a different command.
    #[error("expected a `{expected}` response but received {received}")]
    WrongCommand { expected: String, received: String },

    /// A status panel is shorter than its row schema.
    #[error("status panel is missing row {row} ({field}); only {available} rows present")]
    MalformedPanel {
        row: usize,
        field: &'static str,
        available: usize,
    },

    /// A response belongs to a different account than the one that asked.
    #[error("response belongs to `{received}`, expected `{expected}`")]
    IdentityMismatch { expected: String, received: String },

    /// No new log entry appeared above the watermark within the poll cap.
    #[error("no response to `{command}` after {attempts} polls")]
    ResponseTimeout { command: String, attempts: u32 },

    /// New entries appeared but none could be tied to the request.
    #[error("could not correlate a response to `{command}`")]
    CorrelationFailed { command: String },

    /// The platform refused the command in this channel.
    #[error("command `{command}` is disabled for this channel")]
    CommandDisabled { command: String },

    /// Stale element references, intercepted clicks and similar short-lived UI failures.
    #[error("transient UI failure: {message}")]
    TransientUi { message: String },

    /// Non-recoverable UI failures reported by the surface.
    #[error("UI error: {message}")]
    Ui {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl OfficiantError {
    /// True for failures worth retrying at the point of occurrence.
    pub fn is_transient(&self) -> bool {
        matches!(self, OfficiantError::TransientUi { .. })
    }

    /// True when a response could not be located for an issued command.
    pub fn is_correlation_miss(&self) -> bool {
        matches!(
            self,
            OfficiantError::ResponseTimeout { .. } | OfficiantError::CorrelationFailed { .. }
        )
    }

    /// True when a status panel had fewer rows than its schema needs.
    pub fn is_structural(&self) -> bool {
        matches!(self, OfficiantError::MalformedPanel { .. })
    }
}
