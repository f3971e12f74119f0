// SPDX-FileCopyrightText: 2026 Officiant Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Decoders for the shared channel log.
//!
//! [`Message::decode`] classifies a rendered [`LogEntry`](officiant_core::LogEntry)
//! and strips its header. [`StatusPanel`] and [`Roll`] turn confirmed
//! responses into typed game state. All decoding is pure: the live UI is
//! never consulted here.

pub mod message;
pub mod panel;
pub mod roll;
pub mod timestamp;

pub use message::{COMMAND_DISABLED_MARKER, Message};
pub use panel::{PanelField, PanelSchema, RowRule, RowSpec, StatusPanel};
pub use roll::{FALLBACK_SERIES, Roll, UNRANKED};
pub use timestamp::parse_sent_at;

use officiant_core::error::OfficiantError;

/// Decodes a status response written for `expected_owner`.
pub fn decode_panel(message: &Message, expected_owner: &str) -> Result<StatusPanel, OfficiantError> {
    StatusPanel::decode(message, expected_owner)
}

/// Decodes a roll-family response.
pub fn decode_roll(message: &Message) -> Result<Roll, OfficiantError> {
    Roll::decode(message)
}
