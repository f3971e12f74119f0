// SPDX-FileCopyrightText: 2026 Officiant Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `officiant decode` command implementation.

use chrono::{NaiveDate, Utc};
use clap::ValueEnum;

use officiant_core::error::OfficiantError;
use officiant_core::types::{EntryId, LogEntry};
use officiant_decode::{Message, decode_panel, decode_roll, parse_sent_at};

/// What to decode the entry as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DecodeKind {
    Message,
    Panel,
    Roll,
}

/// Decodes a rendered entry and returns the typed result as pretty JSON.
pub fn decode_text(
    kind: DecodeKind,
    raw: &str,
    author: &str,
    expected_owner: Option<&str>,
    today: NaiveDate,
) -> Result<String, OfficiantError> {
    let entry = entry_from_text(raw, author, today);
    let message = Message::decode(&entry);

    let json = match kind {
        DecodeKind::Message => serde_json::to_string_pretty(&message),
        DecodeKind::Panel => {
            let owner = expected_owner
                .map(str::to_string)
                .unwrap_or_else(|| addressed_owner(&message.content));
            serde_json::to_string_pretty(&decode_panel(&message, &owner)?)
        }
        DecodeKind::Roll => serde_json::to_string_pretty(&decode_roll(&message)?),
    };
    json.map_err(|err| OfficiantError::Internal(format!("cannot serialize result: {err}")))
}

/// Builds a log entry from pasted text. The send time is read from the
/// first header line that looks like a display timestamp.
fn entry_from_text(raw: &str, author: &str, today: NaiveDate) -> LogEntry {
    let raw = raw.trim_end_matches(['\n', '\r']);
    let sent_at = raw
        .lines()
        .take(6)
        .find_map(|line| parse_sent_at(line.trim(), today))
        .unwrap_or_else(Utc::now);
    LogEntry::new(EntryId(0), author, raw, sent_at)
}

/// The account a panel addresses, used when no owner is given.
fn addressed_owner(content: &str) -> String {
    content
        .lines()
        .next()
        .and_then(|line| line.split(',').next())
        .unwrap_or_default()
        .trim()
        .to_string()
}
