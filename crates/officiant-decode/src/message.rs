// SPDX-FileCopyrightText: 2026 Officiant Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Classification of rendered log entries into typed [`Message`]s.
//!
//! The chat client renders every entry as a block of lines whose header
//! depends on how the entry was produced. Decoding strips that header and
//! records who invoked which command. It is a pure function of the entry,
//! never fails, and degrades unrecognized shapes to plain text.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use officiant_core::types::{Command, CommandRef, EntryId, LogEntry, MessageSource};

/// Second header line of a slash command response.
pub const SLASH_INVOCATION_MARKER: &str = " used ";

/// Second header line of a response to a text-triggered bot command.
pub const BOT_MARKER: &str = "BOT";

/// Platform text shown in place of a response when a command is turned off.
pub const COMMAND_DISABLED_MARKER: &str = "Command DISABLED for this channel";

/// Content the client shows while a slash command response is still pending.
const SENDING_PLACEHOLDER: &str = "Sending command...";

/// Header line counts stripped per source.
const SLASH_HEADER_LINES: usize = 6;
const BOT_HEADER_LINES: usize = 3;
const GROUPED_HEADER_LINES: usize = 2;

/// A typed view over one [`LogEntry`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: EntryId,
    pub author: String,
    pub sent_at: DateTime<Utc>,
    pub source: MessageSource,
    /// Who invoked the command, for slash invocations.
    pub invoking_user: Option<String>,
    /// The invoked command; `None` for anything other than a slash invocation.
    pub command: Option<CommandRef>,
    /// The entry's lines with the source-specific header removed.
    pub content: String,
}

impl Message {
    /// Decodes one log entry. Total and deterministic.
    pub fn decode(entry: &LogEntry) -> Self {
        let lines = entry.rendered_lines();

        let (source, invoking_user, command, body) = if lines.len() == 1 {
            (MessageSource::PlainText, None, None, &lines[..])
        } else if lines[1] == SLASH_INVOCATION_MARKER {
            let invoker = lines[0].trim_start_matches('@').to_string();
            let command = CommandRef::parse(lines.get(2).copied().unwrap_or_default());
            (
                MessageSource::SlashCommandInvocation,
                Some(invoker),
                Some(command),
                lines.get(SLASH_HEADER_LINES..).unwrap_or_default(),
            )
        } else if lines[1] == BOT_MARKER {
            (
                MessageSource::TextTriggeredCommand,
                None,
                None,
                lines.get(BOT_HEADER_LINES..).unwrap_or_default(),
            )
        } else {
            (
                MessageSource::PlainText,
                None,
                None,
                lines.get(GROUPED_HEADER_LINES..).unwrap_or_default(),
            )
        };

        Self {
            id: entry.id,
            author: entry.author_display_name.clone(),
            sent_at: entry.sent_at,
            source,
            invoking_user,
            command,
            content: body.join("\n"),
        }
    }

    /// The known command this message answers, if any.
    pub fn known_command(&self) -> Option<Command> {
        self.command.as_ref().and_then(CommandRef::known)
    }

    /// True while a slash command response has not finished rendering.
    pub fn is_sending_placeholder(&self) -> bool {
        self.source == MessageSource::SlashCommandInvocation
            && (self.content.is_empty() || self.content == SENDING_PLACEHOLDER)
    }

    /// True when the platform refused the command.
    pub fn is_command_disabled(&self) -> bool {
        self.content.contains(COMMAND_DISABLED_MARKER)
    }

    /// Describes the carried command for error messages.
    pub fn command_label(&self) -> String {
        match &self.command {
            Some(command) => command.to_string(),
            None => "no command".to_string(),
        }
    }
}
