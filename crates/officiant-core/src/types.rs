// SPDX-FileCopyrightText: 2026 Officiant Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types shared by the decoders, the correlator, and the session runner.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoStaticStr};

/// Position of an entry in the shared channel log. Later entries have larger ids.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct EntryId(pub u64);

impl std::fmt::Display for EntryId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One immutable entry of the shared channel log, as rendered by the chat client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    pub id: EntryId,
    pub author_display_name: String,
    pub raw_text: String,
    /// May be approximate; the chat client renders minute precision in some views.
    pub sent_at: DateTime<Utc>,
}

impl LogEntry {
    pub fn new(
        id: EntryId,
        author_display_name: impl Into<String>,
        raw_text: impl Into<String>,
        sent_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            author_display_name: author_display_name.into(),
            raw_text: raw_text.into(),
            sent_at,
        }
    }

    /// The raw block split on line breaks, in display order.
    pub fn rendered_lines(&self) -> Vec<&str> {
        self.raw_text.split('\n').collect()
    }
}

/// How an entry came to be in the log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageSource {
    PlainText,
    TextTriggeredCommand,
    SlashCommandInvocation,
}

/// Health status reported by a surface before a session starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    Healthy,
    Degraded(String),
    Unhealthy(String),
}

/// The game bot's slash commands, addressed by their invocation text.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Display,
    EnumString,
    EnumIter,
    IntoStaticStr,
    Serialize,
    Deserialize,
)]
pub enum Command {
    #[strum(to_string = "/tu")]
    #[serde(rename = "/tu")]
    TimersUp,
    #[strum(to_string = "/rollsutil tuarrange")]
    #[serde(rename = "/rollsutil tuarrange")]
    TimersUpArrange,
    #[strum(to_string = "/pokeslot")]
    #[serde(rename = "/pokeslot")]
    Pokeslot,
    #[strum(to_string = "/rollsutil resetclaimtimer")]
    #[serde(rename = "/rollsutil resetclaimtimer")]
    ResetClaimTimer,
    #[strum(to_string = "/daily")]
    #[serde(rename = "/daily")]
    Daily,
    #[strum(to_string = "/kakera dailyk")]
    #[serde(rename = "/kakera dailyk")]
    DailyKakera,
    #[strum(to_string = "/note")]
    #[serde(rename = "/note")]
    Note,
    #[strum(to_string = "/mk")]
    #[serde(rename = "/mk")]
    RollKakera,
    #[strum(to_string = "/mx")]
    #[serde(rename = "/mx")]
    RollAny,
    #[strum(to_string = "/ma")]
    #[serde(rename = "/ma")]
    RollAnyAnimanga,
    #[strum(to_string = "/mg")]
    #[serde(rename = "/mg")]
    RollAnyGame,
    #[strum(to_string = "/wx")]
    #[serde(rename = "/wx")]
    RollWaifu,
    #[strum(to_string = "/wa")]
    #[serde(rename = "/wa")]
    RollWaifuAnimanga,
    #[strum(to_string = "/wg")]
    #[serde(rename = "/wg")]
    RollWaifuGame,
    #[strum(to_string = "/hx")]
    #[serde(rename = "/hx")]
    RollHusbando,
    #[strum(to_string = "/ha")]
    #[serde(rename = "/ha")]
    RollHusbandoAnimanga,
    #[strum(to_string = "/hg")]
    #[serde(rename = "/hg")]
    RollHusbandoGame,
}

/// Parameter for [`Command::TimersUpArrange`] that lays the status panel out
/// the way the panel decoder's default schema expects.
pub const TIMERS_UP_ARRANGE_PARAM: &str = "claim, rolls, rt, rollsreset, jump, kakerareact, kakerapower, kakerainfo, kakerastock, jump, dk, daily, vote, pokemon";

impl Command {
    /// The text typed into the message box to invoke this command.
    pub fn text(&self) -> &'static str {
        self.into()
    }

    /// Membership in the roll family: every command whose response presents a character roll.
    pub fn is_roll(&self) -> bool {
        matches!(
            self,
            Command::RollKakera
                | Command::RollAny
                | Command::RollAnyAnimanga
                | Command::RollAnyGame
                | Command::RollWaifu
                | Command::RollWaifuAnimanga
                | Command::RollWaifuGame
                | Command::RollHusbando
                | Command::RollHusbandoAnimanga
                | Command::RollHusbandoGame
        )
    }
}

/// The command named in a slash invocation header.
///
/// Unrecognized invocation text is an expected outcome (other bots share the
/// channel), so it is carried as data instead of being an error.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommandRef {
    Known(Command),
    Unknown(String),
}

impl CommandRef {
    /// Resolves invocation text against the known command catalog.
    pub fn parse(text: &str) -> Self {
        text.parse::<Command>()
            .map(CommandRef::Known)
            .unwrap_or_else(|_| CommandRef::Unknown(text.to_string()))
    }

    pub fn known(&self) -> Option<Command> {
        match self {
            CommandRef::Known(command) => Some(*command),
            CommandRef::Unknown(_) => None,
        }
    }

    pub fn is(&self, command: Command) -> bool {
        self.known() == Some(command)
    }
}

impl std::fmt::Display for CommandRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CommandRef::Known(command) => write!(f, "{command}"),
            CommandRef::Unknown(text) => write!(f, "unknown command `{text}`"),
        }
    }
}

/// The clickable controls the bot attaches below a roll.
///
/// Parsed from each control's accessible name.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Display,
    EnumString,
    EnumIter,
    IntoStaticStr,
    Serialize,
    Deserialize,
)]
pub enum ButtonAction {
    #[strum(to_string = "💗")]
    #[serde(rename = "💗")]
    Wish,
    #[strum(to_string = "kakeraP")]
    #[serde(rename = "kakeraP")]
    Purple,
    #[strum(to_string = "kakera")]
    #[serde(rename = "kakera")]
    Blue,
    #[strum(to_string = "kakeraT")]
    #[serde(rename = "kakeraT")]
    Teal,
    #[strum(to_string = "kakeraG")]
    #[serde(rename = "kakeraG")]
    Green,
    #[strum(to_string = "kakeraY")]
    #[serde(rename = "kakeraY")]
    Yellow,
    #[strum(to_string = "kakeraO")]
    #[serde(rename = "kakeraO")]
    Orange,
    #[strum(to_string = "kakeraR")]
    #[serde(rename = "kakeraR")]
    Red,
    #[strum(to_string = "kakeraW")]
    #[serde(rename = "kakeraW")]
    Rainbow,
    #[strum(to_string = "kakeraL")]
    #[serde(rename = "kakeraL")]
    Light,
}

impl ButtonAction {
    pub fn is_kakera(&self) -> bool {
        !matches!(self, ButtonAction::Wish)
    }

    /// Every kakera reaction button.
    pub fn all_kakera() -> Vec<ButtonAction> {
        use strum::IntoEnumIterator;
        ButtonAction::iter().filter(ButtonAction::is_kakera).collect()
    }
}
