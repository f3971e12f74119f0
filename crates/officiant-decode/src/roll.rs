// SPDX-FileCopyrightText: 2026 Officiant Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Character roll decoding.
//!
//! A roll response lists, in no fully fixed order, an optional wish line,
//! the character name, an optional owner line, an optional rank line, a
//! lone kakera value, and the series. Each structural line is consumed at
//! most once, in a fixed order, and whatever is left becomes the series.

use std::collections::BTreeSet;
use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use officiant_core::error::OfficiantError;
use officiant_core::types::{ButtonAction, Command, EntryId};

use crate::message::Message;

/// Rank assigned to characters without a "Claims" line.
pub const UNRANKED: u32 = 999_999;

/// Series assigned when nothing is left after the structural lines.
pub const FALLBACK_SERIES: &str = "Meme";

const WISHED_BY_MARKER: &str = "Wished by ";
const EDITED_MARKER: &str = "(edited)";
const OWNER_MARKER: &str = "Belongs to ";
const RANK_MARKER: &str = "Claims: #";
const UNCLAIMED_MARKER: &str = "unclaimed";

/// Trailing `Name / Series - 120 ka` style footer.
static FOOTER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^.*/.*- \d+ ka").expect("valid footer pattern"));

/// One character presented in response to a roll command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Roll {
    pub entry_id: EntryId,
    pub command: Command,
    /// Who invoked the roll.
    pub rolled_by: Option<String>,
    pub subject_name: String,
    pub series_name: String,
    /// Lower is better. [`UNRANKED`] when absent.
    pub rank: u32,
    /// Kakera value. 0 when absent.
    pub value: u32,
    pub owner: Option<String>,
    pub wished: bool,
    pub wished_by: BTreeSet<String>,
    /// Controls visible on the latest rendering. Not part of the text decode.
    #[serde(default)]
    pub available_actions: Vec<ButtonAction>,
}

impl Roll {
    /// Decodes a roll-family response.
    pub fn decode(message: &Message) -> Result<Self, OfficiantError> {
        let command = match message.known_command() {
            Some(command) if command.is_roll() => command,
            _ => {
                return Err(OfficiantError::WrongCommand {
                    expected: "a roll command".to_string(),
                    received: message.command_label(),
                });
            }
        };

        let mut lines = Worklist::new(&message.content);

        let wished_line = lines.take_head_if(|line| line.starts_with(WISHED_BY_MARKER));
        let wished = wished_line.is_some();
        let wished_by = wished_line.map(parse_wishers).unwrap_or_default();

        let subject_name = lines
            .take_next()
            .map(|name| name.trim().to_string())
            .unwrap_or_default();

        let owner = lines
            .take_first_if(|line| line.starts_with(OWNER_MARKER))
            .map(|line| line[OWNER_MARKER.len()..].trim().to_string());

        let rank = lines
            .take_first_if(|line| line.starts_with(RANK_MARKER))
            .and_then(|line| digits(line).parse().ok())
            .unwrap_or(UNRANKED);

        let value = lines
            .take_first_if(|line| !line.is_empty() && line.chars().all(|c| c.is_ascii_digit()))
            .and_then(|line| line.parse().ok())
            .unwrap_or(0);

        let series_name = series_from(lines.remaining());

        Ok(Self {
            entry_id: message.id,
            command,
            rolled_by: message.invoking_user.clone(),
            subject_name,
            series_name,
            rank,
            value,
            owner,
            wished,
            wished_by,
            available_actions: Vec::new(),
        })
    }

    /// Attaches the live control set read from the current rendering.
    pub fn with_actions(mut self, actions: Vec<ButtonAction>) -> Self {
        self.available_actions = actions;
        self
    }

    pub fn claimed(&self) -> bool {
        self.owner.is_some()
    }

    /// The claim-by-wish control, if present.
    pub fn wish_button(&self) -> Option<ButtonAction> {
        self.available_actions
            .iter()
            .copied()
            .find(|action| *action == ButtonAction::Wish)
    }

    pub fn kakera_buttons(&self) -> Vec<ButtonAction> {
        self.available_actions
            .iter()
            .copied()
            .filter(ButtonAction::is_kakera)
            .collect()
    }

    pub fn footer(&self) -> String {
        format!("{} / {} - {}", self.subject_name, self.series_name, self.value)
    }
}

impl fmt::Display for Roll {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{} {}", self.rank, self.footer())
    }
}

/// Content lines with consumed markers, so each line is taken at most once.
struct Worklist<'a> {
    lines: Vec<(&'a str, bool)>,
}

impl<'a> Worklist<'a> {
    fn new(content: &'a str) -> Self {
        Self {
            lines: content.split('\n').map(|line| (line, false)).collect(),
        }
    }

    /// Consumes the first unconsumed line if it satisfies `pred`.
    fn take_first_if(&mut self, pred: impl Fn(&str) -> bool) -> Option<&'a str> {
        let slot = self
            .lines
            .iter_mut()
            .find(|(line, consumed)| !*consumed && pred(*line))?;
        slot.1 = true;
        Some(slot.0)
    }

    /// Consumes the next unconsumed line only if it satisfies `pred`.
    fn take_head_if(&mut self, pred: impl Fn(&str) -> bool) -> Option<&'a str> {
        let slot = self.lines.iter_mut().find(|(_, consumed)| !*consumed)?;
        if !pred(slot.0) {
            return None;
        }
        slot.1 = true;
        Some(slot.0)
    }

    fn take_next(&mut self) -> Option<&'a str> {
        let slot = self.lines.iter_mut().find(|(_, consumed)| !*consumed)?;
        slot.1 = true;
        Some(slot.0)
    }

    fn remaining(&self) -> Vec<&'a str> {
        self.lines
            .iter()
            .filter(|(_, consumed)| !*consumed)
            .map(|(line, _)| *line)
            .collect()
    }
}

fn parse_wishers(line: &str) -> BTreeSet<String> {
    let names = line[WISHED_BY_MARKER.len()..].trim_end();
    let names = names.strip_suffix(EDITED_MARKER).unwrap_or(names);
    names
        .split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect()
}

fn series_from(mut rest: Vec<&str>) -> String {
    if rest.last().is_some_and(|line| FOOTER.is_match(line)) {
        rest.pop();
    }
    if rest
        .last()
        .is_some_and(|line| line.trim().eq_ignore_ascii_case(UNCLAIMED_MARKER))
    {
        rest.pop();
    }

    let series = rest
        .iter()
        .map(|line| line.trim())
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join(" ");

    if series.is_empty() {
        FALLBACK_SERIES.to_string()
    } else {
        series
    }
}

fn digits(text: &str) -> String {
    text.chars().filter(char::is_ascii_digit).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use officiant_core::types::LogEntry;

    fn roll_message(command: &str, content: &[&str]) -> Message {
        let raw = format!(
            "@Alice\n used \n{command}\nMudae\nBOT\nToday at 3:04 PM\n{}",
            content.join("\n")
        );
        Message::decode(&LogEntry::new(EntryId(900), "Mudae", raw, Utc::now()))
    }

    #[test]
    fn decodes_owned_ranked_roll() {
        let msg = roll_message(
            "/mx",
            &["CharacterName", "Belongs to SomeUser", "Claims: #42", "1500", "SeriesName"],
        );
        let roll = Roll::decode(&msg).unwrap();
        assert_eq!(roll.subject_name, "CharacterName");
        assert_eq!(roll.owner.as_deref(), Some("SomeUser"));
        assert_eq!(roll.rank, 42);
        assert_eq!(roll.value, 1500);
        assert_eq!(roll.series_name, "SeriesName");
        assert!(!roll.wished);
        assert!(roll.claimed());
        assert_eq!(roll.rolled_by.as_deref(), Some("Alice"));
        assert_eq!(roll.entry_id, EntryId(900));
        assert_eq!(roll.command, Command::RollAny);
    }

    #[test]
    fn decodes_wished_roll_and_strips_edited_marker() {
        let msg = roll_message("/wa", &["Wished by Alice, Bob (edited)", "Name", "MemeSeries"]);
        let roll = Roll::decode(&msg).unwrap();
        assert!(roll.wished);
        let expected: BTreeSet<String> = ["Alice", "Bob"].into_iter().map(String::from).collect();
        assert_eq!(roll.wished_by, expected);
        assert_eq!(roll.subject_name, "Name");
        assert_eq!(roll.series_name, "MemeSeries");
        assert_eq!(roll.value, 0);
        assert_eq!(roll.rank, UNRANKED);
        assert!(!roll.claimed());
    }

    #[test]
    fn lone_name_is_a_meme_roll() {
        let roll = Roll::decode(&roll_message("/mk", &["Name"])).unwrap();
        assert_eq!(roll.series_name, FALLBACK_SERIES);
        assert_eq!(roll.value, 0);
        assert_eq!(roll.rank, UNRANKED);
        assert!(roll.owner.is_none());
    }

    #[test]
    fn multi_line_series_drops_footer_and_unclaimed() {
        let msg = roll_message(
            "/hg",
            &[
                "Geralt",
                "The Witcher 3:",
                "Wild Hunt",
                "Claims: #7",
                "812",
                "Geralt / The Witcher 3 - 812 ka",
                "unclaimed",
            ],
        );
        let roll = Roll::decode(&msg).unwrap();
        // Only the last line is checked for a footer.
        assert_eq!(roll.rank, 7);
        assert_eq!(roll.value, 812);
        assert_eq!(
            roll.series_name,
            "The Witcher 3: Wild Hunt Geralt / The Witcher 3 - 812 ka"
        );

        let msg = roll_message(
            "/hg",
            &["Geralt", "The Witcher 3: Wild Hunt", "812", "Geralt / The Witcher 3 - 812 ka"],
        );
        let roll = Roll::decode(&msg).unwrap();
        assert_eq!(roll.series_name, "The Witcher 3: Wild Hunt");
    }

    #[test]
    fn trailing_unclaimed_line_is_dropped() {
        let msg = roll_message("/ma", &["Rem", "Re:Zero", "Unclaimed"]);
        let roll = Roll::decode(&msg).unwrap();
        assert_eq!(roll.series_name, "Re:Zero");
    }

    #[test]
    fn structural_lines_are_consumed_once() {
        // A numeric name must not be reused as the value.
        let msg = roll_message("/mx", &["2B", "NieR:Automata", "333"]);
        let roll = Roll::decode(&msg).unwrap();
        assert_eq!(roll.subject_name, "2B");
        assert_eq!(roll.value, 333);
        assert_eq!(roll.series_name, "NieR:Automata");
    }

    #[test]
    fn status_response_is_not_a_roll() {
        let err = Roll::decode(&roll_message("/tu", &["alice, you can claim"])).unwrap_err();
        assert!(matches!(err, OfficiantError::WrongCommand { .. }));
    }

    #[test]
    fn unknown_command_is_not_a_roll() {
        let err = Roll::decode(&roll_message("/imagine", &["a cat"])).unwrap_err();
        match err {
            OfficiantError::WrongCommand { received, .. } => {
                assert!(received.contains("/imagine"), "got: {received}")
            }
            other => panic!("expected WrongCommand, got {other}"),
        }
    }

    #[test]
    fn empty_content_is_a_nameless_meme_roll() {
        let roll = Roll::decode(&roll_message("/mx", &[])).unwrap();
        assert_eq!(roll.subject_name, "");
        assert_eq!(roll.series_name, FALLBACK_SERIES);
        assert_eq!(roll.value, 0);
        assert_eq!(roll.rank, UNRANKED);
        assert!(!roll.wished);
    }

    #[test]
    fn wished_marker_without_names_still_marks_the_roll() {
        let roll = Roll::decode(&roll_message("/mx", &["Wished by  (edited)", "Name"])).unwrap();
        assert!(roll.wished);
        assert!(roll.wished_by.is_empty());
        assert_eq!(roll.subject_name, "Name");
    }

    #[test]
    fn display_and_footer() {
        let roll = Roll::decode(&roll_message(
            "/mx",
            &["CharacterName", "Claims: #42", "1500", "SeriesName"],
        ))
        .unwrap();
        assert_eq!(roll.footer(), "CharacterName / SeriesName - 1500");
        assert_eq!(roll.to_string(), "#42 CharacterName / SeriesName - 1500");
    }

    #[test]
    fn actions_split_into_wish_and_kakera() {
        let roll = Roll::decode(&roll_message("/mx", &["Name", "Series"]))
            .unwrap()
            .with_actions(vec![ButtonAction::Wish, ButtonAction::Blue, ButtonAction::Rainbow]);
        assert_eq!(roll.wish_button(), Some(ButtonAction::Wish));
        assert_eq!(
            roll.kakera_buttons(),
            vec![ButtonAction::Blue, ButtonAction::Rainbow]
        );

        let bare = Roll::decode(&roll_message("/mx", &["Name", "Series"])).unwrap();
        assert_eq!(bare.wish_button(), None);
        assert!(bare.kakera_buttons().is_empty());
    }
}
