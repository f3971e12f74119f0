// SPDX-FileCopyrightText: 2026 Officiant Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Status panel decoding.
//!
//! The status command answers with a fixed-layout block of sentences, one
//! per timer or counter. The layout is pinned by the status layout command
//! (see [`TIMERS_UP_ARRANGE_PARAM`](officiant_core::TIMERS_UP_ARRANGE_PARAM)).
//! Which row holds which field, and how each row is read, lives in a
//! [`PanelSchema`] so a rendering change is a table edit.
//!
//! Example panel (decorations stripped during canonicalization):
//!
//! ```text
//! alice, you can claim right now! The next claim reset is in 2h 21 min.
//! You have 12 rolls left. Next rolls reset in 21 min.
//! $rt is available!
//! You have 64 rolls reset in stock.
//!
//! You can react to kakera right now!
//! Power: 77%
//! Each kakera reaction consumes 34% of your reaction power.
//! Your characters with 10+ keys consume half the power (17%)
//! Stock: 101637:kakera:
//!
//! $dk is ready!
//! $daily is available!
//! You may vote right now!
//! $p is available!
//! ```

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use officiant_core::error::OfficiantError;
use officiant_core::types::Command;

use crate::message::Message;

/// Everything outside this class is dropped before rows are read.
static NON_CANONICAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^a-z0-9 \n]").expect("valid canonicalization pattern"));

/// A semantic field of the status panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PanelField {
    CanClaim,
    ClaimResetMinutes,
    RollsLeft,
    PremiumRollsLeft,
    RollsResetMinutes,
    ResetClaimTimerAvailable,
    RollsResetStock,
    KakeraReactAvailable,
    KakeraPower,
    KakeraCost,
    KakeraStock,
    DailyKakeraReady,
    DailyReady,
    VoteReady,
    SideSlotReady,
}

impl PanelField {
    pub fn name(&self) -> &'static str {
        match self {
            PanelField::CanClaim => "can_claim",
            PanelField::ClaimResetMinutes => "claim_reset_minutes",
            PanelField::RollsLeft => "rolls_left",
            PanelField::PremiumRollsLeft => "premium_rolls_left",
            PanelField::RollsResetMinutes => "rolls_reset_minutes",
            PanelField::ResetClaimTimerAvailable => "reset_claim_timer_available",
            PanelField::RollsResetStock => "rolls_reset_stock",
            PanelField::KakeraReactAvailable => "kakera_react_available",
            PanelField::KakeraPower => "kakera_power",
            PanelField::KakeraCost => "kakera_cost",
            PanelField::KakeraStock => "kakera_stock",
            PanelField::DailyKakeraReady => "daily_kakera_ready",
            PanelField::DailyReady => "daily_ready",
            PanelField::VoteReady => "vote_ready",
            PanelField::SideSlotReady => "side_slot_ready",
        }
    }
}

/// How a canonical row is turned into a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowRule {
    /// Flag: the row contains the phrase.
    Contains(&'static str),
    /// Flag: the row is exactly the phrase.
    Equals(&'static str),
    /// Number: every digit in the row, concatenated. No digits reads as 0.
    Integer,
    /// Number: minutes in the row's trailing countdown clause.
    Countdown,
    /// Number: the integer token immediately before any of the given words.
    /// 0 if absent.
    CountBefore(&'static [&'static str]),
}

/// One entry of the schema table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowSpec {
    pub field: PanelField,
    /// Index into the panel's non-empty canonical lines.
    pub row: usize,
    pub rule: RowRule,
}

const fn spec(field: PanelField, row: usize, rule: RowRule) -> RowSpec {
    RowSpec { field, row, rule }
}

/// Row layout produced by `$ta claim, rolls, rt, rollsreset, jump, kakerareact,
/// kakerapower, kakerainfo, kakerastock, jump, dk, daily, vote, pokemon`.
/// Row 7 (the key bonus note) is not read.
pub const DEFAULT_ROWS: &[RowSpec] = &[
    spec(PanelField::CanClaim, 0, RowRule::Contains("you can claim right now")),
    spec(PanelField::ClaimResetMinutes, 0, RowRule::Countdown),
    spec(PanelField::RollsLeft, 1, RowRule::CountBefore(&["rolls", "roll"])),
    spec(PanelField::PremiumRollsLeft, 1, RowRule::CountBefore(&["mk"])),
    spec(PanelField::RollsResetMinutes, 1, RowRule::Countdown),
    spec(PanelField::ResetClaimTimerAvailable, 2, RowRule::Equals("rt is available")),
    spec(PanelField::RollsResetStock, 3, RowRule::Integer),
    spec(
        PanelField::KakeraReactAvailable,
        4,
        RowRule::Contains("you can react to kakera right now"),
    ),
    spec(PanelField::KakeraPower, 5, RowRule::Integer),
    spec(PanelField::KakeraCost, 6, RowRule::Integer),
    spec(PanelField::KakeraStock, 8, RowRule::Integer),
    spec(PanelField::DailyKakeraReady, 9, RowRule::Equals("dk is ready")),
    spec(PanelField::DailyReady, 10, RowRule::Equals("daily is available")),
    spec(PanelField::VoteReady, 11, RowRule::Contains("you may vote right now")),
    spec(PanelField::SideSlotReady, 12, RowRule::Equals("p is available")),
];

/// The row table a panel is read against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PanelSchema {
    rows: Vec<RowSpec>,
}

impl Default for PanelSchema {
    fn default() -> Self {
        Self::new(DEFAULT_ROWS.to_vec())
    }
}

/// A value read from one row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RowValue {
    Flag(bool),
    Number(u64),
}

impl PanelSchema {
    pub fn new(rows: Vec<RowSpec>) -> Self {
        Self { rows }
    }

    pub fn rows(&self) -> &[RowSpec] {
        &self.rows
    }

    fn read(&self, field: PanelField, lines: &[String]) -> Result<RowValue, OfficiantError> {
        let spec = self
            .rows
            .iter()
            .find(|spec| spec.field == field)
            .ok_or_else(|| {
                OfficiantError::Internal(format!("panel schema has no row for {}", field.name()))
            })?;

        let line = lines
            .get(spec.row)
            .ok_or(OfficiantError::MalformedPanel {
                row: spec.row,
                field: field.name(),
                available: lines.len(),
            })?;

        Ok(match spec.rule {
            RowRule::Contains(phrase) => RowValue::Flag(line.contains(phrase)),
            RowRule::Equals(phrase) => RowValue::Flag(line == phrase),
            RowRule::Integer => RowValue::Number(extract_integer(line)),
            RowRule::Countdown => RowValue::Number(u64::from(extract_minutes(line))),
            RowRule::CountBefore(words) => RowValue::Number(count_before(line, words)),
        })
    }

    fn flag(&self, field: PanelField, lines: &[String]) -> Result<bool, OfficiantError> {
        Ok(match self.read(field, lines)? {
            RowValue::Flag(flag) => flag,
            RowValue::Number(n) => n > 0,
        })
    }

    fn number(&self, field: PanelField, lines: &[String]) -> Result<u32, OfficiantError> {
        Ok(match self.read(field, lines)? {
            RowValue::Number(n) => u32::try_from(n).unwrap_or(u32::MAX),
            RowValue::Flag(flag) => u32::from(flag),
        })
    }

    fn wide_number(&self, field: PanelField, lines: &[String]) -> Result<u64, OfficiantError> {
        Ok(match self.read(field, lines)? {
            RowValue::Number(n) => n,
            RowValue::Flag(flag) => u64::from(flag),
        })
    }
}

/// A player's timers, counters, and readiness flags.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusPanel {
    /// Account name the panel was written for.
    pub owner: String,
    pub can_claim: bool,
    pub claim_reset_minutes: u32,
    pub rolls_left: u32,
    pub premium_rolls_left: u32,
    pub rolls_reset_minutes: u32,
    pub reset_claim_timer_available: bool,
    pub rolls_reset_stock: u32,
    pub kakera_react_available: bool,
    pub kakera_power: u32,
    pub kakera_cost: u32,
    pub kakera_stock: u64,
    pub daily_kakera_ready: bool,
    pub daily_ready: bool,
    pub vote_ready: bool,
    pub side_slot_ready: bool,
}

impl StatusPanel {
    /// Decodes a status response with the default row schema.
    pub fn decode(message: &Message, expected_owner: &str) -> Result<Self, OfficiantError> {
        Self::decode_with(message, expected_owner, &PanelSchema::default())
    }

    /// Decodes a status response against an explicit row schema.
    ///
    /// Rejects responses to other commands, and panels written for a
    /// different account than `expected_owner`.
    pub fn decode_with(
        message: &Message,
        expected_owner: &str,
        schema: &PanelSchema,
    ) -> Result<Self, OfficiantError> {
        if message.known_command() != Some(Command::TimersUp) {
            return Err(OfficiantError::WrongCommand {
                expected: Command::TimersUp.to_string(),
                received: message.command_label(),
            });
        }

        let owner = panel_owner(&message.content);
        if owner != expected_owner {
            return Err(OfficiantError::IdentityMismatch {
                expected: expected_owner.to_string(),
                received: owner.to_string(),
            });
        }

        let lines = canonical_lines(&message.content);
        debug!(entry_id = %message.id, rows = lines.len(), "decoding status panel");

        Ok(Self {
            owner: owner.to_string(),
            can_claim: schema.flag(PanelField::CanClaim, &lines)?,
            claim_reset_minutes: schema.number(PanelField::ClaimResetMinutes, &lines)?,
            rolls_left: schema.number(PanelField::RollsLeft, &lines)?,
            premium_rolls_left: schema.number(PanelField::PremiumRollsLeft, &lines)?,
            rolls_reset_minutes: schema.number(PanelField::RollsResetMinutes, &lines)?,
            reset_claim_timer_available: schema
                .flag(PanelField::ResetClaimTimerAvailable, &lines)?,
            rolls_reset_stock: schema.number(PanelField::RollsResetStock, &lines)?,
            kakera_react_available: schema.flag(PanelField::KakeraReactAvailable, &lines)?,
            kakera_power: schema.number(PanelField::KakeraPower, &lines)?,
            kakera_cost: schema.number(PanelField::KakeraCost, &lines)?,
            kakera_stock: schema.wide_number(PanelField::KakeraStock, &lines)?,
            daily_kakera_ready: schema.flag(PanelField::DailyKakeraReady, &lines)?,
            daily_ready: schema.flag(PanelField::DailyReady, &lines)?,
            vote_ready: schema.flag(PanelField::VoteReady, &lines)?,
            side_slot_ready: schema.flag(PanelField::SideSlotReady, &lines)?,
        })
    }

    /// Claims reset within the hour, so an unused claim is about to be lost.
    pub fn is_claim_hour(&self) -> bool {
        self.claim_reset_minutes <= 60
    }

    /// Enough reaction power for one kakera reaction.
    pub fn can_react(&self) -> bool {
        self.kakera_power >= self.kakera_cost
    }
}

/// The account name a panel addresses: everything before the first comma.
fn panel_owner(content: &str) -> &str {
    content
        .lines()
        .next()
        .unwrap_or_default()
        .split(',')
        .next()
        .unwrap_or_default()
        .trim()
}

/// Lowercases, drops decoration, and keeps the non-empty trimmed lines.
pub fn canonical_lines(content: &str) -> Vec<String> {
    let lowered = content.to_lowercase();
    NON_CANONICAL
        .replace_all(&lowered, "")
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

/// Concatenates every digit of the row. No digits reads as 0.
pub fn extract_integer(text: &str) -> u64 {
    let digits: String = text.chars().filter(char::is_ascii_digit).collect();
    digits.parse().unwrap_or(if digits.is_empty() { 0 } else { u64::MAX })
}

/// Minutes in a countdown such as `2h 21 min` or `21 min`.
///
/// Only the clause after the last ` in ` (or `another `) is read, so digits
/// in an account name do not leak in. One number is minutes; two are hours
/// and minutes; none is 0.
pub fn extract_minutes(text: &str) -> u32 {
    let clause = text
        .rsplit_once(" in ")
        .or_else(|| text.rsplit_once("another "))
        .map(|(_, tail)| tail)
        .unwrap_or(text);

    let digits: String = clause
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == ' ')
        .collect();
    let numbers: Vec<u32> = digits
        .split_whitespace()
        .filter_map(|token| token.parse().ok())
        .collect();

    match numbers.as_slice() {
        [] => 0,
        [minutes] => *minutes,
        [hours, minutes, ..] => hours.saturating_mul(60).saturating_add(*minutes),
    }
}

/// The integer token immediately preceding any of `words`, or 0.
fn count_before(text: &str, words: &[&str]) -> u64 {
    let tokens: Vec<&str> = text.split_whitespace().collect();
    tokens
        .windows(2)
        .find(|pair| words.contains(&pair[1]) && pair[0].chars().all(|c| c.is_ascii_digit()))
        .and_then(|pair| pair[0].parse().ok())
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use officiant_core::types::{EntryId, LogEntry};

    const FULL_PANEL: &str = "alice, you can claim right now! The next claim reset is in **2h 21** min.
You have **12** rolls (+**3** $mk) left. Next rolls reset in **21** min.
$rt is available!
You have **64** rolls reset in stock.

You can react to kakera right now!
Power: **77%**
Each kakera reaction consumes 34% of your reaction power.
Your characters with 10+ keys consume half the power (17%)
Stock: **101637**:kakera:

$dk is ready!
$daily is available!
You may vote right now!
$p is available!";

    fn status_message(invoker: &str, content: &str) -> Message {
        let raw = format!("@{invoker}\n used \n/tu\nMudae\nBOT\nToday at 3:04 PM\n{content}");
        Message::decode(&LogEntry::new(EntryId(1), "Mudae", raw, Utc::now()))
    }

    #[test]
    fn decodes_full_panel() {
        let panel = StatusPanel::decode(&status_message("Alice", FULL_PANEL), "alice").unwrap();
        assert_eq!(panel.owner, "alice");
        assert!(panel.can_claim);
        assert_eq!(panel.claim_reset_minutes, 141);
        assert_eq!(panel.rolls_left, 12);
        assert_eq!(panel.premium_rolls_left, 3);
        assert_eq!(panel.rolls_reset_minutes, 21);
        assert!(panel.reset_claim_timer_available);
        assert_eq!(panel.rolls_reset_stock, 64);
        assert!(panel.kakera_react_available);
        assert_eq!(panel.kakera_power, 77);
        assert_eq!(panel.kakera_cost, 34);
        assert_eq!(panel.kakera_stock, 101_637);
        assert!(panel.daily_kakera_ready);
        assert!(panel.daily_ready);
        assert!(panel.vote_ready);
        assert!(panel.side_slot_ready);
        assert!(!panel.is_claim_hour());
        assert!(panel.can_react());
    }

    #[test]
    fn cooldown_panel_reads_negative_flags() {
        let content = "alice, you can't claim for another **45** min.
You have **0** rolls left. Next rolls reset in **1h 02** min.
$rt is not available.
You have **0** rolls reset in stock.
You can't react to kakera for **30** min.
Power: **12%**
Each kakera reaction consumes 34% of your reaction power.
Your characters with 10+ keys consume half the power (17%)
Stock: **5**:kakera:
Next $dk in **3h 10** min.
Next $daily reset in 6h 36 min.
You may vote again in 15 min.
Remaining time before your next $p: 59 min.";
        let panel = StatusPanel::decode(&status_message("Alice", content), "alice").unwrap();
        assert!(!panel.can_claim);
        assert_eq!(panel.claim_reset_minutes, 45);
        assert!(panel.is_claim_hour());
        assert_eq!(panel.rolls_left, 0);
        assert_eq!(panel.premium_rolls_left, 0);
        assert_eq!(panel.rolls_reset_minutes, 62);
        assert!(!panel.reset_claim_timer_available);
        assert!(!panel.kakera_react_available);
        assert!(!panel.can_react());
        assert!(!panel.daily_kakera_ready);
        assert!(!panel.daily_ready);
        assert!(!panel.vote_ready);
        assert!(!panel.side_slot_ready);
    }

    #[test]
    fn countdown_extraction() {
        assert_eq!(extract_minutes("the next claim reset is in 2h 21 min"), 141);
        assert_eq!(extract_minutes("the next claim reset is in 21 min"), 21);
        assert_eq!(extract_minutes("2h 21 min"), 141);
        assert_eq!(extract_minutes("21 min"), 21);
        assert_eq!(extract_minutes("user99 you cant claim for another 7 min"), 7);
        assert_eq!(extract_minutes("no numbers here"), 0);
    }

    #[test]
    fn single_roll_left_is_counted() {
        assert_eq!(count_before("you have 1 roll left", &["rolls", "roll"]), 1);
        assert_eq!(count_before("you have 12 rolls 3 mk left", &["rolls", "roll"]), 12);
        assert_eq!(count_before("you have 12 rolls 3 mk left", &["mk"]), 3);
        assert_eq!(count_before("you have no rolls left", &["rolls", "roll"]), 0);
    }

    #[test]
    fn integer_extraction() {
        assert_eq!(extract_integer("power 77"), 77);
        assert_eq!(extract_integer("stock 101637kakera"), 101_637);
        assert_eq!(extract_integer("rt is available"), 0);
    }

    #[test]
    fn canonicalization_strips_markup() {
        let lines = canonical_lines("**Power**: 77%\n\n  Stock: **5**:kakera:  ");
        assert_eq!(lines, vec!["power 77", "stock 5kakera"]);
    }

    #[test]
    fn wrong_command_is_rejected() {
        let raw = "@Alice\n used \n/mx\nMudae\nBOT\nToday at 3:04 PM\nSomeone\nSeries";
        let msg = Message::decode(&LogEntry::new(EntryId(1), "Mudae", raw, Utc::now()));
        let err = StatusPanel::decode(&msg, "alice").unwrap_err();
        assert!(matches!(err, OfficiantError::WrongCommand { .. }), "got: {err}");
    }

    #[test]
    fn plain_text_is_rejected_as_wrong_command() {
        let msg = Message::decode(&LogEntry::new(EntryId(1), "Carol", "hi", Utc::now()));
        let err = StatusPanel::decode(&msg, "alice").unwrap_err();
        match err {
            OfficiantError::WrongCommand { received, .. } => assert_eq!(received, "no command"),
            other => panic!("expected WrongCommand, got {other}"),
        }
    }

    #[test]
    fn foreign_panel_is_rejected() {
        let content = FULL_PANEL.replacen("alice", "mallory", 1);
        let err = StatusPanel::decode(&status_message("Alice", &content), "alice").unwrap_err();
        match err {
            OfficiantError::IdentityMismatch { expected, received } => {
                assert_eq!(expected, "alice");
                assert_eq!(received, "mallory");
            }
            other => panic!("expected IdentityMismatch, got {other}"),
        }
    }

    #[test]
    fn short_panel_is_malformed() {
        let content = "alice, you can claim right now! The next claim reset is in 21 min.
You have 3 rolls left. Next rolls reset in 21 min.";
        let err = StatusPanel::decode(&status_message("Alice", content), "alice").unwrap_err();
        assert!(err.is_structural());
        match err {
            OfficiantError::MalformedPanel { row, available, .. } => {
                assert_eq!(row, 2);
                assert_eq!(available, 2);
            }
            other => panic!("expected MalformedPanel, got {other}"),
        }
    }

    #[test]
    fn custom_schema_moves_rows() {
        let mut rows = DEFAULT_ROWS.to_vec();
        for spec in rows.iter_mut().filter(|s| s.row >= 8) {
            spec.row -= 1;
        }
        let schema = PanelSchema::new(rows);
        let content = FULL_PANEL.replace(
            "Your characters with 10+ keys consume half the power (17%)\n",
            "",
        );
        let panel =
            StatusPanel::decode_with(&status_message("Alice", &content), "alice", &schema)
                .unwrap();
        assert_eq!(panel.kakera_stock, 101_637);
        assert!(panel.side_slot_ready);
    }

    #[test]
    fn schema_without_field_is_internal_error() {
        let schema = PanelSchema::new(vec![]);
        let err = StatusPanel::decode_with(&status_message("Alice", FULL_PANEL), "alice", &schema)
            .unwrap_err();
        assert!(matches!(err, OfficiantError::Internal(_)));
    }
}
