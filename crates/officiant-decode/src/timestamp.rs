// SPDX-FileCopyrightText: 2026 Officiant Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Parsing of the chat client's display timestamps.

use chrono::{DateTime, Days, NaiveDate, NaiveDateTime, NaiveTime, Utc};

const TODAY_PREFIX: &str = "Today at ";
const YESTERDAY_PREFIX: &str = "Yesterday at ";
const TIME_FORMAT: &str = "%I:%M %p";
const DATETIME_FORMAT: &str = "%m/%d/%Y %I:%M %p";

/// Parses a rendered timestamp relative to `today`.
///
/// Accepts `Today at 3:04 PM`, `Yesterday at 3:04 PM`, `03/01/2026 3:04 PM`
/// and RFC 3339. Returns `None` for anything else.
pub fn parse_sent_at(text: &str, today: NaiveDate) -> Option<DateTime<Utc>> {
    let text = text.trim();

    if let Some(time) = text.strip_prefix(TODAY_PREFIX) {
        let time = NaiveTime::parse_from_str(time.trim(), TIME_FORMAT).ok()?;
        return Some(today.and_time(time).and_utc());
    }

    if let Some(time) = text.strip_prefix(YESTERDAY_PREFIX) {
        let time = NaiveTime::parse_from_str(time.trim(), TIME_FORMAT).ok()?;
        let yesterday = today.checked_sub_days(Days::new(1))?;
        return Some(yesterday.and_time(time).and_utc());
    }

    if let Ok(dt) = NaiveDateTime::parse_from_str(text, DATETIME_FORMAT) {
        return Some(dt.and_utc());
    }

    DateTime::parse_from_rfc3339(text)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}
