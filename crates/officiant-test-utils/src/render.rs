// SPDX-FileCopyrightText: 2026 Officiant Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Builders for raw entry text in the shapes the chat client renders.

/// Display name of the game bot in rendered headers.
pub const BOT_NAME: &str = "Mudae";

/// Timestamp line shown in rendered headers.
pub const DISPLAY_TIME: &str = "Today at 3:04 PM";

/// A slash command response: six header lines, then the content.
pub fn slash_response(invoker: &str, command_text: &str, content: &str) -> String {
    format!("@{invoker}\n used \n{command_text}\n{BOT_NAME}\nBOT\n{DISPLAY_TIME}\n{content}")
}

/// A bot reply to a text-triggered command: three header lines, then the content.
pub fn bot_reply(content: &str) -> String {
    format!("{BOT_NAME}\nBOT\n{DISPLAY_TIME}\n{content}")
}

/// A user's plain message with the author and time header.
pub fn plain_message(author: &str, text: &str) -> String {
    format!("{author}\n{DISPLAY_TIME}\n{text}")
}

/// A status panel in the arranged layout.
#[derive(Debug, Clone)]
pub struct PanelText {
    pub owner: String,
    pub can_claim: bool,
    pub claim_reset: String,
    pub rolls: u32,
    pub premium_rolls: u32,
    pub rt_available: bool,
    pub power: u32,
    pub cost: u32,
    pub dk_ready: bool,
    pub daily_ready: bool,
    pub pokeslot_ready: bool,
}

impl PanelText {
    /// A panel with nothing left to do.
    pub fn idle(owner: &str) -> Self {
        Self {
            owner: owner.to_string(),
            can_claim: false,
            claim_reset: "2h 21".to_string(),
            rolls: 0,
            premium_rolls: 0,
            rt_available: false,
            power: 10,
            cost: 34,
            dk_ready: false,
            daily_ready: false,
            pokeslot_ready: false,
        }
    }

    pub fn render(&self) -> String {
        let claim = if self.can_claim {
            format!(
                "{}, you can claim right now! The next claim reset is in **{}** min.",
                self.owner, self.claim_reset
            )
        } else {
            format!(
                "{}, you can't claim for another **{}** min.",
                self.owner, self.claim_reset
            )
        };
        let rolls = if self.premium_rolls > 0 {
            format!(
                "You have **{}** rolls (+**{}** $mk) left. Next rolls reset in **21** min.",
                self.rolls, self.premium_rolls
            )
        } else {
            format!(
                "You have **{}** rolls left. Next rolls reset in **21** min.",
                self.rolls
            )
        };
        let rt = if self.rt_available {
            "$rt is available!"
        } else {
            "The cooldown of $rt is not over."
        };
        let dk = if self.dk_ready {
            "$dk is ready!"
        } else {
            "Next $dk in **3h 10** min."
        };
        let daily = if self.daily_ready {
            "$daily is available!"
        } else {
            "Next $daily reset in 6h 36 min."
        };
        let slot = if self.pokeslot_ready {
            "$p is available!"
        } else {
            "Remaining time before your next $p: 59 min."
        };

        [
            claim.as_str(),
            rolls.as_str(),
            rt,
            "You have **0** rolls reset in stock.",
            "",
            "You can react to kakera right now!",
            &format!("Power: **{}%**", self.power),
            &format!(
                "Each kakera reaction consumes {}% of your reaction power.",
                self.cost
            ),
            "Your characters with 10+ keys consume half the power (17%)",
            "Stock: **1200**:kakera:",
            "",
            dk,
            daily,
            "You may vote right now!",
            slot,
        ]
        .join("\n")
    }
}

/// Content lines of a roll response.
pub fn roll_content(name: &str, series: &str, value: u32) -> String {
    format!("{name}\n{series}\n{value}")
}
