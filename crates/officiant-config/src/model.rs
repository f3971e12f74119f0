// SPDX-FileCopyrightText: 2026 Officiant Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for Officiant.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use officiant_core::types::{ButtonAction, Command};

/// Top-level Officiant configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment variable overrides.
/// Every section is optional; `accounts` and `servers` default to empty.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct OfficiantConfig {
    /// Process-wide settings.
    #[serde(default)]
    pub agent: AgentConfig,

    /// Settle, poll, and staleness timings.
    #[serde(default)]
    pub timing: TimingConfig,

    /// Retry budgets.
    #[serde(default)]
    pub retry: RetryConfig,

    /// Game accounts, referenced by name from `[[servers]]`.
    #[serde(default)]
    pub accounts: Vec<AccountConfig>,

    /// Servers and the roll channel each account plays in.
    #[serde(default)]
    pub servers: Vec<ServerConfig>,
}

impl OfficiantConfig {
    pub fn account(&self, name: &str) -> Option<&AccountConfig> {
        self.accounts.iter().find(|account| account.name == name)
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AgentConfig {
    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Delays that pace the session against the chat client and the game bot.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct TimingConfig {
    /// Wait after submitting a known slash command.
    #[serde(default = "default_command_settle_ms")]
    pub command_settle_ms: u64,

    /// Wait after submitting free text.
    #[serde(default = "default_message_settle_ms")]
    pub message_settle_ms: u64,

    /// Sleep between tail polls.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// Tail polls before giving up on a response.
    #[serde(default = "default_max_polls")]
    pub max_polls: u32,

    /// Maximum age of a response still trusted as fresh, in seconds.
    #[serde(default = "default_staleness_secs")]
    pub staleness_secs: u64,

    /// Entries scanned when the tail fails the identity checks.
    #[serde(default = "default_history_window")]
    pub history_window: usize,

    /// Wait after a claim so the bot registers it before the session ends.
    #[serde(default = "default_claim_settle_ms")]
    pub claim_settle_ms: u64,

    /// Quiet period required in the channel before a session starts, in seconds.
    #[serde(default = "default_coast_clear_secs")]
    pub coast_clear_secs: u64,

    /// Wait for a roll's buttons to render.
    #[serde(default = "default_button_load_ms")]
    pub button_load_ms: u64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            command_settle_ms: default_command_settle_ms(),
            message_settle_ms: default_message_settle_ms(),
            poll_interval_ms: default_poll_interval_ms(),
            max_polls: default_max_polls(),
            staleness_secs: default_staleness_secs(),
            history_window: default_history_window(),
            claim_settle_ms: default_claim_settle_ms(),
            coast_clear_secs: default_coast_clear_secs(),
            button_load_ms: default_button_load_ms(),
        }
    }
}

impl TimingConfig {
    pub fn command_settle(&self) -> Duration {
        Duration::from_millis(self.command_settle_ms)
    }

    pub fn message_settle(&self) -> Duration {
        Duration::from_millis(self.message_settle_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn staleness(&self) -> Duration {
        Duration::from_secs(self.staleness_secs)
    }

    pub fn claim_settle(&self) -> Duration {
        Duration::from_millis(self.claim_settle_ms)
    }

    pub fn coast_clear(&self) -> Duration {
        Duration::from_secs(self.coast_clear_secs)
    }

    pub fn button_load(&self) -> Duration {
        Duration::from_millis(self.button_load_ms)
    }
}

fn default_command_settle_ms() -> u64 {
    500
}

fn default_message_settle_ms() -> u64 {
    300
}

fn default_poll_interval_ms() -> u64 {
    300
}

fn default_max_polls() -> u32 {
    10
}

fn default_staleness_secs() -> u64 {
    30
}

fn default_history_window() -> usize {
    25
}

fn default_claim_settle_ms() -> u64 {
    4000
}

fn default_coast_clear_secs() -> u64 {
    15
}

fn default_button_load_ms() -> u64 {
    100
}

/// Retry budgets for correlation misses and transient UI failures.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RetryConfig {
    /// Submit-and-correlate attempts for one command.
    #[serde(default = "default_correlation_attempts")]
    pub correlation_attempts: u32,

    /// Attempts for log reads and command submission.
    #[serde(default = "default_transient_attempts")]
    pub transient_attempts: u32,

    #[serde(default = "default_transient_backoff_ms")]
    pub transient_backoff_ms: u64,

    /// Attempts for button presses and reactions.
    #[serde(default = "default_click_attempts")]
    pub click_attempts: u32,

    #[serde(default = "default_click_backoff_ms")]
    pub click_backoff_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            correlation_attempts: default_correlation_attempts(),
            transient_attempts: default_transient_attempts(),
            transient_backoff_ms: default_transient_backoff_ms(),
            click_attempts: default_click_attempts(),
            click_backoff_ms: default_click_backoff_ms(),
        }
    }
}

fn default_correlation_attempts() -> u32 {
    2
}

fn default_transient_attempts() -> u32 {
    4
}

fn default_transient_backoff_ms() -> u64 {
    300
}

fn default_click_attempts() -> u32 {
    5
}

fn default_click_backoff_ms() -> u64 {
    100
}

/// One game account and its roll preferences.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AccountConfig {
    /// In-game account name, as it appears at the start of the status panel.
    pub name: String,

    /// Roll commands cycled through for free rolls, by invocation text.
    #[serde(default = "default_roll_order")]
    pub roll_order: Vec<String>,

    /// Kakera buttons to press, by accessible name.
    #[serde(default = "default_allowed_kakera_reacts")]
    pub allowed_kakera_reacts: Vec<String>,

    /// Character names always worth a claim.
    #[serde(default)]
    pub wishlist: Vec<String>,

    /// Series whose characters are always worth a claim.
    #[serde(default)]
    pub wishlist_series: Vec<String>,

    /// Claim anything worth at least this much kakera.
    #[serde(default = "default_greed_threshold_kakera")]
    pub greed_threshold_kakera: u32,

    /// Claim anything ranked at or better than this. 0 disables.
    #[serde(default)]
    pub greed_threshold_rank: u32,

    /// Emoji used to claim a roll.
    #[serde(default = "default_react_emoji")]
    pub react_emoji: String,

    /// Posted before rolling on servers with `announce_start`.
    #[serde(default = "default_announcement_message")]
    pub announcement_message: String,
}

impl AccountConfig {
    /// An account with every preference at its default.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            roll_order: default_roll_order(),
            allowed_kakera_reacts: default_allowed_kakera_reacts(),
            wishlist: Vec::new(),
            wishlist_series: Vec::new(),
            greed_threshold_kakera: default_greed_threshold_kakera(),
            greed_threshold_rank: 0,
            react_emoji: default_react_emoji(),
            announcement_message: default_announcement_message(),
        }
    }

    /// `roll_order` resolved against the command catalog. Entries that are
    /// not roll commands are skipped; validation reports them.
    pub fn roll_commands(&self) -> Vec<Command> {
        self.roll_order
            .iter()
            .filter_map(|text| text.parse::<Command>().ok())
            .filter(Command::is_roll)
            .collect()
    }

    /// `allowed_kakera_reacts` resolved to buttons. Unknown names are skipped.
    pub fn allowed_buttons(&self) -> Vec<ButtonAction> {
        self.allowed_kakera_reacts
            .iter()
            .filter_map(|name| name.parse::<ButtonAction>().ok())
            .filter(ButtonAction::is_kakera)
            .collect()
    }
}

fn default_roll_order() -> Vec<String> {
    vec![Command::RollAny.to_string()]
}

fn default_allowed_kakera_reacts() -> Vec<String> {
    ButtonAction::all_kakera()
        .iter()
        .map(ToString::to_string)
        .collect()
}

fn default_greed_threshold_kakera() -> u32 {
    9999
}

fn default_react_emoji() -> String {
    "🎲".to_string()
}

fn default_announcement_message() -> String {
    "It's roll time! 🎲".to_string()
}

/// A server, its roll channel, and the accounts that play there.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    pub name: String,
    pub server_id: u64,
    pub roll_channel_id: u64,

    /// Minute past the hour at which sessions start.
    #[serde(default)]
    pub minute_of_hour_to_roll: u32,

    /// Names of `[[accounts]]` entries playing on this server.
    #[serde(default)]
    pub accounts: Vec<String>,

    #[serde(default = "default_true")]
    pub do_react: bool,

    #[serde(default = "default_true")]
    pub do_daily: bool,

    #[serde(default = "default_true")]
    pub do_daily_kakera: bool,

    #[serde(default = "default_true")]
    pub do_pokeslot: bool,

    #[serde(default)]
    pub announce_start: bool,
}

impl ServerConfig {
    /// Feature switches for one session on this server.
    pub fn options(&self) -> ServerOptions {
        ServerOptions {
            do_react: self.do_react,
            do_daily: self.do_daily,
            do_daily_kakera: self.do_daily_kakera,
            do_pokeslot: self.do_pokeslot,
            announce_start: self.announce_start,
        }
    }
}

/// The per-server feature switches, detached from server identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServerOptions {
    pub do_react: bool,
    pub do_daily: bool,
    pub do_daily_kakera: bool,
    pub do_pokeslot: bool,
    pub announce_start: bool,
}

impl Default for ServerOptions {
    fn default() -> Self {
        Self {
            do_react: true,
            do_daily: true,
            do_daily_kakera: true,
            do_pokeslot: true,
            announce_start: false,
        }
    }
}

fn default_true() -> bool {
    true
}
