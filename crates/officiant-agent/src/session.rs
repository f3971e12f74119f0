// SPDX-FileCopyrightText: 2026 Officiant Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! One account's scripted turn on one server.
//!
//! A turn goes through phases: Starting -> WaitingForQuiet -> Checking ->
//! SideActions -> Rolling -> Claiming -> Finished. Every command is issued
//! through the session's [`Correlator`], strictly one at a time, and the
//! surface is shut down when the turn ends, whatever the outcome.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tracing::{debug, info, warn};

use officiant_channel::{CorrelationRequest, CorrelationSettings, Correlator, DisplayNameRegistry};
use officiant_config::{AccountConfig, RetryConfig, ServerOptions, TimingConfig};
use officiant_core::error::OfficiantError;
use officiant_core::traits::ChatSurface;
use officiant_core::types::{ButtonAction, Command, HealthStatus, TIMERS_UP_ARRANGE_PARAM};
use officiant_decode::{Message, Roll, StatusPanel, decode_panel, decode_roll};

use crate::strategy::{self, ClaimState};

/// Status fetches made when the panel belongs to someone else or cannot be located.
const PANEL_ATTEMPTS: u32 = 2;

/// Phases of a turn, for logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Starting,
    WaitingForQuiet,
    Checking,
    SideActions,
    Rolling,
    Claiming,
    Finished,
}

impl std::fmt::Display for SessionPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionPhase::Starting => write!(f, "starting"),
            SessionPhase::WaitingForQuiet => write!(f, "waiting-for-quiet"),
            SessionPhase::Checking => write!(f, "checking"),
            SessionPhase::SideActions => write!(f, "side-actions"),
            SessionPhase::Rolling => write!(f, "rolling"),
            SessionPhase::Claiming => write!(f, "claiming"),
            SessionPhase::Finished => write!(f, "finished"),
        }
    }
}

/// What a finished turn did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionReport {
    pub account: String,
    pub display_name: String,
    /// Side commands that went through.
    pub side_actions: Vec<Command>,
    /// Commands the channel refused.
    pub disabled: Vec<Command>,
    pub rolls: Vec<Roll>,
    /// Rolls claimed for a cooperating account's wish.
    pub wish_claims: Vec<String>,
    /// Rolls claimed on the spot for matching the wishlists or thresholds.
    pub greed_claims: Vec<String>,
    /// The end-of-turn claim.
    pub claimed: Option<String>,
    /// Note posted for strangers who wished the end-of-turn claim.
    pub note: Option<String>,
}

/// Drives one account's turn over one chat surface.
pub struct SessionRunner {
    account: AccountConfig,
    options: ServerOptions,
    surface: Arc<dyn ChatSurface>,
    correlator: Correlator,
    registry: DisplayNameRegistry,
    claim_settle: Duration,
    coast_clear: Duration,
}

impl SessionRunner {
    pub fn new(
        account: AccountConfig,
        options: ServerOptions,
        surface: Arc<dyn ChatSurface>,
        registry: DisplayNameRegistry,
        timing: &TimingConfig,
        retry: &RetryConfig,
    ) -> Self {
        let correlator = Correlator::new(
            Arc::clone(&surface),
            CorrelationSettings::from_config(timing, retry),
        );
        Self {
            account,
            options,
            surface,
            correlator,
            registry,
            claim_settle: timing.claim_settle(),
            coast_clear: timing.coast_clear(),
        }
    }

    pub fn account(&self) -> &str {
        &self.account.name
    }

    /// Plays the turn, then shuts the surface down.
    pub async fn run(self) -> Result<SessionReport, OfficiantError> {
        let result = self.play().await;
        if let Err(err) = self.surface.shutdown().await {
            warn!(account = %self.account.name, error = %err, "surface shutdown failed");
        }
        self.phase(SessionPhase::Finished);
        result
    }

    async fn play(&self) -> Result<SessionReport, OfficiantError> {
        self.phase(SessionPhase::Starting);
        match self.surface.health_check().await? {
            HealthStatus::Healthy => {}
            HealthStatus::Degraded(reason) => {
                warn!(account = %self.account.name, %reason, "surface degraded, continuing");
            }
            HealthStatus::Unhealthy(reason) => {
                return Err(OfficiantError::Ui {
                    message: format!("surface `{}` is unhealthy: {reason}", self.surface.name()),
                    source: None,
                });
            }
        }

        let display_name = self.surface.display_name().await?;
        self.registry.register(display_name.clone());
        info!(account = %self.account.name, %display_name, "session started");

        let mut turn = Turn {
            display_name,
            report: SessionReport {
                account: self.account.name.clone(),
                ..SessionReport::default()
            },
        };
        turn.report.display_name = turn.display_name.clone();

        self.phase(SessionPhase::WaitingForQuiet);
        self.wait_for_quiet().await?;

        if self.options.announce_start && !self.account.announcement_message.is_empty() {
            let request = CorrelationRequest::free_text(
                self.account.announcement_message.clone(),
                turn.display_name.clone(),
            );
            match self.correlator.exchange(&request).await {
                Ok(_) => {}
                Err(OfficiantError::CommandDisabled { .. }) => {
                    warn!(account = %self.account.name, "announcement refused by the channel");
                }
                Err(err) => return Err(err),
            }
        }

        self.phase(SessionPhase::Checking);
        let panel = self.fetch_panel(&turn.display_name).await?;
        debug!(account = %self.account.name, ?panel, "status panel");

        self.phase(SessionPhase::SideActions);
        self.side_actions(&panel, &mut turn).await?;

        self.phase(SessionPhase::Rolling);
        let mut claim = ClaimState::from_panel(&panel);
        self.roll_series(
            &[Command::RollKakera],
            panel.premium_rolls_left,
            &mut claim,
            &mut turn,
        )
        .await?;
        self.roll_series(
            &self.account.roll_commands(),
            panel.rolls_left,
            &mut claim,
            &mut turn,
        )
        .await?;

        let panel = if panel.rolls_left > 0 {
            let fresh = self.fetch_panel(&turn.display_name).await?;
            claim = ClaimState::from_panel(&fresh);
            fresh
        } else {
            panel
        };

        if !turn.report.rolls.is_empty() && panel.is_claim_hour() && claim.can_claim {
            self.phase(SessionPhase::Claiming);
            self.claim_best(&mut turn).await?;
        }

        info!(
            account = %self.account.name,
            rolls = turn.report.rolls.len(),
            claimed = turn.report.claimed.as_deref().unwrap_or("nothing"),
            "turn complete"
        );
        Ok(turn.report)
    }

    /// Sleeps until the newest log entry is at least `coast_clear` old.
    async fn wait_for_quiet(&self) -> Result<(), OfficiantError> {
        while let Some(latest) = self.correlator.tail().await? {
            let age = Utc::now()
                .signed_duration_since(latest.sent_at)
                .to_std()
                .unwrap_or(Duration::ZERO);
            if age >= self.coast_clear {
                break;
            }
            let remaining = self.coast_clear - age;
            info!(
                account = %self.account.name,
                entry_id = %latest.id,
                wait_ms = remaining.as_millis() as u64,
                "waiting for the channel to go quiet"
            );
            tokio::time::sleep(remaining).await;
        }
        Ok(())
    }

    /// Fetches and decodes this account's status panel.
    ///
    /// A foreign panel or a missed response is retried once. A panel too
    /// short for the row schema is retried once after submitting the layout
    /// command.
    pub async fn fetch_panel(&self, display_name: &str) -> Result<StatusPanel, OfficiantError> {
        let request = CorrelationRequest::command(Command::TimersUp, display_name);
        let mut attempt = 1;
        let mut arranged = false;

        loop {
            let result = match self.correlator.exchange(&request).await {
                Ok(message) => decode_panel(&message, &self.account.name),
                Err(err) => Err(err),
            };

            match result {
                Ok(panel) => return Ok(panel),
                Err(err) if err.is_structural() && !arranged => {
                    warn!(account = %self.account.name, error = %err, "status panel malformed, arranging layout");
                    arranged = true;
                    let arrange = CorrelationRequest::command(Command::TimersUpArrange, display_name)
                        .with_param(TIMERS_UP_ARRANGE_PARAM);
                    self.correlator.exchange(&arrange).await?;
                }
                Err(err)
                    if attempt < PANEL_ATTEMPTS
                        && (err.is_correlation_miss()
                            || matches!(err, OfficiantError::IdentityMismatch { .. })) =>
                {
                    warn!(account = %self.account.name, attempt, error = %err, "status fetch failed, retrying");
                    attempt += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }

    async fn side_actions(&self, panel: &StatusPanel, turn: &mut Turn) -> Result<(), OfficiantError> {
        let planned = [
            (self.options.do_daily && panel.daily_ready, Command::Daily),
            (
                self.options.do_daily_kakera && panel.daily_kakera_ready && !panel.can_react(),
                Command::DailyKakera,
            ),
            (self.options.do_pokeslot && panel.side_slot_ready, Command::Pokeslot),
        ];

        for command in planned.into_iter().filter(|(due, _)| *due).map(|(_, c)| c) {
            let request = CorrelationRequest::command(command, turn.display_name.clone());
            match self.correlator.exchange(&request).await {
                Ok(_) => turn.report.side_actions.push(command),
                Err(OfficiantError::CommandDisabled { .. }) => {
                    warn!(account = %self.account.name, %command, "side action disabled in this channel");
                    turn.report.disabled.push(command);
                }
                Err(err) => return Err(err),
            }
        }
        Ok(())
    }

    /// Rolls `count` times, cycling through `order`.
    async fn roll_series(
        &self,
        order: &[Command],
        count: u32,
        claim: &mut ClaimState,
        turn: &mut Turn,
    ) -> Result<(), OfficiantError> {
        if order.is_empty() {
            return Ok(());
        }

        for command in order.iter().cycle().take(count as usize).copied() {
            let request = CorrelationRequest::command(command, turn.display_name.clone());
            let message = self.correlator.exchange(&request).await?;
            let mut roll = self.decode_with_actions(&message).await?;
            info!(account = %self.account.name, %command, roll = %roll, "rolled");

            if strategy::wish_claimable(&roll, claim, &self.registry) {
                info!(
                    account = %self.account.name,
                    name = %roll.subject_name,
                    wished_by = ?roll.wished_by,
                    "claiming a cooperating account's wish"
                );
                self.ensure_claim(claim, &turn.display_name).await?;
                let fresh = self.refresh_roll(&message).await?;
                match fresh.wish_button() {
                    Some(button) => self.correlator.press(fresh.entry_id, button).await?,
                    None => warn!(account = %self.account.name, name = %fresh.subject_name, "wish button gone"),
                }
                roll.owner = Some(turn.display_name.clone());
                claim.can_claim = false;
                turn.report.wish_claims.push(roll.subject_name.clone());
                turn.report.rolls.push(roll);
                continue;
            }

            if self.options.do_react {
                self.react_kakera(&roll).await?;
            }

            if strategy::greed_claimable(&roll, claim, &self.account) {
                self.ensure_claim(claim, &turn.display_name).await?;
                info!(account = %self.account.name, name = %roll.subject_name, "claiming");
                self.correlator
                    .react(roll.entry_id, &self.account.react_emoji)
                    .await?;
                roll.owner = Some(turn.display_name.clone());
                claim.can_claim = false;
                turn.report.greed_claims.push(roll.subject_name.clone());
            }

            turn.report.rolls.push(roll);
        }
        Ok(())
    }

    /// Presses every allowed kakera button on the roll.
    ///
    /// Buttons vanish when someone else takes them first; failing to press
    /// one is logged and the turn goes on.
    async fn react_kakera(&self, roll: &Roll) -> Result<(), OfficiantError> {
        let allowed = self.account.allowed_buttons();
        let buttons: Vec<ButtonAction> = roll
            .kakera_buttons()
            .into_iter()
            .filter(|button| allowed.contains(button))
            .collect();

        for button in buttons {
            if let Err(err) = self.correlator.press(roll.entry_id, button).await {
                warn!(account = %self.account.name, %button, error = %err, "kakera press failed");
            }
        }
        Ok(())
    }

    /// Uses the claim timer reset when no claim is available right now.
    async fn ensure_claim(&self, claim: &mut ClaimState, display_name: &str) -> Result<(), OfficiantError> {
        if claim.can_claim {
            return Ok(());
        }
        info!(account = %self.account.name, "resetting the claim timer");
        let request = CorrelationRequest::command(Command::ResetClaimTimer, display_name);
        self.correlator.exchange(&request).await?;
        claim.can_reset = false;
        claim.can_claim = true;
        Ok(())
    }

    /// Claims the best roll of the turn that nobody took in the meantime.
    async fn claim_best(&self, turn: &mut Turn) -> Result<(), OfficiantError> {
        let mut candidates: Vec<Roll> = turn
            .report
            .rolls
            .iter()
            .filter(|roll| !roll.claimed())
            .cloned()
            .collect();

        while let Some(index) = strategy::best_roll(&candidates) {
            let roll = candidates.remove(index);
            let Some(message) = self.correlator.reread(roll.entry_id).await? else {
                warn!(account = %self.account.name, name = %roll.subject_name, "roll out of reach");
                continue;
            };
            let fresh = self.decode_with_actions(&message).await?;
            if fresh.claimed() {
                debug!(account = %self.account.name, name = %fresh.subject_name, "claimed meanwhile, skipping");
                continue;
            }

            info!(account = %self.account.name, name = %fresh.subject_name, value = fresh.value, "claiming best roll");
            self.correlator
                .react(fresh.entry_id, &self.account.react_emoji)
                .await?;
            tokio::time::sleep(self.claim_settle).await;
            turn.report.claimed = Some(fresh.subject_name.clone());

            if let Some(note) = strategy::stranger_wish_note(&fresh, &self.registry) {
                let request = CorrelationRequest::command(Command::Note, turn.display_name.clone())
                    .with_param(note.clone());
                self.correlator.exchange(&request).await?;
                turn.report.note = Some(note);
            }
            return Ok(());
        }

        debug!(account = %self.account.name, "no roll left to claim");
        Ok(())
    }

    async fn refresh_roll(&self, message: &Message) -> Result<Roll, OfficiantError> {
        let message = self.correlator.refresh(message).await?;
        self.decode_with_actions(&message).await
    }

    async fn decode_with_actions(&self, message: &Message) -> Result<Roll, OfficiantError> {
        let roll = decode_roll(message)?;
        let actions = self.correlator.buttons_for(roll.entry_id).await?;
        Ok(roll.with_actions(actions))
    }

    fn phase(&self, phase: SessionPhase) {
        debug!(account = %self.account.name, %phase, "session phase");
    }
}

/// Mutable state of one turn.
struct Turn {
    display_name: String,
    report: SessionReport,
}
