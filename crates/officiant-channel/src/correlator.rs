// SPDX-FileCopyrightText: 2026 Officiant Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Locating the response to an issued command in the shared channel log.
//!
//! The log carries no request identifiers, so a response is tied to its
//! command by position and shape:
//!
//! 1. Record the id of the current tail entry (the watermark), submit, and
//!    wait a settle delay.
//! 2. Poll the tail until an entry above the watermark appears that is not
//!    a still-rendering placeholder, up to a fixed number of polls.
//! 3. Verify the candidate answers the expected command, was invoked by the
//!    expected account, and is fresh. Otherwise scan recent history for an
//!    entry above the watermark that does match. A match that is still
//!    rendering is re-read by id until it settles, within the same poll cap.
//! 4. Reject responses the platform replaced with its "command disabled"
//!    notice.
//!
//! A session issues commands strictly one at a time; two in-flight
//! commands on one surface would share a watermark.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tracing::{debug, info, warn};

use officiant_config::{RetryConfig, TimingConfig};
use officiant_core::error::OfficiantError;
use officiant_core::traits::ChatSurface;
use officiant_core::types::{ButtonAction, Command, EntryId, LogEntry};
use officiant_decode::Message;
use officiant_resilience::RetryPolicy;

/// One command or free-text message to submit and locate the response for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorrelationRequest {
    /// Text typed into the message box.
    pub text: String,
    pub param: Option<String>,
    /// The command the response must answer. `None` for free text, whose
    /// "response" is the posted message itself.
    pub expected_command: Option<Command>,
    /// Display name the response must be attributed to.
    pub expected_invoker: String,
}

impl CorrelationRequest {
    pub fn command(command: Command, invoker: impl Into<String>) -> Self {
        Self {
            text: command.text().to_string(),
            param: None,
            expected_command: Some(command),
            expected_invoker: invoker.into(),
        }
    }

    pub fn free_text(text: impl Into<String>, invoker: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            param: None,
            expected_command: None,
            expected_invoker: invoker.into(),
        }
    }

    pub fn with_param(mut self, param: impl Into<String>) -> Self {
        self.param = Some(param.into());
        self
    }

    /// Whether `message` has the shape of this request's response.
    ///
    /// Command responses must name the command and the invoker; free text
    /// must be a command-less entry authored by the invoker.
    pub fn matches(&self, message: &Message) -> bool {
        match self.expected_command {
            Some(command) => {
                message.known_command() == Some(command)
                    && message.invoking_user.as_deref() == Some(self.expected_invoker.as_str())
            }
            None => message.command.is_none() && message.author == self.expected_invoker,
        }
    }

    /// Whether `message` is a command response that has not finished rendering.
    fn awaits_render(&self, message: &Message) -> bool {
        self.expected_command.is_some() && message.is_sending_placeholder()
    }
}

/// Timing and retry knobs for correlation and entry controls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorrelationSettings {
    pub command_settle: Duration,
    pub message_settle: Duration,
    pub poll_interval: Duration,
    pub max_polls: u32,
    pub staleness: Duration,
    pub history_window: usize,
    pub button_load: Duration,
    /// Whole submit-and-correlate attempts made by [`Correlator::exchange`].
    pub correlation_attempts: u32,
    pub transient: RetryPolicy,
    pub click: RetryPolicy,
}

impl CorrelationSettings {
    pub fn from_config(timing: &TimingConfig, retry: &RetryConfig) -> Self {
        Self {
            command_settle: timing.command_settle(),
            message_settle: timing.message_settle(),
            poll_interval: timing.poll_interval(),
            max_polls: timing.max_polls,
            staleness: timing.staleness(),
            history_window: timing.history_window,
            button_load: timing.button_load(),
            correlation_attempts: retry.correlation_attempts,
            transient: RetryPolicy::transient(retry),
            click: RetryPolicy::click(retry),
        }
    }
}

impl Default for CorrelationSettings {
    fn default() -> Self {
        Self::from_config(&TimingConfig::default(), &RetryConfig::default())
    }
}

/// Submits commands on one surface and resolves their responses.
pub struct Correlator {
    surface: Arc<dyn ChatSurface>,
    settings: CorrelationSettings,
}

impl Correlator {
    pub fn new(surface: Arc<dyn ChatSurface>, settings: CorrelationSettings) -> Self {
        Self { surface, settings }
    }

    pub fn settings(&self) -> &CorrelationSettings {
        &self.settings
    }

    pub fn surface(&self) -> &Arc<dyn ChatSurface> {
        &self.surface
    }

    /// Submits and correlates, resubmitting when no response could be located.
    ///
    /// Only correlation misses are retried; a disabled command or any other
    /// failure is returned from the first attempt.
    pub async fn exchange(&self, request: &CorrelationRequest) -> Result<Message, OfficiantError> {
        RetryPolicy::new(self.settings.correlation_attempts, Duration::ZERO)
            .run_while("exchange", OfficiantError::is_correlation_miss, || {
                self.correlate(request)
            })
            .await
    }

    /// One submit-and-locate attempt.
    pub async fn correlate(&self, request: &CorrelationRequest) -> Result<Message, OfficiantError> {
        let watermark = self.tail().await?.map(|entry| entry.id);

        self.settings
            .transient
            .run("submit", || {
                self.surface.submit(&request.text, request.param.as_deref())
            })
            .await?;

        let settle = if request.expected_command.is_some() {
            self.settings.command_settle
        } else {
            self.settings.message_settle
        };
        tokio::time::sleep(settle).await;

        let candidate = self.poll_candidate(request, watermark).await?;

        let message = if request.matches(&candidate) && self.is_fresh(&candidate) {
            candidate
        } else {
            warn!(
                command = %request.text,
                entry_id = %candidate.id,
                invoker = candidate.invoking_user.as_deref().unwrap_or(&candidate.author),
                "tail entry does not answer the request, scanning history"
            );
            self.scan_history(request, watermark).await?
        };

        if message.is_command_disabled() {
            warn!(command = %request.text, entry_id = %message.id, "command disabled");
            return Err(OfficiantError::CommandDisabled {
                command: request.text.clone(),
            });
        }

        info!(command = %request.text, entry_id = %message.id, "response correlated");
        Ok(message)
    }

    /// Re-reads a previously correlated message from the live log.
    pub async fn refresh(&self, message: &Message) -> Result<Message, OfficiantError> {
        self.reread(message.id)
            .await?
            .ok_or_else(|| OfficiantError::CorrelationFailed {
                command: message.command_label(),
            })
    }

    /// Decodes the current rendering of an entry. `None` once it is out of reach.
    pub async fn reread(&self, id: EntryId) -> Result<Option<Message>, OfficiantError> {
        let entry = self
            .settings
            .transient
            .run("fetch_by_id", || self.surface.fetch_by_id(id))
            .await?;
        Ok(entry.as_ref().map(Message::decode))
    }

    /// Buttons rendered on an entry, after giving them time to load.
    pub async fn buttons_for(&self, entry: EntryId) -> Result<Vec<ButtonAction>, OfficiantError> {
        tokio::time::sleep(self.settings.button_load).await;
        self.settings
            .transient
            .run("buttons", || self.surface.buttons(entry))
            .await
    }

    pub async fn press(&self, entry: EntryId, button: ButtonAction) -> Result<(), OfficiantError> {
        debug!(entry_id = %entry, %button, "pressing button");
        self.settings
            .click
            .run("press", || self.surface.press(entry, button))
            .await
    }

    pub async fn react(&self, entry: EntryId, emoji: &str) -> Result<(), OfficiantError> {
        debug!(entry_id = %entry, emoji, "reacting");
        self.settings
            .click
            .run("react", || self.surface.react(entry, emoji))
            .await
    }

    /// The newest log entry, if any.
    pub async fn tail(&self) -> Result<Option<LogEntry>, OfficiantError> {
        let mut entries = self
            .settings
            .transient
            .run("fetch_tail", || self.surface.fetch_tail(1))
            .await?;
        Ok(entries.pop())
    }

    async fn poll_candidate(
        &self,
        request: &CorrelationRequest,
        watermark: Option<EntryId>,
    ) -> Result<Message, OfficiantError> {
        let polls = self.settings.max_polls.max(1);

        for poll in 1..=polls {
            if let Some(entry) = self.tail().await?
                && is_above(entry.id, watermark)
            {
                let message = Message::decode(&entry);
                if !request.awaits_render(&message) {
                    return Ok(message);
                }
                debug!(command = %request.text, poll, entry_id = %entry.id, "response still sending");
            } else {
                debug!(command = %request.text, poll, "no new entry yet");
            }

            if poll < polls {
                tokio::time::sleep(self.settings.poll_interval).await;
            }
        }

        Err(OfficiantError::ResponseTimeout {
            command: request.text.clone(),
            attempts: polls,
        })
    }

    async fn scan_history(
        &self,
        request: &CorrelationRequest,
        watermark: Option<EntryId>,
    ) -> Result<Message, OfficiantError> {
        let window = self.settings.history_window;
        let entries = self
            .settings
            .transient
            .run("fetch_tail", || self.surface.fetch_tail(window))
            .await?;

        let found = entries
            .iter()
            .rev()
            .filter(|entry| is_above(entry.id, watermark))
            .map(Message::decode)
            .find(|message| request.matches(message))
            .ok_or_else(|| OfficiantError::CorrelationFailed {
                command: request.text.clone(),
            })?;

        self.await_render(request, found).await
    }

    /// Re-reads a matching entry by id until it is no longer a placeholder.
    async fn await_render(
        &self,
        request: &CorrelationRequest,
        mut message: Message,
    ) -> Result<Message, OfficiantError> {
        let polls = self.settings.max_polls.max(1);
        let mut poll = 0;

        while request.awaits_render(&message) {
            if poll == polls {
                return Err(OfficiantError::ResponseTimeout {
                    command: request.text.clone(),
                    attempts: polls,
                });
            }
            poll += 1;
            debug!(command = %request.text, poll, entry_id = %message.id, "matching entry still sending");
            tokio::time::sleep(self.settings.poll_interval).await;

            message = self
                .reread(message.id)
                .await?
                .ok_or_else(|| OfficiantError::CorrelationFailed {
                    command: request.text.clone(),
                })?;
        }

        Ok(message)
    }

    fn is_fresh(&self, message: &Message) -> bool {
        Utc::now()
            .signed_duration_since(message.sent_at)
            .to_std()
            .map(|age| age <= self.settings.staleness)
            .unwrap_or(true)
    }
}

fn is_above(id: EntryId, watermark: Option<EntryId>) -> bool {
    watermark.is_none_or(|mark| id > mark)
}
