// SPDX-FileCopyrightText: 2026 Officiant Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Scripted chat surface for deterministic testing.
//!
//! `ScriptedSurface` implements every adapter trait over an in-memory log.
//! Submitting a known command consumes the next [`Reply`] scripted for it
//! and appends the bot's answer; free text is appended as the account's own
//! plain message. Presses, reactions, and submissions are captured for
//! assertions.
//!
//! Entry ages follow tokio's clock, so with a paused runtime an entry seeded
//! ten seconds old is fifteen seconds old after a five second sleep.

use std::collections::{HashMap, VecDeque};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, TimeDelta, Utc};
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::debug;

use officiant_core::error::OfficiantError;
use officiant_core::traits::{
    ActionInvoker, ChatSurface, CommandSubmitter, LogAccess, SurfaceAdapter,
};
use officiant_core::types::{ButtonAction, Command, EntryId, HealthStatus, LogEntry};

use crate::render::{BOT_NAME, plain_message, slash_response};

const PLACEHOLDER: &str = "Sending command...";
const DISABLED: &str = "Command DISABLED for this channel.";

/// What the bot does in answer to one submission.
#[derive(Debug, Clone)]
pub struct Reply {
    outcome: Outcome,
    buttons: Vec<ButtonAction>,
    delay_reads: u32,
    placeholder_reads: u32,
    invoker: Option<String>,
    command_text: Option<String>,
    edited: Option<String>,
    followed_by: Vec<(String, String)>,
}

#[derive(Debug, Clone)]
enum Outcome {
    Content(String),
    Disabled,
    Absent,
}

impl Reply {
    fn with_outcome(outcome: Outcome) -> Self {
        Self {
            outcome,
            buttons: Vec::new(),
            delay_reads: 0,
            placeholder_reads: 0,
            invoker: None,
            command_text: None,
            edited: None,
            followed_by: Vec::new(),
        }
    }

    /// A response carrying `content` below the slash header.
    pub fn content(content: impl Into<String>) -> Self {
        Self::with_outcome(Outcome::Content(content.into()))
    }

    /// The platform refuses the command.
    pub fn disabled() -> Self {
        Self::with_outcome(Outcome::Disabled)
    }

    /// The bot never answers.
    pub fn absent() -> Self {
        Self::with_outcome(Outcome::Absent)
    }

    pub fn with_buttons(mut self, buttons: Vec<ButtonAction>) -> Self {
        self.buttons = buttons;
        self
    }

    /// The response appears on the `reads`-th tail read after submission.
    pub fn delayed(mut self, reads: u32) -> Self {
        self.delay_reads = reads;
        self
    }

    /// The response shows the sending placeholder for `reads` tail reads.
    pub fn placeholder_for(mut self, reads: u32) -> Self {
        self.placeholder_reads = reads;
        self
    }

    /// Renders the response as invoked by someone else.
    pub fn invoked_by(mut self, invoker: impl Into<String>) -> Self {
        self.invoker = Some(invoker.into());
        self
    }

    /// Renders the response as answering different invocation text.
    pub fn answering(mut self, command_text: impl Into<String>) -> Self {
        self.command_text = Some(command_text.into());
        self
    }

    /// The content is replaced the first time the entry is re-read by id.
    pub fn edited_on_refetch(mut self, content: impl Into<String>) -> Self {
        self.edited = Some(content.into());
        self
    }

    /// Foreign traffic appended right after the response.
    pub fn followed_by(mut self, author: impl Into<String>, raw: impl Into<String>) -> Self {
        self.followed_by.push((author.into(), raw.into()));
        self
    }
}

/// One captured submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    pub text: String,
    pub param: Option<String>,
}

#[derive(Debug, Clone)]
struct StoredEntry {
    id: EntryId,
    author: String,
    raw: String,
    created: Instant,
    initial_age: Duration,
    /// Final text shown once the placeholder reads are used up.
    pending_final: Option<(u32, String)>,
    edited: Option<String>,
}

impl StoredEntry {
    fn render(&self) -> LogEntry {
        let age = self.initial_age + self.created.elapsed();
        let sent_at: DateTime<Utc> =
            Utc::now() - TimeDelta::from_std(age).unwrap_or(TimeDelta::zero());
        LogEntry::new(self.id, self.author.clone(), self.raw.clone(), sent_at)
    }
}

#[derive(Debug)]
struct Delayed {
    reads_left: u32,
    author: String,
    raw: String,
    reply: Reply,
}

#[derive(Debug, Default)]
struct State {
    entries: Vec<StoredEntry>,
    next_id: u64,
    delayed: Vec<Delayed>,
    replies: HashMap<Command, VecDeque<Reply>>,
    submissions: Vec<Submission>,
    presses: Vec<(EntryId, ButtonAction)>,
    reactions: Vec<(EntryId, String)>,
    buttons: HashMap<EntryId, Vec<ButtonAction>>,
    failing_reads: u32,
    failing_clicks: u32,
    tail_reads: u32,
    shut_down: bool,
}

impl State {
    fn append(&mut self, author: String, raw: String, initial_age: Duration) -> EntryId {
        self.next_id += 1;
        let id = EntryId(self.next_id);
        self.entries.push(StoredEntry {
            id,
            author,
            raw,
            created: Instant::now(),
            initial_age,
            pending_final: None,
            edited: None,
        });
        id
    }

    fn publish(&mut self, author: String, raw: String, reply: Reply) {
        let header = raw.split('\n').take(6).collect::<Vec<_>>().join("\n");
        let shown = if reply.placeholder_reads > 0 {
            format!("{header}\n{PLACEHOLDER}")
        } else {
            raw.clone()
        };
        let id = self.append(author, shown, Duration::ZERO);
        if !reply.buttons.is_empty() {
            self.buttons.insert(id, reply.buttons.clone());
        }
        if let Some(entry) = self.entries.last_mut() {
            if reply.placeholder_reads > 0 {
                entry.pending_final = Some((reply.placeholder_reads, raw));
            }
            entry.edited = reply
                .edited
                .as_ref()
                .map(|content| format!("{header}\n{content}"));
        }
        for (author, raw) in reply.followed_by {
            self.append(author, raw, Duration::ZERO);
        }
    }

    /// Advances scripted timing by one log read.
    fn tick(&mut self) {
        for entry in &mut self.entries {
            if let Some((reads, text)) = entry.pending_final.as_mut() {
                *reads = reads.saturating_sub(1);
                if *reads == 0 {
                    entry.raw = std::mem::take(text);
                    entry.pending_final = None;
                }
            }
        }

        let mut ready = Vec::new();
        self.delayed.retain_mut(|d| {
            d.reads_left = d.reads_left.saturating_sub(1);
            if d.reads_left == 0 {
                ready.push((d.author.clone(), d.raw.clone(), d.reply.clone()));
                false
            } else {
                true
            }
        });
        for (author, raw, reply) in ready {
            self.publish(author, raw, reply);
        }
    }
}

/// A chat surface backed by an in-memory log and a scripted bot.
pub struct ScriptedSurface {
    name: String,
    display_name: String,
    health: HealthStatus,
    state: Mutex<State>,
}

impl ScriptedSurface {
    /// A surface logged in as `display_name`.
    pub fn new(display_name: impl Into<String>) -> Self {
        let display_name = display_name.into();
        Self {
            name: format!("scripted-{display_name}"),
            display_name,
            health: HealthStatus::Healthy,
            state: Mutex::new(State::default()),
        }
    }

    /// Reports `status` from health checks.
    pub fn with_health(mut self, status: HealthStatus) -> Self {
        self.health = status;
        self
    }

    /// Appends an entry that is already `age` old.
    pub async fn seed(&self, author: &str, raw: impl Into<String>, age: Duration) -> EntryId {
        self.state
            .lock()
            .await
            .append(author.to_string(), raw.into(), age)
    }

    /// Appends a fresh entry from another actor.
    pub async fn inject_foreign(&self, author: &str, raw: impl Into<String>) -> EntryId {
        self.seed(author, raw, Duration::ZERO).await
    }

    /// Queues `reply` as the answer to the next submission of `command`.
    pub async fn script(&self, command: Command, reply: Reply) {
        self.state
            .lock()
            .await
            .replies
            .entry(command)
            .or_default()
            .push_back(reply);
    }

    /// Sets the buttons rendered on an existing entry.
    pub async fn set_buttons(&self, id: EntryId, buttons: Vec<ButtonAction>) {
        self.state.lock().await.buttons.insert(id, buttons);
    }

    /// The next `n` tail reads fail with a transient UI error.
    pub async fn fail_next_reads(&self, n: u32) {
        self.state.lock().await.failing_reads = n;
    }

    /// The next `n` presses or reactions fail with a transient UI error.
    pub async fn fail_next_clicks(&self, n: u32) {
        self.state.lock().await.failing_clicks = n;
    }

    pub async fn submissions(&self) -> Vec<Submission> {
        self.state.lock().await.submissions.clone()
    }

    /// Submitted texts, in order.
    pub async fn submitted_texts(&self) -> Vec<String> {
        self.state
            .lock()
            .await
            .submissions
            .iter()
            .map(|s| s.text.clone())
            .collect()
    }

    pub async fn presses(&self) -> Vec<(EntryId, ButtonAction)> {
        self.state.lock().await.presses.clone()
    }

    pub async fn reactions(&self) -> Vec<(EntryId, String)> {
        self.state.lock().await.reactions.clone()
    }

    /// Number of tail reads served so far.
    pub async fn tail_reads(&self) -> u32 {
        self.state.lock().await.tail_reads
    }

    pub async fn entry_count(&self) -> usize {
        self.state.lock().await.entries.len()
    }

    pub async fn is_shut_down(&self) -> bool {
        self.state.lock().await.shut_down
    }

    fn default_reply(command: Command) -> Reply {
        Reply::content(format!("{command} done."))
    }
}

#[async_trait]
impl SurfaceAdapter for ScriptedSurface {
    fn name(&self) -> &str {
        &self.name
    }

    async fn health_check(&self) -> Result<HealthStatus, OfficiantError> {
        Ok(self.health.clone())
    }

    async fn shutdown(&self) -> Result<(), OfficiantError> {
        self.state.lock().await.shut_down = true;
        Ok(())
    }
}

#[async_trait]
impl LogAccess for ScriptedSurface {
    async fn fetch_tail(&self, limit: usize) -> Result<Vec<LogEntry>, OfficiantError> {
        let mut state = self.state.lock().await;
        if state.failing_reads > 0 {
            state.failing_reads -= 1;
            return Err(OfficiantError::TransientUi {
                message: "stale element reference".to_string(),
            });
        }
        state.tail_reads += 1;
        state.tick();
        let skip = state.entries.len().saturating_sub(limit);
        Ok(state.entries[skip..].iter().map(StoredEntry::render).collect())
    }

    async fn fetch_by_id(&self, id: EntryId) -> Result<Option<LogEntry>, OfficiantError> {
        let mut state = self.state.lock().await;
        state.tick();
        let Some(entry) = state.entries.iter_mut().find(|e| e.id == id) else {
            return Ok(None);
        };
        if let Some(edited) = entry.edited.take() {
            entry.raw = edited;
        }
        Ok(Some(entry.render()))
    }
}

#[async_trait]
impl CommandSubmitter for ScriptedSurface {
    async fn submit(&self, text: &str, param: Option<&str>) -> Result<(), OfficiantError> {
        debug!(text, ?param, "scripted submit");
        let mut state = self.state.lock().await;
        state.submissions.push(Submission {
            text: text.to_string(),
            param: param.map(str::to_string),
        });

        let Ok(command) = text.parse::<Command>() else {
            let raw = plain_message(&self.display_name, text);
            state.append(self.display_name.clone(), raw, Duration::ZERO);
            return Ok(());
        };

        let reply = state
            .replies
            .get_mut(&command)
            .and_then(VecDeque::pop_front)
            .unwrap_or_else(|| Self::default_reply(command));

        let content = match &reply.outcome {
            Outcome::Content(content) => content.clone(),
            Outcome::Disabled => DISABLED.to_string(),
            Outcome::Absent => {
                for (author, raw) in reply.followed_by {
                    state.append(author, raw, Duration::ZERO);
                }
                return Ok(());
            }
        };
        let invoker = reply.invoker.as_deref().unwrap_or(&self.display_name);
        let command_text = reply.command_text.as_deref().unwrap_or(text);
        let raw = slash_response(invoker, command_text, &content);

        if reply.delay_reads > 0 {
            state.delayed.push(Delayed {
                reads_left: reply.delay_reads,
                author: BOT_NAME.to_string(),
                raw,
                reply,
            });
        } else {
            state.publish(BOT_NAME.to_string(), raw, reply);
        }
        Ok(())
    }
}

#[async_trait]
impl ActionInvoker for ScriptedSurface {
    async fn buttons(&self, entry: EntryId) -> Result<Vec<ButtonAction>, OfficiantError> {
        Ok(self
            .state
            .lock()
            .await
            .buttons
            .get(&entry)
            .cloned()
            .unwrap_or_default())
    }

    async fn press(&self, entry: EntryId, button: ButtonAction) -> Result<(), OfficiantError> {
        let mut state = self.state.lock().await;
        if state.failing_clicks > 0 {
            state.failing_clicks -= 1;
            return Err(OfficiantError::TransientUi {
                message: "element click intercepted".to_string(),
            });
        }
        let rendered = state
            .buttons
            .get(&entry)
            .is_some_and(|buttons| buttons.contains(&button));
        if !rendered {
            return Err(OfficiantError::Ui {
                message: format!("no `{button}` button on entry {entry}"),
                source: None,
            });
        }
        state.presses.push((entry, button));
        Ok(())
    }

    async fn react(&self, entry: EntryId, emoji: &str) -> Result<(), OfficiantError> {
        let mut state = self.state.lock().await;
        if state.failing_clicks > 0 {
            state.failing_clicks -= 1;
            return Err(OfficiantError::TransientUi {
                message: "element click intercepted".to_string(),
            });
        }
        state.reactions.push((entry, emoji.to_string()));
        Ok(())
    }
}

#[async_trait]
impl ChatSurface for ScriptedSurface {
    async fn display_name(&self) -> Result<String, OfficiantError> {
        Ok(self.display_name.clone())
    }
}
