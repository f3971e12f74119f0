// SPDX-FileCopyrightText: 2026 Officiant Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Session runner for the Officiant roll automation.
//!
//! A [`SessionRunner`] plays one account's turn on one server:
//! - Waits for the channel to go quiet
//! - Reads the status panel and performs the ready side actions
//! - Rolls, reacts to kakera, and claims wishes and wishlist matches
//! - Claims the best remaining roll during claim hour
//!
//! [`run_sessions`] plays several accounts concurrently. Sessions share
//! nothing but the run's [`DisplayNameRegistry`], and one account's failure
//! never stops the others.

pub mod session;
pub mod strategy;

use std::sync::Arc;

use futures::future::join_all;
use tracing::{error, info};

use officiant_channel::DisplayNameRegistry;
use officiant_config::{OfficiantConfig, ServerConfig};
use officiant_core::error::OfficiantError;
use officiant_core::traits::ChatSurface;

pub use session::{SessionPhase, SessionReport, SessionRunner};

/// The outcome of one account's session.
#[derive(Debug)]
pub struct SessionOutcome {
    pub account: String,
    pub result: Result<SessionReport, OfficiantError>,
}

/// Runs every session concurrently, one task each, and collects the outcomes
/// in input order.
pub async fn run_sessions(sessions: Vec<SessionRunner>) -> Vec<SessionOutcome> {
    let accounts: Vec<String> = sessions.iter().map(|s| s.account().to_string()).collect();
    let handles: Vec<_> = sessions
        .into_iter()
        .map(|session| tokio::spawn(session.run()))
        .collect();

    let joined = join_all(handles).await;

    accounts
        .into_iter()
        .zip(joined)
        .map(|(account, joined)| {
            let result = joined.unwrap_or_else(|err| {
                Err(OfficiantError::Internal(format!("session task failed: {err}")))
            });
            match &result {
                Ok(report) => info!(
                    account = %account,
                    rolls = report.rolls.len(),
                    "session finished"
                ),
                Err(err) => error!(account = %account, error = %err, "session aborted"),
            }
            SessionOutcome { account, result }
        })
        .collect()
}

/// Runs the sessions of every account configured for `server`.
///
/// `connect` opens a chat surface for an account on the server's roll
/// channel. Accounts that are not configured are reported as failures.
pub async fn run_server<F>(
    config: &OfficiantConfig,
    server: &ServerConfig,
    connect: F,
) -> Vec<SessionOutcome>
where
    F: Fn(&ServerConfig, &str) -> Arc<dyn ChatSurface>,
{
    info!(server = %server.name, accounts = server.accounts.len(), "rolling on server");
    let registry = DisplayNameRegistry::new();
    let mut missing = Vec::new();
    let mut sessions = Vec::new();

    for name in &server.accounts {
        match config.account(name) {
            Some(account) => sessions.push(SessionRunner::new(
                account.clone(),
                server.options(),
                connect(server, name),
                registry.clone(),
                &config.timing,
                &config.retry,
            )),
            None => missing.push(SessionOutcome {
                account: name.clone(),
                result: Err(OfficiantError::Config(format!(
                    "server `{}` references unknown account `{name}`",
                    server.name
                ))),
            }),
        }
    }

    let mut outcomes = run_sessions(sessions).await;
    outcomes.extend(missing);
    outcomes
}
