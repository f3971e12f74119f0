// SPDX-FileCopyrightText: 2026 Officiant Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Checks cross-references and ranges that serde attributes cannot express:
//! account names referenced by servers, roll commands, button names, and
//! lower bounds on poll and retry budgets.

use std::collections::HashSet;

use officiant_core::types::{ButtonAction, Command};

use crate::diagnostic::ConfigError;
use crate::model::OfficiantConfig;

/// Validate a deserialized configuration.
///
/// Collects every failure instead of stopping at the first.
pub fn validate_config(config: &OfficiantConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();
    let mut invalid = |message: String| errors.push(ConfigError::Validation { message });

    if config.timing.max_polls < 1 {
        invalid("timing.max_polls must be at least 1".to_string());
    }
    if config.timing.history_window < 1 {
        invalid("timing.history_window must be at least 1".to_string());
    }
    if config.retry.correlation_attempts < 1 {
        invalid("retry.correlation_attempts must be at least 1".to_string());
    }
    if config.retry.transient_attempts < 1 {
        invalid("retry.transient_attempts must be at least 1".to_string());
    }
    if config.retry.click_attempts < 1 {
        invalid("retry.click_attempts must be at least 1".to_string());
    }

    let mut seen_names = HashSet::new();
    for (i, account) in config.accounts.iter().enumerate() {
        if account.name.trim().is_empty() {
            invalid(format!("accounts[{i}].name must not be empty"));
        } else if !seen_names.insert(account.name.as_str()) {
            invalid(format!(
                "duplicate account name `{}` in [[accounts]] array",
                account.name
            ));
        }

        if account.roll_order.is_empty() {
            invalid(format!("accounts[{i}].roll_order must not be empty"));
        }
        for text in &account.roll_order {
            match text.parse::<Command>() {
                Ok(command) if command.is_roll() => {}
                Ok(command) => invalid(format!(
                    "accounts[{i}].roll_order entry `{command}` is not a roll command"
                )),
                Err(_) => invalid(format!(
                    "accounts[{i}].roll_order entry `{text}` is not a known command"
                )),
            }
        }

        for name in &account.allowed_kakera_reacts {
            match name.parse::<ButtonAction>() {
                Ok(button) if button.is_kakera() => {}
                _ => invalid(format!(
                    "accounts[{i}].allowed_kakera_reacts entry `{name}` is not a kakera button"
                )),
            }
        }

        if account.react_emoji.trim().is_empty() {
            invalid(format!("accounts[{i}].react_emoji must not be empty"));
        }
    }

    for (i, server) in config.servers.iter().enumerate() {
        if server.minute_of_hour_to_roll >= 60 {
            invalid(format!(
                "servers[{i}].minute_of_hour_to_roll must be below 60, got {}",
                server.minute_of_hour_to_roll
            ));
        }
        for name in &server.accounts {
            if config.account(name).is_none() {
                invalid(format!(
                    "servers[{i}] (`{}`) references unknown account `{name}`",
                    server.name
                ));
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
