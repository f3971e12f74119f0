// SPDX-FileCopyrightText: 2026 Officiant Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./officiant.toml` > `~/.config/officiant/officiant.toml`
//! > `/etc/officiant/officiant.toml`, with environment variable overrides via
//! the `OFFICIANT_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external

use std::path::{Path, PathBuf};

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::model::OfficiantConfig;

pub const LOCAL_CONFIG: &str = "officiant.toml";
pub const SYSTEM_CONFIG: &str = "/etc/officiant/officiant.toml";

/// Path of the per-user config file, if the platform has a config dir.
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("officiant").join(LOCAL_CONFIG))
}

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/officiant/officiant.toml`
/// 3. `~/.config/officiant/officiant.toml`
/// 4. `./officiant.toml`
/// 5. `OFFICIANT_*` environment variables
pub fn load_config() -> Result<OfficiantConfig, figment::Error> {
    build_figment().extract()
}

/// Build the layered Figment before extraction.
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(OfficiantConfig::default()))
        .merge(Toml::file(SYSTEM_CONFIG))
        .merge(Toml::file(user_config_path().unwrap_or_default()))
        .merge(Toml::file(LOCAL_CONFIG))
        .merge(env_provider())
}

/// Load configuration from a TOML string only (no files, no env).
pub fn load_config_from_str(toml_content: &str) -> Result<OfficiantConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(OfficiantConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from one explicit file, with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<OfficiantConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(OfficiantConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Environment provider with an explicit section mapping.
///
/// `OFFICIANT_TIMING_POLL_INTERVAL_MS` must become `timing.poll_interval_ms`,
/// not `timing.poll.interval.ms`, so `Env::split("_")` cannot be used.
/// Only the scalar sections are reachable from the environment.
fn env_provider() -> Env {
    Env::prefixed("OFFICIANT_").map(|key| {
        let mapped = key
            .as_str()
            .replacen("agent_", "agent.", 1)
            .replacen("timing_", "timing.", 1)
            .replacen("retry_", "retry.", 1);
        mapped.into()
    })
}
