// SPDX-FileCopyrightText: 2026 Officiant Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Officiant.
//!
//! Provides a scripted in-memory chat surface and builders for raw entry
//! text, so correlator and session tests run without a browser.

pub mod render;
pub mod scripted_surface;

pub use render::{BOT_NAME, PanelText, bot_reply, plain_message, roll_content, slash_response};
pub use scripted_surface::{Reply, ScriptedSurface, Submission};
