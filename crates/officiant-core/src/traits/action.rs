// SPDX-FileCopyrightText: 2026 Officiant Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Clickable controls and reactions attached to a log entry.

use async_trait::async_trait;

use crate::error::OfficiantError;
use crate::types::{ButtonAction, EntryId};

/// Interacts with the live controls rendered below an entry.
///
/// Intercepted clicks and stale element references surface as
/// [`OfficiantError::TransientUi`]; callers wrap these calls in a bounded
/// retry policy.
#[async_trait]
pub trait ActionInvoker: Send + Sync {
    /// The buttons currently rendered on the entry. Changes over time.
    async fn buttons(&self, entry: EntryId) -> Result<Vec<ButtonAction>, OfficiantError>;

    /// Clicks one button on the entry.
    async fn press(&self, entry: EntryId, button: ButtonAction) -> Result<(), OfficiantError>;

    /// Adds an emoji reaction to the entry.
    async fn react(&self, entry: EntryId, emoji: &str) -> Result<(), OfficiantError>;
}
