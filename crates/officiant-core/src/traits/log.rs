// SPDX-FileCopyrightText: 2026 Officiant Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Read access to the shared, append-only channel log.

use async_trait::async_trait;

use crate::error::OfficiantError;
use crate::types::{EntryId, LogEntry};

/// Read access to the channel log rendered by the chat client.
///
/// Implementations must return entries in stable append order. A snapshot
/// that went stale while being read is reported as
/// [`OfficiantError::TransientUi`] so callers can re-fetch.
#[async_trait]
pub trait LogAccess: Send + Sync {
    /// Returns up to `limit` of the most recent entries, most recent last.
    async fn fetch_tail(&self, limit: usize) -> Result<Vec<LogEntry>, OfficiantError>;

    /// Re-reads a single entry. `None` once it has scrolled out of reach.
    async fn fetch_by_id(&self, id: EntryId) -> Result<Option<LogEntry>, OfficiantError>;
}
