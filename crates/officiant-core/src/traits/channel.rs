// SPDX-FileCopyrightText: 2026 Officiant Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The full chat surface a session drives.

use async_trait::async_trait;

use crate::error::OfficiantError;
use crate::traits::action::ActionInvoker;
use crate::traits::adapter::SurfaceAdapter;
use crate::traits::command::CommandSubmitter;
use crate::traits::log::LogAccess;

/// One account's view of one channel: log reads, command submission, and
/// entry controls, plus the account identity the chat client shows.
#[async_trait]
pub trait ChatSurface: SurfaceAdapter + LogAccess + CommandSubmitter + ActionInvoker {
    /// The display name the chat client shows for the logged-in account in
    /// this server. Display names differ between servers.
    async fn display_name(&self) -> Result<String, OfficiantError>;
}
