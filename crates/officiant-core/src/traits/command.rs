// SPDX-FileCopyrightText: 2026 Officiant Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Command submission through the chat client's message box.

use async_trait::async_trait;

use crate::error::OfficiantError;

/// Types a command or free text into the message box and sends it.
///
/// Fire-and-forget: the response is only ever observed through
/// [`LogAccess`](crate::traits::LogAccess).
#[async_trait]
pub trait CommandSubmitter: Send + Sync {
    async fn submit(&self, text: &str, param: Option<&str>) -> Result<(), OfficiantError>;
}
