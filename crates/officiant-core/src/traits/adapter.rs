// SPDX-FileCopyrightText: 2026 Officiant Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Base adapter trait that every UI surface implementation must provide.

use async_trait::async_trait;

use crate::error::OfficiantError;
use crate::types::HealthStatus;

/// The base trait for UI surfaces driven by a session.
///
/// A surface owns one browser or client window pointed at one channel.
/// Sessions check its health before starting and always shut it down when
/// they finish, successfully or not.
#[async_trait]
pub trait SurfaceAdapter: Send + Sync + 'static {
    /// Returns the human-readable name of this surface instance.
    fn name(&self) -> &str;

    /// Performs a health check and returns the surface's current status.
    async fn health_check(&self) -> Result<HealthStatus, OfficiantError>;

    /// Gracefully shuts down the surface, releasing any held resources.
    async fn shutdown(&self) -> Result<(), OfficiantError>;
}
