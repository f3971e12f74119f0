// SPDX-FileCopyrightText: 2026 Officiant Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Command/response correlation over the shared channel log.
//!
//! [`Correlator`] submits one command at a time on a
//! [`ChatSurface`](officiant_core::ChatSurface) and resolves the entry that
//! answers it. [`DisplayNameRegistry`] is the run-wide set of cooperating
//! accounts shared between concurrent sessions.

pub mod correlator;
pub mod registry;

pub use correlator::{CorrelationRequest, CorrelationSettings, Correlator};
pub use registry::DisplayNameRegistry;
