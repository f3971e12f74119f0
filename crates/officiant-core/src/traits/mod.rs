// SPDX-FileCopyrightText: 2026 Officiant Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Adapter traits implemented by the UI-driving layer.
//!
//! The correlator and the session runner only ever talk to the chat client
//! through these traits; browser automation lives outside this workspace.

pub mod action;
pub mod adapter;
pub mod channel;
pub mod command;
pub mod log;

pub use action::ActionInvoker;
pub use adapter::SurfaceAdapter;
pub use channel::ChatSurface;
pub use command::CommandSubmitter;
pub use log::LogAccess;
