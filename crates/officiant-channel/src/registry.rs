// SPDX-FileCopyrightText: 2026 Officiant Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Display names of the accounts taking part in one run.
//!
//! Sessions register their account's display name when they start. A roll
//! wished by a registered name is being wished by a cooperating account,
//! not a stranger. The registry only grows and lives for one run.

use std::sync::Arc;

use dashmap::DashSet;

/// A concurrent, append-only set of display names shared across sessions.
#[derive(Debug, Clone, Default)]
pub struct DisplayNameRegistry {
    names: Arc<DashSet<String>>,
}

impl DisplayNameRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a name. Returns `false` if it was already registered.
    pub fn register(&self, name: impl Into<String>) -> bool {
        self.names.insert(name.into())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    /// Whether any of `names` belongs to a cooperating account.
    pub fn any_registered<'a>(&self, names: impl IntoIterator<Item = &'a String>) -> bool {
        names.into_iter().any(|name| self.contains(name))
    }

    /// Registered names, sorted.
    pub fn snapshot(&self) -> Vec<String> {
        let mut names: Vec<String> = self.names.iter().map(|name| name.clone()).collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}
