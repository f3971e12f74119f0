// SPDX-FileCopyrightText: 2026 Officiant Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Which rolls to claim, and how.

use officiant_channel::DisplayNameRegistry;
use officiant_config::AccountConfig;
use officiant_decode::{Roll, StatusPanel};

/// Claim capacity tracked across one turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClaimState {
    pub can_claim: bool,
    /// The claim timer reset is in stock.
    pub can_reset: bool,
}

impl ClaimState {
    pub fn from_panel(panel: &StatusPanel) -> Self {
        Self {
            can_claim: panel.can_claim,
            can_reset: panel.reset_claim_timer_available,
        }
    }

    /// A claim is possible now or after resetting the timer.
    pub fn available(&self) -> bool {
        self.can_claim || self.can_reset
    }
}

/// Wished by a cooperating account, still free, and claimable.
pub fn wish_claimable(roll: &Roll, state: &ClaimState, registry: &DisplayNameRegistry) -> bool {
    roll.wished && !roll.claimed() && state.available() && registry.any_registered(&roll.wished_by)
}

/// On the account's wishlists or past one of its greed thresholds.
pub fn greed_claimable(roll: &Roll, state: &ClaimState, account: &AccountConfig) -> bool {
    if !state.available() || roll.claimed() {
        return false;
    }
    account.wishlist.iter().any(|name| *name == roll.subject_name)
        || account.wishlist_series.iter().any(|series| *series == roll.series_name)
        || roll.rank <= account.greed_threshold_rank
        || roll.value >= account.greed_threshold_kakera
}

/// Index of the roll to claim at the end of a turn.
///
/// The most valuable wished, unclaimed roll wins; without one, the most
/// valuable roll overall. Ties go to the earlier roll.
pub fn best_roll(rolls: &[Roll]) -> Option<usize> {
    most_valuable(rolls, |roll| roll.wished && !roll.claimed())
        .or_else(|| most_valuable(rolls, |_| true))
}

fn most_valuable(rolls: &[Roll], eligible: impl Fn(&Roll) -> bool) -> Option<usize> {
    rolls
        .iter()
        .enumerate()
        .filter(|(_, roll)| eligible(roll))
        .fold(None, |best: Option<(usize, u32)>, (index, roll)| match best {
            Some((_, value)) if value >= roll.value => best,
            _ => Some((index, roll.value)),
        })
        .map(|(index, _)| index)
}

/// Note text recording who wished for a roll claimed on their behalf.
///
/// `None` when the roll was not wished, or a cooperating account wished it.
pub fn stranger_wish_note(roll: &Roll, registry: &DisplayNameRegistry) -> Option<String> {
    if !roll.wished || registry.any_registered(&roll.wished_by) {
        return None;
    }
    let wishers: Vec<&str> = roll.wished_by.iter().map(String::as_str).collect();
    Some(format!("{} $ wish: {}", roll.subject_name, wishers.join(", ")))
}
