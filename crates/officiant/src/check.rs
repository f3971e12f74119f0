// SPDX-FileCopyrightText: 2026 Officiant Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `officiant check-config` summary output.

use std::fmt::Write;

use officiant_config::OfficiantConfig;

/// One line per server and account, for a configuration that validated.
pub fn summarize(config: &OfficiantConfig) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "configuration ok: {} account(s), {} server(s)",
        config.accounts.len(),
        config.servers.len()
    );

    for server in &config.servers {
        let _ = writeln!(
            out,
            "server {} ({}/{}) rolls at :{:02} with {}",
            server.name,
            server.server_id,
            server.roll_channel_id,
            server.minute_of_hour_to_roll,
            server.accounts.join(", ")
        );
    }

    for account in &config.accounts {
        let order: Vec<String> = account
            .roll_commands()
            .iter()
            .map(ToString::to_string)
            .collect();
        let _ = writeln!(
            out,
            "account {}: rolls {}; wishlist {} name(s), {} series",
            account.name,
            order.join(" "),
            account.wishlist.len(),
            account.wishlist_series.len()
        );
    }
    out
}
