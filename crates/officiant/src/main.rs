// SPDX-FileCopyrightText: 2026 Officiant Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Officiant - roll automation for a bot-driven collection game.
//!
//! This is the binary entry point. It validates configuration and decodes
//! rendered channel entries; the browser-driving layer that plays sessions
//! embeds the library crates directly.

mod check;
mod decode;

use std::io::Read;
use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::decode::DecodeKind;

/// Officiant - roll automation for a bot-driven collection game.
#[derive(Parser, Debug)]
#[command(name = "officiant", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Load and validate configuration, then print a summary.
    CheckConfig {
        /// Read this file instead of the configuration hierarchy.
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Decode a rendered channel entry and print it as JSON.
    Decode {
        #[arg(value_enum)]
        kind: DecodeKind,
        /// Read the entry from this file instead of stdin.
        #[arg(long)]
        file: Option<PathBuf>,
        /// Display name of the entry's author.
        #[arg(long, default_value = "Mudae")]
        author: String,
        /// Account name a status panel must belong to.
        #[arg(long)]
        expected_owner: Option<String>,
    },
}

fn main() {
    let cli = Cli::parse();

    match cli.command {
        Commands::CheckConfig { config } => {
            let loaded = match &config {
                Some(path) => officiant_config::load_and_validate_path(path),
                None => officiant_config::load_and_validate(),
            };
            match loaded {
                Ok(config) => {
                    init_tracing(&config.agent.log_level);
                    tracing::debug!(accounts = config.accounts.len(), "configuration valid");
                    print!("{}", check::summarize(&config));
                }
                Err(errors) => {
                    officiant_config::render_errors(&errors);
                    std::process::exit(1);
                }
            }
        }
        Commands::Decode {
            kind,
            file,
            author,
            expected_owner,
        } => {
            init_tracing("warn");
            let raw = match read_input(file.as_ref()) {
                Ok(raw) => raw,
                Err(err) => {
                    eprintln!("officiant: cannot read input: {err}");
                    std::process::exit(1);
                }
            };
            let today = chrono::Local::now().date_naive();
            match decode::decode_text(kind, &raw, &author, expected_owner.as_deref(), today) {
                Ok(json) => println!("{json}"),
                Err(err) => {
                    eprintln!("officiant: {err}");
                    std::process::exit(1);
                }
            }
        }
    }
}

fn read_input(file: Option<&PathBuf>) -> std::io::Result<String> {
    match file {
        Some(path) => std::fs::read_to_string(path),
        None => {
            let mut raw = String::new();
            std::io::stdin().read_to_string(&mut raw)?;
            Ok(raw)
        }
    }
}

/// Installs the stderr subscriber. `RUST_LOG` overrides `default_level`.
fn init_tracing(default_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("warn,officiant={default_level}")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
