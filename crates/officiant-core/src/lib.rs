// SPDX-FileCopyrightText: 2026 Officiant Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for Officiant.
//!
//! This crate provides the error type, the value types of the shared channel
//! log, the game bot's command and button catalogs, and the adapter traits
//! the UI-driving layer implements. Decoders, the correlator, and the session
//! runner all build on these.

pub mod error;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::OfficiantError;
pub use types::{
    ButtonAction, Command, CommandRef, EntryId, HealthStatus, LogEntry, MessageSource,
    TIMERS_UP_ARRANGE_PARAM,
};

pub use traits::{ActionInvoker, ChatSurface, CommandSubmitter, LogAccess, SurfaceAdapter};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_classification() {
        let transient = OfficiantError::TransientUi {
            message: "stale element".into(),
        };
        assert!(transient.is_transient());
        assert!(!transient.is_correlation_miss());

        let timeout = OfficiantError::ResponseTimeout {
            command: "/tu".into(),
            attempts: 10,
        };
        assert!(timeout.is_correlation_miss());
        assert!(!timeout.is_transient());

        let failed = OfficiantError::CorrelationFailed {
            command: "/mx".into(),
        };
        assert!(failed.is_correlation_miss());

        let panel = OfficiantError::MalformedPanel {
            row: 12,
            field: "side_slot",
            available: 4,
        };
        assert!(panel.is_structural());

        let disabled = OfficiantError::CommandDisabled {
            command: "/daily".into(),
        };
        assert!(!disabled.is_transient());
        assert!(!disabled.is_correlation_miss());
        assert!(!disabled.is_structural());
    }

    #[test]
    fn command_text_round_trips_through_parse() {
        use strum::IntoEnumIterator;

        for command in Command::iter() {
            let parsed: Command = command.text().parse().expect("should parse back");
            assert_eq!(command, parsed);
            assert_eq!(command.to_string(), command.text());
        }
    }

    #[test]
    fn roll_family_membership() {
        assert!(Command::RollKakera.is_roll());
        assert!(Command::RollWaifuAnimanga.is_roll());
        assert!(Command::RollHusbandoGame.is_roll());
        assert!(!Command::TimersUp.is_roll());
        assert!(!Command::Daily.is_roll());
        assert!(!Command::Note.is_roll());
    }

    #[test]
    fn unknown_invocation_text_is_data() {
        assert_eq!(CommandRef::parse("/tu"), CommandRef::Known(Command::TimersUp));
        assert_eq!(
            CommandRef::parse("/rollsutil tuarrange"),
            CommandRef::Known(Command::TimersUpArrange)
        );
        let unknown = CommandRef::parse("/imagine");
        assert_eq!(unknown, CommandRef::Unknown("/imagine".into()));
        assert_eq!(unknown.known(), None);
        assert!(!unknown.is(Command::TimersUp));
    }

    #[test]
    fn command_serializes_as_invocation_text() {
        let json = serde_json::to_string(&Command::DailyKakera).expect("should serialize");
        assert_eq!(json, "\"/kakera dailyk\"");
        let parsed: Command = serde_json::from_str("\"/wa\"").expect("should deserialize");
        assert_eq!(parsed, Command::RollWaifuAnimanga);
    }

    #[test]
    fn button_actions_parse_from_accessible_names() {
        assert_eq!("💗".parse::<ButtonAction>().ok(), Some(ButtonAction::Wish));
        assert_eq!("kakera".parse::<ButtonAction>().ok(), Some(ButtonAction::Blue));
        assert_eq!("kakeraL".parse::<ButtonAction>().ok(), Some(ButtonAction::Light));
        assert!("thumbsup".parse::<ButtonAction>().is_err());

        let kakera = ButtonAction::all_kakera();
        assert_eq!(kakera.len(), 9);
        assert!(!kakera.contains(&ButtonAction::Wish));
    }

    #[test]
    fn rendered_lines_split_on_line_breaks() {
        let entry = LogEntry::new(
            EntryId(7),
            "Mudae",
            "a\nb\n\nc",
            chrono::Utc::now(),
        );
        assert_eq!(entry.rendered_lines(), vec!["a", "b", "", "c"]);
        assert!(EntryId(7) > EntryId(6));
    }

    #[test]
    fn all_trait_modules_are_exported() {
        fn _assert_surface_adapter<T: SurfaceAdapter>() {}
        fn _assert_log_access<T: LogAccess>() {}
        fn _assert_command_submitter<T: CommandSubmitter>() {}
        fn _assert_action_invoker<T: ActionInvoker>() {}
        fn _assert_chat_surface<T: ChatSurface>() {}
    }
}
