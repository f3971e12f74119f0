// SPDX-FileCopyrightText: 2026 Officiant Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Scripted turns played against an in-memory channel.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use officiant_agent::{SessionRunner, run_server, run_sessions};
use officiant_channel::DisplayNameRegistry;
use officiant_config::{AccountConfig, RetryConfig, ServerOptions, TimingConfig, load_config_from_str};
use officiant_core::error::OfficiantError;
use officiant_core::traits::ChatSurface;
use officiant_core::types::{ButtonAction, Command, HealthStatus, TIMERS_UP_ARRANGE_PARAM};
use officiant_test_utils::{PanelText, Reply, ScriptedSurface, plain_message, roll_content};
use tracing_test::traced_test;

fn surface() -> Arc<ScriptedSurface> {
    Arc::new(ScriptedSurface::new("Alice"))
}

fn runner(
    surface: &Arc<ScriptedSurface>,
    account: AccountConfig,
    options: ServerOptions,
    registry: &DisplayNameRegistry,
) -> SessionRunner {
    SessionRunner::new(
        account,
        options,
        surface.clone(),
        registry.clone(),
        &TimingConfig::default(),
        &RetryConfig::default(),
    )
}

fn alice() -> AccountConfig {
    AccountConfig::named("alice")
}

fn panel(text: PanelText) -> Reply {
    Reply::content(text.render())
}

/// Claim available, within the claim hour, with `rolls` free rolls.
fn claim_hour(rolls: u32) -> PanelText {
    PanelText {
        can_claim: true,
        claim_reset: "45".into(),
        rolls,
        ..PanelText::idle("alice")
    }
}

fn spent() -> PanelText {
    PanelText {
        can_claim: false,
        claim_reset: "45".into(),
        ..PanelText::idle("alice")
    }
}

#[tokio::test(start_paused = true)]
async fn idle_turn_only_checks_status() {
    let surface = surface();
    let registry = DisplayNameRegistry::new();
    surface.script(Command::TimersUp, panel(PanelText::idle("alice"))).await;

    let report = runner(&surface, alice(), ServerOptions::default(), &registry)
        .run()
        .await
        .unwrap();

    assert_eq!(report.account, "alice");
    assert_eq!(report.display_name, "Alice");
    assert!(report.rolls.is_empty());
    assert_eq!(surface.submitted_texts().await, vec!["/tu"]);
    assert!(surface.is_shut_down().await);
    assert!(registry.contains("Alice"));
}

#[tokio::test(start_paused = true)]
async fn waits_for_the_channel_to_go_quiet() {
    let surface = surface();
    surface
        .seed("Bob", plain_message("Bob", "my turn"), Duration::from_secs(5))
        .await;
    surface.script(Command::TimersUp, panel(PanelText::idle("alice"))).await;
    let start = tokio::time::Instant::now();

    runner(&surface, alice(), ServerOptions::default(), &DisplayNameRegistry::new())
        .run()
        .await
        .unwrap();

    assert!(start.elapsed() >= Duration::from_secs(10), "{:?}", start.elapsed());
}

#[tokio::test(start_paused = true)]
async fn announcement_is_posted_first() {
    let surface = surface();
    surface.script(Command::TimersUp, panel(PanelText::idle("alice"))).await;
    let options = ServerOptions {
        announce_start: true,
        ..ServerOptions::default()
    };

    runner(&surface, alice(), options, &DisplayNameRegistry::new())
        .run()
        .await
        .unwrap();

    assert_eq!(surface.submitted_texts().await, vec!["It's roll time! 🎲", "/tu"]);
}

#[tokio::test(start_paused = true)]
async fn side_actions_run_when_ready_and_disabled_ones_are_skipped() {
    let surface = surface();
    surface
        .script(
            Command::TimersUp,
            panel(PanelText {
                daily_ready: true,
                dk_ready: true,
                pokeslot_ready: true,
                ..PanelText::idle("alice")
            }),
        )
        .await;
    surface.script(Command::Pokeslot, Reply::disabled()).await;

    let report = runner(&surface, alice(), ServerOptions::default(), &DisplayNameRegistry::new())
        .run()
        .await
        .unwrap();

    assert_eq!(report.side_actions, vec![Command::Daily, Command::DailyKakera]);
    assert_eq!(report.disabled, vec![Command::Pokeslot]);
    assert_eq!(
        surface.submitted_texts().await,
        vec!["/tu", "/daily", "/kakera dailyk", "/pokeslot"]
    );
}

#[tokio::test(start_paused = true)]
async fn side_actions_follow_server_options() {
    let surface = surface();
    surface
        .script(
            Command::TimersUp,
            panel(PanelText {
                daily_ready: true,
                dk_ready: true,
                power: 100,
                cost: 34,
                ..PanelText::idle("alice")
            }),
        )
        .await;
    let options = ServerOptions {
        do_daily: false,
        ..ServerOptions::default()
    };

    let report = runner(&surface, alice(), options, &DisplayNameRegistry::new())
        .run()
        .await
        .unwrap();

    // Daily is switched off; the daily kakera waits while reaction power remains.
    assert!(report.side_actions.is_empty());
    assert_eq!(surface.submitted_texts().await, vec!["/tu"]);
}

#[tokio::test(start_paused = true)]
async fn rolls_react_and_claim_the_most_valuable() {
    let surface = surface();
    surface.script(Command::TimersUp, panel(claim_hour(2))).await;
    surface
        .script(
            Command::RollAny,
            Reply::content(roll_content("Rem", "Re:Zero", 300))
                .with_buttons(vec![ButtonAction::Purple, ButtonAction::Blue]),
        )
        .await;
    surface
        .script(
            Command::RollAny,
            Reply::content(roll_content("Emilia", "Re:Zero", 500))
                .with_buttons(vec![ButtonAction::Purple]),
        )
        .await;
    surface.script(Command::TimersUp, panel(claim_hour(0))).await;

    let report = runner(&surface, alice(), ServerOptions::default(), &DisplayNameRegistry::new())
        .run()
        .await
        .unwrap();

    assert_eq!(report.rolls.len(), 2);
    let rem = report.rolls[0].entry_id;
    let emilia = report.rolls[1].entry_id;
    assert_eq!(report.claimed.as_deref(), Some("Emilia"));
    assert_eq!(report.note, None);
    assert_eq!(
        surface.presses().await,
        vec![
            (rem, ButtonAction::Purple),
            (rem, ButtonAction::Blue),
            (emilia, ButtonAction::Purple)
        ]
    );
    assert_eq!(surface.reactions().await, vec![(emilia, "🎲".to_string())]);
    assert_eq!(surface.submitted_texts().await, vec!["/tu", "/mx", "/mx", "/tu"]);
}

#[tokio::test(start_paused = true)]
async fn premium_rolls_come_first_and_roll_order_cycles() {
    let surface = surface();
    surface
        .script(
            Command::TimersUp,
            panel(PanelText {
                rolls: 3,
                premium_rolls: 1,
                ..PanelText::idle("alice")
            }),
        )
        .await;
    surface.script(Command::TimersUp, panel(PanelText::idle("alice"))).await;
    let mut account = alice();
    account.roll_order = vec!["/wa".into(), "/ha".into()];

    runner(&surface, account, ServerOptions::default(), &DisplayNameRegistry::new())
        .run()
        .await
        .unwrap();

    assert_eq!(
        surface.submitted_texts().await,
        vec!["/tu", "/mk", "/wa", "/ha", "/wa", "/tu"]
    );
}

#[tokio::test(start_paused = true)]
async fn only_allowed_kakera_buttons_are_pressed() {
    let surface = surface();
    surface.script(Command::TimersUp, panel(PanelText { rolls: 1, ..PanelText::idle("alice") })).await;
    surface
        .script(
            Command::RollAny,
            Reply::content(roll_content("Rem", "Re:Zero", 300))
                .with_buttons(vec![ButtonAction::Blue, ButtonAction::Rainbow]),
        )
        .await;
    surface.script(Command::TimersUp, panel(PanelText::idle("alice"))).await;
    let mut account = alice();
    account.allowed_kakera_reacts = vec!["kakeraW".into()];

    let report = runner(&surface, account, ServerOptions::default(), &DisplayNameRegistry::new())
        .run()
        .await
        .unwrap();

    let rem = report.rolls[0].entry_id;
    assert_eq!(surface.presses().await, vec![(rem, ButtonAction::Rainbow)]);
}

#[tokio::test(start_paused = true)]
async fn cooperating_wish_is_claimed_with_the_wish_button() {
    let surface = surface();
    let registry = DisplayNameRegistry::new();
    registry.register("Bob");
    surface.script(Command::TimersUp, panel(claim_hour(1))).await;
    surface
        .script(
            Command::RollAny,
            Reply::content(format!("Wished by Bob\n{}", roll_content("Rem", "Re:Zero", 300)))
                .with_buttons(vec![ButtonAction::Wish, ButtonAction::Purple]),
        )
        .await;
    surface.script(Command::TimersUp, panel(spent())).await;

    let report = runner(&surface, alice(), ServerOptions::default(), &registry)
        .run()
        .await
        .unwrap();

    let rem = report.rolls[0].entry_id;
    assert_eq!(report.wish_claims, vec!["Rem"]);
    assert_eq!(report.rolls[0].owner.as_deref(), Some("Alice"));
    assert_eq!(surface.presses().await, vec![(rem, ButtonAction::Wish)]);
    assert!(surface.reactions().await.is_empty());
    assert_eq!(report.claimed, None);
}

#[tokio::test(start_paused = true)]
async fn wish_claim_resets_the_claim_timer_when_needed() {
    let surface = surface();
    let registry = DisplayNameRegistry::new();
    registry.register("Bob");
    surface
        .script(
            Command::TimersUp,
            panel(PanelText {
                rolls: 1,
                rt_available: true,
                ..PanelText::idle("alice")
            }),
        )
        .await;
    surface
        .script(
            Command::RollAny,
            Reply::content(format!("Wished by Bob\n{}", roll_content("Rem", "Re:Zero", 300)))
                .with_buttons(vec![ButtonAction::Wish]),
        )
        .await;
    surface.script(Command::TimersUp, panel(PanelText::idle("alice"))).await;

    runner(&surface, alice(), ServerOptions::default(), &registry)
        .run()
        .await
        .unwrap();

    assert_eq!(
        surface.submitted_texts().await,
        vec!["/tu", "/mx", "/rollsutil resetclaimtimer", "/tu"]
    );
    assert_eq!(surface.presses().await.len(), 1);
}

#[tokio::test(start_paused = true)]
async fn wishlist_match_is_claimed_on_the_spot() {
    let surface = surface();
    surface.script(Command::TimersUp, panel(claim_hour(1))).await;
    surface
        .script(Command::RollAny, Reply::content(roll_content("Rem", "Re:Zero", 30)))
        .await;
    surface.script(Command::TimersUp, panel(spent())).await;
    let mut account = alice();
    account.wishlist = vec!["Rem".into()];
    account.react_emoji = "❤️".into();

    let report = runner(&surface, account, ServerOptions::default(), &DisplayNameRegistry::new())
        .run()
        .await
        .unwrap();

    let rem = report.rolls[0].entry_id;
    assert_eq!(report.greed_claims, vec!["Rem"]);
    assert_eq!(surface.reactions().await, vec![(rem, "❤️".to_string())]);
    assert_eq!(report.claimed, None);
}

#[tokio::test(start_paused = true)]
async fn best_roll_claimed_meanwhile_is_skipped() {
    let surface = surface();
    surface.script(Command::TimersUp, panel(claim_hour(2))).await;
    surface
        .script(
            Command::RollAny,
            Reply::content(roll_content("Emilia", "Re:Zero", 500))
                .edited_on_refetch("Emilia\nBelongs to Bob\nRe:Zero\n500"),
        )
        .await;
    surface
        .script(Command::RollAny, Reply::content(roll_content("Rem", "Re:Zero", 300)))
        .await;
    surface.script(Command::TimersUp, panel(claim_hour(0))).await;

    let report = runner(&surface, alice(), ServerOptions::default(), &DisplayNameRegistry::new())
        .run()
        .await
        .unwrap();

    let rem = report.rolls[1].entry_id;
    assert_eq!(report.claimed.as_deref(), Some("Rem"));
    assert_eq!(surface.reactions().await, vec![(rem, "🎲".to_string())]);
}

#[tokio::test(start_paused = true)]
async fn claim_wished_by_strangers_leaves_a_note() {
    let surface = surface();
    surface.script(Command::TimersUp, panel(claim_hour(1))).await;
    surface
        .script(
            Command::RollAny,
            Reply::content(format!("Wished by Carol\n{}", roll_content("Rem", "Re:Zero", 300)))
                .with_buttons(vec![ButtonAction::Wish]),
        )
        .await;
    surface.script(Command::TimersUp, panel(claim_hour(0))).await;

    let report = runner(&surface, alice(), ServerOptions::default(), &DisplayNameRegistry::new())
        .run()
        .await
        .unwrap();

    assert_eq!(report.claimed.as_deref(), Some("Rem"));
    assert_eq!(report.note.as_deref(), Some("Rem $ wish: Carol"));
    let submissions = surface.submissions().await;
    let note = submissions.last().unwrap();
    assert_eq!(note.text, "/note");
    assert_eq!(note.param.as_deref(), Some("Rem $ wish: Carol"));
}

#[tokio::test(start_paused = true)]
async fn no_claim_outside_claim_hour() {
    let surface = surface();
    surface
        .script(
            Command::TimersUp,
            panel(PanelText {
                can_claim: true,
                claim_reset: "2h 21".into(),
                rolls: 1,
                ..PanelText::idle("alice")
            }),
        )
        .await;
    surface
        .script(Command::RollAny, Reply::content(roll_content("Rem", "Re:Zero", 300)))
        .await;
    surface
        .script(
            Command::TimersUp,
            panel(PanelText {
                can_claim: true,
                claim_reset: "2h 20".into(),
                ..PanelText::idle("alice")
            }),
        )
        .await;

    let report = runner(&surface, alice(), ServerOptions::default(), &DisplayNameRegistry::new())
        .run()
        .await
        .unwrap();

    assert_eq!(report.claimed, None);
    assert!(surface.reactions().await.is_empty());
}

#[tokio::test(start_paused = true)]
async fn foreign_panel_is_retried_once_then_aborts() {
    let surface = surface();
    surface.script(Command::TimersUp, panel(PanelText::idle("bob"))).await;
    surface.script(Command::TimersUp, panel(PanelText::idle("bob"))).await;

    let err = runner(&surface, alice(), ServerOptions::default(), &DisplayNameRegistry::new())
        .run()
        .await
        .unwrap_err();

    assert!(matches!(err, OfficiantError::IdentityMismatch { .. }), "got: {err:?}");
    assert_eq!(surface.submitted_texts().await, vec!["/tu", "/tu"]);
    assert!(surface.is_shut_down().await);
}

#[tokio::test(start_paused = true)]
async fn foreign_panel_then_own_panel_succeeds() {
    let surface = surface();
    surface.script(Command::TimersUp, panel(PanelText::idle("bob"))).await;
    surface.script(Command::TimersUp, panel(PanelText::idle("alice"))).await;

    let report = runner(&surface, alice(), ServerOptions::default(), &DisplayNameRegistry::new())
        .run()
        .await;

    assert!(report.is_ok());
}

#[tokio::test(start_paused = true)]
async fn short_panel_triggers_the_layout_command() {
    let surface = surface();
    surface
        .script(Command::TimersUp, Reply::content("alice, you can claim right now!"))
        .await;
    surface.script(Command::TimersUp, panel(PanelText::idle("alice"))).await;

    runner(&surface, alice(), ServerOptions::default(), &DisplayNameRegistry::new())
        .run()
        .await
        .unwrap();

    let submissions = surface.submissions().await;
    let texts: Vec<&str> = submissions.iter().map(|s| s.text.as_str()).collect();
    assert_eq!(texts, vec!["/tu", "/rollsutil tuarrange", "/tu"]);
    assert_eq!(submissions[1].param.as_deref(), Some(TIMERS_UP_ARRANGE_PARAM));
}

#[tokio::test(start_paused = true)]
async fn panel_still_short_after_layout_aborts() {
    let surface = surface();
    surface
        .script(Command::TimersUp, Reply::content("alice, you can claim right now!"))
        .await;
    surface
        .script(Command::TimersUp, Reply::content("alice, you can claim right now!"))
        .await;

    let err = runner(&surface, alice(), ServerOptions::default(), &DisplayNameRegistry::new())
        .run()
        .await
        .unwrap_err();

    assert!(err.is_structural(), "got: {err:?}");
}

#[tokio::test(start_paused = true)]
async fn unhealthy_surface_aborts_before_any_command() {
    let surface = Arc::new(
        ScriptedSurface::new("Alice").with_health(HealthStatus::Unhealthy("browser crashed".into())),
    );

    let err = runner(&surface, alice(), ServerOptions::default(), &DisplayNameRegistry::new())
        .run()
        .await
        .unwrap_err();

    assert!(matches!(err, OfficiantError::Ui { .. }), "got: {err:?}");
    assert!(surface.submissions().await.is_empty());
    assert!(surface.is_shut_down().await);
}

#[tokio::test(start_paused = true)]
#[traced_test]
async fn one_failed_session_does_not_stop_the_others() {
    let registry = DisplayNameRegistry::new();
    let healthy = surface();
    healthy.script(Command::TimersUp, panel(PanelText::idle("alice"))).await;
    let broken = Arc::new(
        ScriptedSurface::new("Bobby").with_health(HealthStatus::Unhealthy("no profile".into())),
    );

    let outcomes = run_sessions(vec![
        runner(&healthy, alice(), ServerOptions::default(), &registry),
        runner(&broken, AccountConfig::named("bob"), ServerOptions::default(), &registry),
    ])
    .await;

    assert_eq!(outcomes.len(), 2);
    assert_eq!(outcomes[0].account, "alice");
    assert!(outcomes[0].result.is_ok());
    assert_eq!(outcomes[1].account, "bob");
    assert!(outcomes[1].result.is_err());
    assert!(healthy.is_shut_down().await);
    assert!(broken.is_shut_down().await);
    assert!(logs_contain("session aborted"));
}

#[tokio::test(start_paused = true)]
async fn server_run_resolves_configured_accounts() {
    let config = load_config_from_str(
        r#"
[[accounts]]
name = "alice"

[[servers]]
name = "home"
server_id = 1
roll_channel_id = 2
accounts = ["alice", "ghost"]
"#,
    )
    .unwrap();
    let alice_surface = surface();
    alice_surface
        .script(Command::TimersUp, panel(PanelText::idle("alice")))
        .await;
    let surfaces: HashMap<&str, Arc<ScriptedSurface>> =
        HashMap::from([("alice", alice_surface.clone())]);

    let outcomes = run_server(&config, &config.servers[0], |_, name| {
        let surface: Arc<dyn ChatSurface> = match surfaces.get(name) {
            Some(surface) => surface.clone(),
            None => Arc::new(ScriptedSurface::new(name)),
        };
        surface
    })
    .await;

    assert_eq!(outcomes.len(), 2);
    assert!(outcomes.iter().any(|o| o.account == "alice" && o.result.is_ok()));
    assert!(outcomes.iter().any(|o| {
        o.account == "ghost" && matches!(o.result, Err(OfficiantError::Config(_)))
    }));
}
