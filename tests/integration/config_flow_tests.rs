//! Companion-app configuration messages flowing through the AppService.

use scbatrack::Error;
use scbatrack::app::commands::AppCommand;
use scbatrack::app::events::AppEvent;
use scbatrack::app::service::AppService;
use scbatrack::team::engine::ClampMode;
use scbatrack::catalog::BottleIndex;
use scbatrack::config::{ConfigStore, ConfigUpdate, NAMESPACE};
use scbatrack::team::{TeamSlot, Timestamp};
use scbatrack::units::UnitSystem;

use super::mock_store::{MockStore, RecordingSink};

const T0: Timestamp = 1_704_096_000;

fn slot(raw: usize) -> TeamSlot {
    TeamSlot::new(raw).unwrap()
}

fn bottle(raw: usize) -> BottleIndex {
    BottleIndex::new(raw).unwrap()
}

fn fresh() -> (AppService, MockStore, RecordingSink) {
    (
        AppService::new(ConfigStore::default()),
        MockStore::new(),
        RecordingSink::new(),
    )
}

#[test]
fn message_updates_and_persists_fields() {
    let (mut app, mut store, mut sink) = fresh();
    let applied = app
        .apply_config_message(r#"{"breath_rate": 400, "type5": "1"}"#, &mut store, &mut sink)
        .unwrap();

    assert_eq!(applied, 2);
    assert_eq!(app.config().breathing_rate, 400);
    assert!(app.config().is_available(bottle(4)));
    assert_eq!(store.writes_to("breath_rate"), 1);
    assert_eq!(store.writes_to("bottle4"), 1);
    assert_eq!(
        sink.count(|e| matches!(e, AppEvent::ConfigChanged(_))),
        2
    );
}

#[test]
fn enabling_and_defaulting_in_one_message() {
    let (mut app, mut store, mut sink) = fresh();
    // Keys arrive default-first; the enable still has to land before it.
    let applied = app
        .apply_config_message(r#"{"def_bottle": 6, "type6": true}"#, &mut store, &mut sink)
        .unwrap();

    assert_eq!(applied, 2);
    assert_eq!(app.config().default_bottle, bottle(5));
    for s in TeamSlot::all() {
        assert_eq!(app.team(s).record.bottle, bottle(5));
    }
}

#[test]
fn disabling_default_moves_it_and_refreshes_idle_teams() {
    let (mut app, mut store, mut sink) = fresh();
    app.handle_command(
        AppCommand::Start {
            slot: slot(1),
            bottle: bottle(0),
            pressure: 300,
        },
        T0,
        &mut store,
        &mut sink,
    )
    .unwrap();

    app.apply_config_message(r#"{"type1": 0}"#, &mut store, &mut sink)
        .unwrap();

    assert!(!app.config().is_available(bottle(0)));
    assert_eq!(app.config().default_bottle, bottle(1));
    assert_eq!(app.team(slot(0)).record.bottle, bottle(1));
    assert_eq!(app.team(slot(2)).record.bottle, bottle(1));
    // A running team keeps the bottle it was started with.
    assert_eq!(app.team(slot(1)).record.bottle, bottle(0));
    assert_eq!(store.writes_to("def_bottle"), 1);
}

#[test]
fn invalid_fields_are_skipped() {
    let (mut app, mut store, mut sink) = fresh();
    let applied = app
        .apply_config_message(
            r#"{"breath_rate": 0, "imperial": "yes", "colour": 3}"#,
            &mut store,
            &mut sink,
        )
        .unwrap();

    assert_eq!(applied, 0);
    assert_eq!(app.config().breathing_rate, 500);
    assert_eq!(app.config().units, UnitSystem::Metric);
    assert!(store.writes.is_empty());
    assert!(sink.events.is_empty());
}

#[test]
fn last_enabled_bottle_cannot_be_disabled() {
    let (mut app, mut store, mut sink) = fresh();
    app.apply_config_message(
        r#"{"type1": 0, "type2": 0, "type3": 0}"#,
        &mut store,
        &mut sink,
    )
    .unwrap();
    assert_eq!(app.config().default_bottle, bottle(3));

    let result = app.apply_config(
        ConfigUpdate::BottleAvailable {
            bottle: bottle(3),
            available: false,
        },
        &mut store,
        &mut sink,
    );
    assert!(matches!(result, Err(Error::Config(_))));
    assert!(app.config().is_available(bottle(3)));
}

#[test]
fn malformed_message_is_rejected() {
    let (mut app, mut store, mut sink) = fresh();
    assert_eq!(
        app.apply_config_message("[1, 2]", &mut store, &mut sink),
        Err(Error::MalformedMessage)
    );
    assert_eq!(
        app.apply_config_message("{not json", &mut store, &mut sink),
        Err(Error::MalformedMessage)
    );
}

#[test]
fn switching_units_converts_running_and_idle_teams() {
    let (mut app, mut store, mut sink) = fresh();
    app.handle_command(
        AppCommand::Start {
            slot: slot(0),
            bottle: bottle(0),
            pressure: 300,
        },
        T0,
        &mut store,
        &mut sink,
    )
    .unwrap();
    store.clear_log();

    app.apply_config_message(r#"{"imperial": true}"#, &mut store, &mut sink)
        .unwrap();

    let running = app.team(slot(0)).record;
    assert_eq!(running.unit, UnitSystem::Imperial);
    assert_eq!(running.pressure, 4351);
    assert_eq!(running.volume, 24_000);
    assert_eq!(store.writes_to("team0"), 1);
    assert_eq!(app.team(slot(2)).record.pressure, 4351);
    assert_eq!(
        sink.count(|e| matches!(e, AppEvent::UnitsReconciled { .. })),
        1
    );
}

#[test]
fn configuration_survives_reboot() {
    let (mut app, mut store, mut sink) = fresh();
    app.apply_config_message(
        r#"{"breath_rate": 650, "type6": 1, "def_bottle": 6, "imperial": 1}"#,
        &mut store,
        &mut sink,
    )
    .unwrap();
    let before = app.config().clone();

    let rebooted = AppService::load(&mut store, T0, &mut RecordingSink::new());
    assert_eq!(rebooted.config(), &before);
    assert!(store.get(NAMESPACE, "imperial").is_some());
    assert_eq!(rebooted.team(slot(0)).record.unit, UnitSystem::Imperial);
}

#[test]
fn bottle_disabled_mid_configuration_cannot_be_started() {
    let (mut app, mut store, mut sink) = fresh();
    app.handle_command(
        AppCommand::SetBottle {
            slot: slot(0),
            bottle: bottle(2),
        },
        T0,
        &mut store,
        &mut sink,
    )
    .unwrap();
    app.handle_command(
        AppCommand::AdjustPressure {
            slot: slot(0),
            delta: -10,
            mode: ClampMode::Wrap,
        },
        T0,
        &mut store,
        &mut sink,
    )
    .unwrap();

    app.apply_config_message(r#"{"type3": 0}"#, &mut store, &mut sink)
        .unwrap();
    // Still being configured, so the refresh left it alone.
    assert_eq!(app.team(slot(0)).record.bottle, bottle(2));

    let result = app.handle_command(AppCommand::CommitPressure(slot(0)), T0, &mut store, &mut sink);
    assert_eq!(result, Err(Error::BottleUnavailable(2)));
    let team = app.team(slot(0));
    assert!(!team.is_active());
    assert!(!team.is_editing());
    assert_eq!(team.record.bottle, bottle(0));
    assert!(store.get(NAMESPACE, "team0").is_none());
}
