//! Team lifecycle through the AppService: start, depletion, alarms,
//! confirmation, stop, and restore from storage.

use scbatrack::Error;
use scbatrack::app::commands::AppCommand;
use scbatrack::app::events::AppEvent;
use scbatrack::app::service::{AppService, TICKS_PER_ADVANCE};
use scbatrack::catalog::BottleIndex;
use scbatrack::config::{ConfigStore, NAMESPACE};
use scbatrack::team::{ClampMode, RecordError, TeamRecord, TeamSlot, TeamStatus, Timestamp};
use scbatrack::units::UnitSystem;

use super::mock_store::{MockStore, RecordingSink};

const T0: Timestamp = 1_704_096_000;

fn slot(raw: usize) -> TeamSlot {
    TeamSlot::new(raw).unwrap()
}

fn bottle(raw: usize) -> BottleIndex {
    BottleIndex::new(raw).unwrap()
}

struct Rig {
    app: AppService,
    store: MockStore,
    sink: RecordingSink,
    now: Timestamp,
}

impl Rig {
    fn new() -> Self {
        Self {
            app: AppService::new(ConfigStore::default()),
            store: MockStore::new(),
            sink: RecordingSink::new(),
            now: T0,
        }
    }

    fn cmd(&mut self, cmd: AppCommand) -> Result<(), Error> {
        self.app
            .handle_command(cmd, self.now, &mut self.store, &mut self.sink)
    }

    fn start(&mut self, s: usize, b: usize, pressure: u16) {
        self.cmd(AppCommand::Start {
            slot: slot(s),
            bottle: bottle(b),
            pressure,
        })
        .unwrap();
    }

    /// Run `n` depletion steps worth of one-second ticks.
    fn advances(&mut self, n: u32) {
        for _ in 0..n * TICKS_PER_ADVANCE {
            self.now += 1;
            self.app.tick(self.now, &mut self.store, &mut self.sink);
        }
    }

    fn stored(&self, s: usize) -> Option<TeamRecord> {
        let key = slot(s).storage_key();
        self.store
            .get(NAMESPACE, &key)
            .map(|bytes| TeamRecord::decode(bytes).unwrap())
    }
}

#[test]
fn start_persists_record_and_emits_event() {
    let mut rig = Rig::new();
    rig.start(0, 1, 300);

    let stored = rig.stored(0).expect("record persisted");
    assert_eq!(stored, rig.app.team(slot(0)).record);
    assert_eq!(stored.status, TeamStatus::FullNoAlarm);
    assert_eq!(stored.volume, 18_000);
    assert_eq!(stored.start_time, T0);
    assert!(matches!(
        rig.sink.events[0],
        AppEvent::TeamStarted { pressure: 300, at: T0, .. }
    ));
}

#[test]
fn one_advance_depletes_half_minute_of_air() {
    let mut rig = Rig::new();
    rig.start(0, 1, 300);
    rig.advances(1);

    let stored = rig.stored(0).unwrap();
    assert_eq!(stored.volume, 17_750);
    assert_eq!(stored.pressure, 295);
}

#[test]
fn third_full_alarm_fires_exactly_once() {
    let mut rig = Rig::new();
    rig.start(0, 1, 300);

    // 18000 - 14 * 250 = 14500 dl -> 241 bar
    rig.advances(14);
    assert_eq!(rig.app.team(slot(0)).record.pressure, 241);
    assert_eq!(rig.sink.count(|e| matches!(e, AppEvent::AlarmRaised { .. })), 0);

    // 14250 dl -> 237 bar
    rig.advances(1);
    assert_eq!(rig.app.team(slot(0)).record.pressure, 237);
    assert_eq!(
        rig.sink.count(|e| matches!(
            e,
            AppEvent::AlarmRaised {
                status: TeamStatus::ThirdFullAlarm,
                ..
            }
        )),
        1
    );

    rig.advances(5);
    assert_eq!(rig.sink.count(|e| matches!(e, AppEvent::AlarmRaised { .. })), 1);
    assert_eq!(rig.stored(0).unwrap().status, TeamStatus::ThirdFullAlarm);
}

#[test]
fn confirm_advances_to_confirmed_and_persists() {
    let mut rig = Rig::new();
    rig.start(0, 1, 300);
    rig.advances(15);

    rig.cmd(AppCommand::Confirm(slot(0))).unwrap();
    assert_eq!(rig.stored(0).unwrap().status, TeamStatus::ThirdFullConfirmed);
    assert!(rig.sink.events.contains(&AppEvent::AlarmConfirmed {
        slot: slot(0),
        status: TeamStatus::ThirdFullConfirmed,
    }));

    // Nothing pending any more: a second confirm changes nothing.
    rig.sink.take();
    rig.cmd(AppCommand::Confirm(slot(0))).unwrap();
    assert!(rig.sink.events.is_empty());
}

#[test]
fn alarm_facts_report_a_fired_alarm_for_one_tick() {
    let mut rig = Rig::new();
    rig.start(0, 1, 300);
    let utc = chrono::FixedOffset::east_opt(0).unwrap();

    // The 15th step lands on 237 bar on its last tick.
    rig.advances(15);
    assert!(rig.app.facts(slot(0), rig.now, utc).alarm_just_fired);

    rig.now += 1;
    rig.app.tick(rig.now, &mut rig.store, &mut rig.sink);
    let facts = rig.app.facts(slot(0), rig.now, utc);
    assert!(!facts.alarm_just_fired);
    assert!(facts.alarm_pending);

    rig.cmd(AppCommand::Confirm(slot(0))).unwrap();
    assert!(!rig.app.facts(slot(0), rig.now, utc).alarm_just_fired);
}

#[test]
fn mayday_pulse_is_reported_once_per_alert() {
    let mut rig = Rig::new();
    rig.start(0, 1, 50);
    let utc = chrono::FixedOffset::east_opt(0).unwrap();
    rig.advances(3);
    let facts = rig.app.facts(slot(0), rig.now, utc);
    assert!(facts.mayday);
    assert!(facts.mayday_alert);

    rig.now += 1;
    rig.app.tick(rig.now, &mut rig.store, &mut rig.sink);
    let facts = rig.app.facts(slot(0), rig.now, utc);
    assert!(facts.mayday);
    assert!(!facts.mayday_alert);
}

#[test]
fn mayday_alerts_once_every_twenty_advances() {
    let mut rig = Rig::new();
    // 50 bar * 60 = 3000 dl; 45, 41, then 37 bar on the third step.
    rig.start(0, 1, 50);
    rig.advances(2);
    assert_eq!(rig.sink.count(|e| matches!(e, AppEvent::Mayday { .. })), 0);
    assert_eq!(rig.app.team(slot(0)).record.status, TeamStatus::EmptyAlarm);

    rig.advances(1);
    assert_eq!(rig.sink.count(|e| matches!(e, AppEvent::Mayday { .. })), 1);

    rig.advances(19);
    assert_eq!(rig.sink.count(|e| matches!(e, AppEvent::Mayday { .. })), 1);

    rig.advances(1);
    assert_eq!(rig.sink.count(|e| matches!(e, AppEvent::Mayday { .. })), 2);
    assert_eq!(rig.app.team(slot(0)).record.volume, 0);
}

#[test]
fn stop_deletes_record_and_restores_defaults() {
    let mut rig = Rig::new();
    rig.start(2, 3, 280);
    rig.advances(3);
    assert!(rig.stored(2).is_some());

    rig.cmd(AppCommand::Stop(slot(2))).unwrap();
    assert!(rig.stored(2).is_none());

    let team = rig.app.team(slot(2));
    assert_eq!(team.record.status, TeamStatus::NotStarted);
    assert_eq!(team.record.bottle, BottleIndex::FIRST);
    assert_eq!(team.record.pressure, 300);
    assert_eq!(team.record.team_number.get(), 3);

    // A stopped team no longer depletes.
    rig.advances(2);
    assert_eq!(rig.app.team(slot(2)).record.pressure, 300);
}

#[test]
fn editing_running_team_pauses_then_commits() {
    let mut rig = Rig::new();
    rig.start(1, 0, 300);
    rig.cmd(AppCommand::AdjustPressure {
        slot: slot(1),
        delta: -10,
        mode: ClampMode::Clamp,
    })
    .unwrap();
    rig.advances(4);
    assert_eq!(rig.app.team(slot(1)).record.volume, 24_000);

    rig.cmd(AppCommand::CommitPressure(slot(1))).unwrap();
    let stored = rig.stored(1).unwrap();
    assert_eq!(stored.pressure, 290);
    assert_eq!(stored.volume, 290 * 80);
    assert_eq!(stored.start_time, T0);
    assert!(rig.sink.events.contains(&AppEvent::PressureCommitted {
        slot: slot(1),
        pressure: 290,
    }));
}

#[test]
fn start_rejects_disabled_bottle_and_running_slot() {
    let mut rig = Rig::new();
    assert_eq!(
        rig.cmd(AppCommand::Start {
            slot: slot(0),
            bottle: bottle(4),
            pressure: 300,
        }),
        Err(Error::BottleUnavailable(4))
    );
    rig.start(0, 0, 300);
    assert_eq!(
        rig.cmd(AppCommand::SetBottle {
            slot: slot(0),
            bottle: bottle(1),
        }),
        Err(Error::TeamAlreadyStarted(0))
    );
}

#[test]
fn start_clamps_pressure_to_edit_bounds() {
    let mut rig = Rig::new();
    rig.start(0, 0, 900);
    assert_eq!(rig.app.team(slot(0)).record.pressure, 330);
}

#[test]
fn restore_brings_back_running_teams() {
    let mut rig = Rig::new();
    rig.start(0, 1, 300);
    rig.start(2, 2, 200);
    rig.advances(2);
    let before = rig.app.team(slot(0)).record;

    let mut sink = RecordingSink::new();
    let restored = AppService::load(&mut rig.store, rig.now, &mut sink);
    assert_eq!(restored.active_count(), 2);
    assert_eq!(restored.team(slot(0)).record, before);
    assert!(restored.team(slot(0)).end_time.is_some());
    assert!(!restored.team(slot(1)).is_active());
    assert_eq!(sink.events, vec![AppEvent::Restored { active: 2 }]);
}

#[test]
fn corrupt_record_is_discarded_at_boot() {
    let mut store = MockStore::new();
    store.put(NAMESPACE, "team1", &[1, 2, 3]);
    let mut sink = RecordingSink::new();

    let app = AppService::load(&mut store, T0, &mut sink);
    assert!(!app.team(slot(1)).is_active());
    assert!(store.get(NAMESPACE, "team1").is_none());
    assert!(sink.events.contains(&AppEvent::RecordDiscarded {
        slot: slot(1),
        reason: RecordError::BadLength(3),
    }));
}

#[test]
fn metric_record_is_converted_when_device_is_imperial() {
    let mut store = MockStore::new();
    store.put(NAMESPACE, "imperial", &postcard::to_allocvec(&true).unwrap());

    let mut record = TeamRecord::idle(slot(0), bottle(0), UnitSystem::Metric);
    record.status = TeamStatus::FullNoAlarm;
    record.start_time = T0;
    store.put(NAMESPACE, "team0", &record.encode());

    let mut sink = RecordingSink::new();
    let app = AppService::load(&mut store, T0 + 60, &mut sink);
    let team = app.team(slot(0));
    assert_eq!(team.record.unit, UnitSystem::Imperial);
    assert_eq!(team.record.pressure, 4351);
    assert_eq!(team.record.volume, 24_000);

    let persisted = TeamRecord::decode(store.get(NAMESPACE, "team0").unwrap()).unwrap();
    assert_eq!(persisted.unit, UnitSystem::Imperial);
    assert!(sink.events.contains(&AppEvent::UnitsReconciled {
        slot: slot(0),
        unit: UnitSystem::Imperial,
    }));
}
