//! Button actions driving the menu flow end to end: the controller turns
//! actions into commands, the service applies them.

use scbatrack::app::commands::AppCommand;
use scbatrack::app::events::AppEvent;
use scbatrack::app::screens::{Screen, ScreenController, UserAction};
use scbatrack::app::service::{AppService, TICKS_PER_ADVANCE};
use scbatrack::catalog::BottleIndex;
use scbatrack::config::ConfigStore;
use scbatrack::team::{TeamSlot, TeamStatus, Timestamp};

use super::mock_store::{MockStore, RecordingSink};

const T0: Timestamp = 1_704_096_000;

struct Watch {
    app: AppService,
    ui: ScreenController,
    store: MockStore,
    sink: RecordingSink,
    now: Timestamp,
    ms: u32,
}

impl Watch {
    fn new() -> Self {
        Self {
            app: AppService::new(ConfigStore::default()),
            ui: ScreenController::new(),
            store: MockStore::new(),
            sink: RecordingSink::new(),
            now: T0,
            ms: 0,
        }
    }

    fn press(&mut self, action: UserAction) {
        let commands = self.ui.handle(action, self.ms, &self.app);
        for cmd in commands {
            self.apply(cmd);
        }
    }

    fn press_all(&mut self, actions: &[UserAction]) {
        for action in actions {
            self.press(*action);
        }
    }

    fn apply(&mut self, cmd: AppCommand) {
        self.app
            .handle_command(cmd, self.now, &mut self.store, &mut self.sink)
            .unwrap();
    }

    /// Hold a direction for `ms`, polling the repeater every 10 ms.
    fn hold(&mut self, start: UserAction, stop: UserAction, ms: u32) {
        self.press(start);
        let until = self.ms + ms;
        while self.ms < until {
            self.ms += 10;
            if let Some(cmd) = self.ui.tick(self.ms) {
                self.apply(cmd);
            }
        }
        self.press(stop);
    }

    fn seconds(&mut self, secs: u32) {
        for _ in 0..secs {
            self.now += 1;
            self.app.tick(self.now, &mut self.store, &mut self.sink);
        }
    }

    fn team(&self, raw: usize) -> &scbatrack::team::Team {
        self.app.team(TeamSlot::new(raw).unwrap())
    }
}

#[test]
fn configure_and_start_second_slot() {
    use UserAction::*;
    let mut w = Watch::new();

    // cursor to slot 1, team number 3, bottle 6,8l, 290 bar
    w.press_all(&[Down, Select, Up, Select, Up, Select, DownMulti]);
    assert_eq!(w.ui.screen(), Screen::InitialPressure);
    assert_eq!(w.team(1).edit, Some(290));
    assert!(!w.team(1).is_active());

    w.press(Select);
    assert_eq!(w.ui.screen(), Screen::Overview);
    let record = w.team(1).record;
    assert_eq!(record.team_number.get(), 3);
    assert_eq!(record.bottle, BottleIndex::new(1).unwrap());
    assert_eq!(record.pressure, 290);
    assert_eq!(record.volume, 290 * 60);
    assert_eq!(record.start_time, T0);
    assert!(w.store.writes_to("team1") >= 1);
    assert!(matches!(
        w.sink.events.last(),
        Some(AppEvent::TeamStarted { team_number: 3, pressure: 290, .. })
    ));
}

#[test]
fn initial_pressure_wraps_at_the_bounds() {
    use UserAction::*;
    let mut w = Watch::new();
    w.press_all(&[Select, Select, Select]);
    assert_eq!(w.team(0).edit, Some(300));

    w.press_all(&[UpMulti, UpMulti, UpMulti]);
    assert_eq!(w.team(0).edit, Some(330));
    w.press(Up);
    assert_eq!(w.team(0).edit, Some(50));
    w.press(Down);
    assert_eq!(w.team(0).edit, Some(330));
}

#[test]
fn backing_out_of_configuration_discards_edit() {
    use UserAction::*;
    let mut w = Watch::new();
    w.press_all(&[Select, Select, Select, DownMulti]);
    assert!(w.team(0).is_editing());

    w.press(SelectLong);
    assert_eq!(w.ui.screen(), Screen::ConfirmStop);
    assert!(!w.team(0).is_editing());
    w.press(Up);
    assert_eq!(w.ui.screen(), Screen::Overview);
    assert!(!w.team(0).is_active());
    assert!(w.store.writes.is_empty());
}

#[test]
fn held_button_steps_running_pressure_with_clamping() {
    use UserAction::*;
    let mut w = Watch::new();
    w.press_all(&[Select, Select, Select, Select]);
    assert_eq!(w.team(0).record.status, TeamStatus::FullNoAlarm);

    w.press(Select);
    assert_eq!(w.ui.screen(), Screen::UpdatePressure);
    // One step on press plus one per 50 ms.
    w.hold(DownHoldStart, DownHoldStop, 500);
    assert_eq!(w.team(0).edit, Some(289));

    // Releasing stops the repetition.
    w.ms += 500;
    assert_eq!(w.ui.tick(w.ms), None);

    w.press(Select);
    assert_eq!(w.team(0).record.pressure, 289);
    assert!(!w.team(0).is_editing());

    // Clamp mode never wraps past the top.
    w.press(Select);
    w.press_all(&[UpMulti, UpMulti, UpMulti, UpMulti, UpMulti]);
    assert_eq!(w.team(0).edit, Some(330));
    w.press(Up);
    assert_eq!(w.team(0).edit, Some(330));
}

#[test]
fn overview_select_confirms_pending_alarm() {
    use UserAction::*;
    let mut w = Watch::new();
    // 6,8l at 240 bar: first depletion step crosses into a third used.
    w.press_all(&[Select, Select, Up, Select]);
    w.press_all(&[DownMulti, DownMulti, DownMulti, DownMulti, DownMulti, DownMulti, Select]);
    assert_eq!(w.team(0).record.pressure, 240);

    w.seconds(TICKS_PER_ADVANCE);
    assert_eq!(w.team(0).record.status, TeamStatus::ThirdFullAlarm);

    w.press(Select);
    assert_eq!(w.ui.screen(), Screen::Overview);
    assert_eq!(w.team(0).record.status, TeamStatus::ThirdFullConfirmed);

    // With nothing pending the same button opens the pressure update.
    w.press(Select);
    assert_eq!(w.ui.screen(), Screen::UpdatePressure);
}

#[test]
fn long_select_then_select_stops_running_team() {
    use UserAction::*;
    let mut w = Watch::new();
    w.press_all(&[Up, Select, Select, Select, Select]);
    assert!(w.team(2).is_active());
    w.seconds(90);

    w.press_all(&[SelectLong, Select]);
    assert_eq!(w.ui.screen(), Screen::Overview);
    assert!(!w.team(2).is_active());
    assert_eq!(w.team(2).record.team_number.get(), 3);
    assert_eq!(w.store.deletes.len(), 1);
    assert!(w.store.get("scba", "team2").is_none());
    assert!(
        w.sink
            .events
            .contains(&AppEvent::TeamStopped(TeamSlot::new(2).unwrap()))
    );
}
