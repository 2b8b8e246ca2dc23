//! On-device menu flow.
//!
//! Maps abstract button actions to engine commands according to the active
//! screen and the active team slot.  The controller only reads the service;
//! every change goes out as an [`AppCommand`].
//!
//! ```text
//!            Up/Down: slot cursor
//!  ┌────────────┐ Select (not started) ┌────────────┐ Select ┌────────────┐
//!  │  Overview  │─────────────────────▶│ TeamNumber │───────▶│ BottleType │
//!  └────────────┘                      └────────────┘        └────────────┘
//!    │ ▲  │ Select (running)                                       │ Select
//!    │ │  ▼                                                        ▼
//!    │ │ ┌────────────────┐                               ┌─────────────────┐
//!    │ └─│ UpdatePressure │ clamp          wrap           │ InitialPressure │
//!    │   └────────────────┘ ◀── Select commits ──▶        └─────────────────┘
//!    │ SelectLong (any screen)
//!    ▼
//!  ┌────────────┐ Select: stop   Up/Down: back
//!  │ ConfirmStop│
//!  └────────────┘
//! ```
//!
//! On Overview, Select on a team with a pending alarm confirms it.

use heapless::Vec;
use log::debug;

use crate::drivers::button::{Direction, HoldRepeater};
use crate::team::{ClampMode, TeamSlot};

use super::commands::AppCommand;
use super::service::AppService;

/// Pressure step of a double click.
pub const MULTI_CLICK_STEP: i16 = 10;

/// Commands produced by one action.
pub type Commands = Vec<AppCommand, 2>;

/// What the watch is showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Screen {
    #[default]
    Overview,
    TeamNumber,
    BottleType,
    InitialPressure,
    UpdatePressure,
    ConfirmStop,
}

impl Screen {
    pub const fn is_pressure_edit(self) -> bool {
        matches!(self, Self::InitialPressure | Self::UpdatePressure)
    }
}

/// Button surface, after click classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserAction {
    Up,
    Down,
    UpMulti,
    DownMulti,
    Select,
    SelectLong,
    UpHoldStart,
    UpHoldStop,
    DownHoldStart,
    DownHoldStop,
}

#[derive(Debug, Clone, Default)]
pub struct ScreenController {
    screen: Screen,
    active: TeamSlot,
    hold: HoldRepeater,
}

impl ScreenController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn screen(&self) -> Screen {
        self.screen
    }

    pub fn active_slot(&self) -> TeamSlot {
        self.active
    }

    /// Translate one action into commands for `app`.
    pub fn handle(&mut self, action: UserAction, now_ms: u32, app: &AppService) -> Commands {
        let mut out = Commands::new();
        let slot = self.active;

        if action == UserAction::SelectLong {
            self.hold.cancel();
            if app.team(slot).is_editing() {
                push(&mut out, AppCommand::CancelEdit(slot));
            }
            self.go(Screen::ConfirmStop);
            return out;
        }

        match self.screen {
            Screen::Overview => self.on_overview(action, app, &mut out),
            Screen::TeamNumber => {
                let number = app.team(slot).record.team_number;
                match as_direction(action) {
                    Some(Direction::Up) => push(
                        &mut out,
                        AppCommand::SetTeamNumber {
                            slot,
                            number: number.next(),
                        },
                    ),
                    Some(Direction::Down) => push(
                        &mut out,
                        AppCommand::SetTeamNumber {
                            slot,
                            number: number.prev(),
                        },
                    ),
                    None if action == UserAction::Select => self.go(Screen::BottleType),
                    None => {}
                }
            }
            Screen::BottleType => {
                let bottle = app.team(slot).record.bottle;
                let config = app.config();
                match as_direction(action) {
                    Some(Direction::Up) => push(
                        &mut out,
                        AppCommand::SetBottle {
                            slot,
                            bottle: config.next_available(bottle),
                        },
                    ),
                    Some(Direction::Down) => push(
                        &mut out,
                        AppCommand::SetBottle {
                            slot,
                            bottle: config.prev_available(bottle),
                        },
                    ),
                    None if action == UserAction::Select => {
                        // Pressure entry always begins at the bottle default.
                        push(&mut out, AppCommand::SetBottle { slot, bottle });
                        push(&mut out, open_edit(slot, ClampMode::Wrap));
                        self.go(Screen::InitialPressure);
                    }
                    None => {}
                }
            }
            Screen::InitialPressure => self.on_pressure(action, now_ms, ClampMode::Wrap, &mut out),
            Screen::UpdatePressure => self.on_pressure(action, now_ms, ClampMode::Clamp, &mut out),
            Screen::ConfirmStop => match action {
                UserAction::Select => {
                    push(&mut out, AppCommand::Stop(slot));
                    self.go(Screen::Overview);
                }
                UserAction::Up | UserAction::Down | UserAction::UpMulti | UserAction::DownMulti => {
                    self.go(Screen::Overview);
                }
                _ => {}
            },
        }
        out
    }

    /// Poll the hold repeater.  Yields one pressure step while a
    /// directional button is held on a pressure screen.
    pub fn tick(&mut self, now_ms: u32) -> Option<AppCommand> {
        let mode = match self.screen {
            Screen::InitialPressure => ClampMode::Wrap,
            Screen::UpdatePressure => ClampMode::Clamp,
            _ => return None,
        };
        let direction = self.hold.tick(now_ms)?;
        Some(AppCommand::AdjustPressure {
            slot: self.active,
            delta: direction.delta(1),
            mode,
        })
    }

    fn on_overview(&mut self, action: UserAction, app: &AppService, out: &mut Commands) {
        let slot = self.active;
        match action {
            UserAction::Up | UserAction::UpMulti => self.active = slot.prev(),
            UserAction::Down | UserAction::DownMulti => self.active = slot.next(),
            UserAction::Select => {
                let status = app.team(slot).record.status;
                if status.is_unconfirmed_alarm() {
                    push(out, AppCommand::Confirm(slot));
                } else if status.is_active() {
                    push(out, open_edit(slot, ClampMode::Clamp));
                    self.go(Screen::UpdatePressure);
                } else {
                    self.go(Screen::TeamNumber);
                }
            }
            _ => {}
        }
    }

    fn on_pressure(&mut self, action: UserAction, now_ms: u32, mode: ClampMode, out: &mut Commands) {
        let slot = self.active;
        let delta = match action {
            UserAction::Up => 1,
            UserAction::Down => -1,
            UserAction::UpMulti => MULTI_CLICK_STEP,
            UserAction::DownMulti => -MULTI_CLICK_STEP,
            UserAction::UpHoldStart => {
                self.hold.start(Direction::Up, now_ms);
                1
            }
            UserAction::DownHoldStart => {
                self.hold.start(Direction::Down, now_ms);
                -1
            }
            UserAction::UpHoldStop => {
                self.hold.stop(Direction::Up);
                return;
            }
            UserAction::DownHoldStop => {
                self.hold.stop(Direction::Down);
                return;
            }
            UserAction::Select => {
                push(out, AppCommand::CommitPressure(slot));
                self.go(Screen::Overview);
                return;
            }
            UserAction::SelectLong => return,
        };
        push(out, AppCommand::AdjustPressure { slot, delta, mode });
    }

    fn go(&mut self, screen: Screen) {
        if !screen.is_pressure_edit() {
            self.hold.cancel();
        }
        debug!("screen {:?} -> {:?} (team {})", self.screen, screen, self.active.get());
        self.screen = screen;
    }
}

fn as_direction(action: UserAction) -> Option<Direction> {
    match action {
        UserAction::Up | UserAction::UpMulti => Some(Direction::Up),
        UserAction::Down | UserAction::DownMulti => Some(Direction::Down),
        _ => None,
    }
}

fn open_edit(slot: TeamSlot, mode: ClampMode) -> AppCommand {
    AppCommand::AdjustPressure {
        slot,
        delta: 0,
        mode,
    }
}

fn push(out: &mut Commands, cmd: AppCommand) {
    if out.push(cmd).is_err() {
        debug!("screen command buffer full");
    }
}
