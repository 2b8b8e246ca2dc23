//! Application service: the hexagonal core.
//!
//! [`AppService`] owns the live configuration and the three team slots.
//! It turns commands and the 1 Hz tick into engine calls, persists every
//! completed mutation and reports what happened through the event sink.
//!
//! ```text
//!  AppCommand ──▶ ┌──────────────────────────┐ ──▶ EventSink
//!   1 Hz tick ──▶ │        AppService        │
//!                 │  ConfigStore · Team × 3  │ ◀─▶ StoragePort
//!                 └──────────────────────────┘
//! ```

use chrono::FixedOffset;
use log::{info, warn};

use crate::config::{ConfigStore, ConfigUpdate, Configuration, NAMESPACE};
use crate::error::{Error, Result};
use crate::facts::{self, TeamFacts};
use crate::team::engine::{self, ADVANCE_INTERVAL_SECS};
use crate::team::{AlarmOutcome, RECORD_LEN, TEAM_COUNT, Team, TeamRecord, TeamSlot, Timestamp};

use super::commands::AppCommand;
use super::events::AppEvent;
use super::ports::{EventSink, StorageError, StoragePort};

/// One-second ticks between two depletion steps of a team.
pub const TICKS_PER_ADVANCE: u32 = ADVANCE_INTERVAL_SECS;

// ───────────────────────────────────────────────────────────────
// AppService
// ───────────────────────────────────────────────────────────────

/// The application service orchestrates all domain logic.
pub struct AppService {
    config: ConfigStore,
    teams: [Team; TEAM_COUNT],
    /// Ticks since each team last advanced.
    cadence: [u32; TEAM_COUNT],
    tick_count: u64,
}

impl AppService {
    /// Service with fresh not-started teams.  Nothing is read from storage.
    pub fn new(config: ConfigStore) -> Self {
        let teams = core::array::from_fn(|i| {
            let slot = TeamSlot::new(i).unwrap_or(TeamSlot::FIRST);
            Team::idle(slot, config.config())
        });
        Self {
            config,
            teams,
            cadence: [0; TEAM_COUNT],
            tick_count: 0,
        }
    }

    /// Boot: load configuration and every persisted team.
    ///
    /// A missing record means a fresh slot.  A record that fails to decode
    /// is deleted and the slot starts fresh.  Restored records are brought
    /// into the active unit system and get their end time re-projected.
    pub fn load(
        storage: &mut impl StoragePort,
        now: Timestamp,
        sink: &mut impl EventSink,
    ) -> Self {
        let mut service = Self::new(ConfigStore::load(&*storage));
        for slot in TeamSlot::all() {
            if let Some(team) = service.restore_team(slot, storage, now, sink) {
                service.teams[slot.get()] = team;
            }
        }
        let active = service.active_count();
        info!("AppService: restored {active} running team(s)");
        sink.emit(&AppEvent::Restored { active });
        service
    }

    fn restore_team(
        &self,
        slot: TeamSlot,
        storage: &mut impl StoragePort,
        now: Timestamp,
        sink: &mut impl EventSink,
    ) -> Option<Team> {
        let record = match read_record(slot, &*storage) {
            Ok(Some(record)) => record,
            Ok(None) => return None,
            Err(Error::Record(reason)) => {
                warn!("team {}: discarding corrupt record ({reason})", slot.get());
                if let Err(e) = storage.delete(NAMESPACE, &slot.storage_key()) {
                    warn!("team {}: delete failed ({e})", slot.get());
                }
                sink.emit(&AppEvent::RecordDiscarded { slot, reason });
                return None;
            }
            Err(e) => {
                warn!("team {}: record unreadable ({e}), starting fresh", slot.get());
                return None;
            }
        };

        let config = self.config.config();
        let mut team = Team::from_record(slot, record);
        if !team.is_active() {
            engine::refresh_idle(&mut team, config);
            return Some(team);
        }
        if engine::reconcile_units(&mut team, config) {
            persist(&team, storage);
            sink.emit(&AppEvent::UnitsReconciled {
                slot,
                unit: config.units,
            });
        }
        engine::update_end_time(&mut team, now, config);
        Some(team)
    }

    // ── Per-tick orchestration ────────────────────────────────

    /// One-second tick.  Every running team whose pressure is not being
    /// edited advances once per [`TICKS_PER_ADVANCE`] ticks.
    ///
    /// Alert flags raised before this tick are settled first, so the facts
    /// read after a tick only report alerts raised by it.
    pub fn tick(
        &mut self,
        now: Timestamp,
        storage: &mut impl StoragePort,
        sink: &mut impl EventSink,
    ) {
        self.tick_count += 1;
        for slot in TeamSlot::all() {
            let i = slot.get();
            let team = &mut self.teams[i];
            team.last_alarm.settle();
            if !team.is_active() || team.is_editing() {
                continue;
            }
            self.cadence[i] += 1;
            if self.cadence[i] < TICKS_PER_ADVANCE {
                continue;
            }
            self.cadence[i] = 0;
            let outcome = engine::advance(team, now, self.config.config());
            persist(team, storage);
            emit_outcome(team, outcome, sink);
        }
    }

    // ── Command handling ──────────────────────────────────────

    /// Process one command.  Preconditions are checked here; the engine
    /// below never fails.
    pub fn handle_command(
        &mut self,
        cmd: AppCommand,
        now: Timestamp,
        storage: &mut impl StoragePort,
        sink: &mut impl EventSink,
    ) -> Result<()> {
        match cmd {
            AppCommand::Start {
                slot,
                bottle,
                pressure,
            } => {
                self.require_idle(slot)?;
                let config = self.config.config();
                if !config.is_available(bottle) {
                    return Err(Error::BottleUnavailable(bottle.get()));
                }
                let (min, max) = engine::pressure_bounds(bottle, config.units);
                let team = &mut self.teams[slot.get()];
                engine::start(team, bottle, pressure.clamp(min, max), now, config);
                team.edit = None;
                self.cadence[slot.get()] = 0;
                persist(team, storage);
                sink.emit(&started_event(team));
            }
            AppCommand::Confirm(slot) => {
                self.require_active(slot)?;
                let team = &mut self.teams[slot.get()];
                if let Some(status) = engine::confirm(team) {
                    persist(team, storage);
                    sink.emit(&AppEvent::AlarmConfirmed { slot, status });
                }
            }
            AppCommand::AdjustPressure { slot, delta, mode } => {
                engine::step_edit(&mut self.teams[slot.get()], delta, mode);
            }
            AppCommand::CommitPressure(slot) => {
                let config = self.config.config();
                let team = &mut self.teams[slot.get()];
                let was_active = team.is_active();
                // The bottle may have been disabled while this team was
                // being configured.
                if !was_active && !config.is_available(team.record.bottle) {
                    let bottle = team.record.bottle;
                    engine::cancel_edit(team);
                    engine::refresh_idle(team, config);
                    return Err(Error::BottleUnavailable(bottle.get()));
                }
                let outcome = engine::commit_pressure_edit(team, now, config);
                persist(team, storage);
                if was_active {
                    sink.emit(&AppEvent::PressureCommitted {
                        slot,
                        pressure: team.record.pressure,
                    });
                } else {
                    self.cadence[slot.get()] = 0;
                    sink.emit(&started_event(team));
                }
                emit_outcome(team, outcome, sink);
            }
            AppCommand::CancelEdit(slot) => {
                engine::cancel_edit(&mut self.teams[slot.get()]);
            }
            AppCommand::Stop(slot) => {
                let team = &mut self.teams[slot.get()];
                engine::stop(team, self.config.config());
                self.cadence[slot.get()] = 0;
                persist(team, storage);
                sink.emit(&AppEvent::TeamStopped(slot));
            }
            AppCommand::SetTeamNumber { slot, number } => {
                self.require_idle(slot)?;
                engine::set_team_number(&mut self.teams[slot.get()], number);
            }
            AppCommand::SetBottle { slot, bottle } => {
                self.require_idle(slot)?;
                let config = self.config.config();
                if !config.is_available(bottle) {
                    return Err(Error::BottleUnavailable(bottle.get()));
                }
                engine::set_bottle(&mut self.teams[slot.get()], bottle, config);
            }
            AppCommand::Configure(update) => self.apply_config(update, storage, sink)?,
        }
        Ok(())
    }

    /// Merge one configuration field, then bring every team in line with
    /// the result: running teams are converted when units changed, idle
    /// teams pick up the new defaults.
    pub fn apply_config(
        &mut self,
        update: ConfigUpdate,
        storage: &mut impl StoragePort,
        sink: &mut impl EventSink,
    ) -> Result<()> {
        let outcome = self.config.apply(update, &mut *storage)?;
        if !outcome.changed {
            return Ok(());
        }
        sink.emit(&AppEvent::ConfigChanged(update));
        if let Some(bottle) = outcome.default_moved {
            info!(
                "AppService: default bottle moved to {}",
                bottle.profile().name
            );
        }

        let config = self.config.config();
        for team in &mut self.teams {
            if outcome.units_changed && engine::reconcile_units(team, config) && team.is_active() {
                persist(team, storage);
                sink.emit(&AppEvent::UnitsReconciled {
                    slot: team.slot,
                    unit: config.units,
                });
            }
            engine::refresh_idle(team, config);
        }
        Ok(())
    }

    /// Decode and apply a configuration message.
    ///
    /// Individual fields that fail validation are logged and skipped.
    /// Returns the number of fields applied.
    pub fn apply_config_message(
        &mut self,
        json: &str,
        storage: &mut impl StoragePort,
        sink: &mut impl EventSink,
    ) -> Result<usize> {
        let updates = ConfigUpdate::decode_message(json)?;
        let mut applied = 0;
        for update in updates {
            match self.apply_config(update, storage, sink) {
                Ok(()) => applied += 1,
                Err(e) => warn!("config message: {update:?} rejected ({e})"),
            }
        }
        Ok(applied)
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn config(&self) -> &Configuration {
        self.config.config()
    }

    pub fn team(&self, slot: TeamSlot) -> &Team {
        &self.teams[slot.get()]
    }

    pub fn teams(&self) -> &[Team; TEAM_COUNT] {
        &self.teams
    }

    /// Display facts of one slot as of `now`.
    pub fn facts(&self, slot: TeamSlot, now: Timestamp, offset: FixedOffset) -> TeamFacts {
        facts::team_facts(&self.teams[slot.get()], now, offset)
    }

    /// Number of slots currently monitored.
    pub fn active_count(&self) -> u8 {
        self.teams.iter().filter(|t| t.is_active()).count() as u8
    }

    /// Total ticks executed since startup.
    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    // ── Internal ──────────────────────────────────────────────

    fn require_idle(&self, slot: TeamSlot) -> Result<()> {
        if self.teams[slot.get()].is_active() {
            Err(Error::TeamAlreadyStarted(slot.get()))
        } else {
            Ok(())
        }
    }

    fn require_active(&self, slot: TeamSlot) -> Result<()> {
        if self.teams[slot.get()].is_active() {
            Ok(())
        } else {
            Err(Error::TeamNotStarted(slot.get()))
        }
    }
}

/// Stored record of `slot`, or `None` when the slot was never persisted.
fn read_record(slot: TeamSlot, storage: &impl StoragePort) -> Result<Option<TeamRecord>> {
    let mut buf = [0u8; RECORD_LEN * 2];
    let len = match storage.read(NAMESPACE, &slot.storage_key(), &mut buf) {
        Ok(len) => len,
        Err(StorageError::NotFound) => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    Ok(Some(TeamRecord::decode(&buf[..len])?))
}

/// Write a running team's record, or delete the key of an idle one.
/// Failures are logged; the in-memory state stays authoritative.
fn persist(team: &Team, storage: &mut impl StoragePort) {
    let key = team.slot.storage_key();
    let result = if team.is_active() {
        storage.write(NAMESPACE, &key, &team.record.encode())
    } else {
        storage.delete(NAMESPACE, &key)
    };
    if let Err(e) = result {
        warn!("team {}: persist failed ({e})", team.slot.get());
    }
}

fn emit_outcome(team: &Team, outcome: AlarmOutcome, sink: &mut impl EventSink) {
    if let Some(status) = outcome.fired {
        sink.emit(&AppEvent::AlarmRaised {
            slot: team.slot,
            status,
        });
    }
    if outcome.mayday_alert {
        sink.emit(&AppEvent::Mayday {
            slot: team.slot,
            pressure: team.record.pressure,
        });
    }
}

fn started_event(team: &Team) -> AppEvent {
    AppEvent::TeamStarted {
        slot: team.slot,
        team_number: team.record.team_number.get(),
        pressure: team.record.pressure,
        unit: team.record.unit,
        at: team.record.start_time,
    }
}
