//! Team air-monitoring engine.
//!
//! Every operation takes the team it mutates and the configuration it reads
//! explicitly.  Nothing here touches storage or the clock; callers persist
//! the record afterwards and pass `now` in.
//!
//! All arithmetic saturates.  Preconditions (e.g. "not yet started") are
//! checked by the caller; a violated precondition here is a logged no-op.

use log::{debug, info, warn};

use crate::catalog::{self, BottleIndex};
use crate::config::Configuration;
use crate::units;

use super::alarm::{self, AlarmOutcome};
use super::record::{TeamNumber, TeamRecord, Timestamp};
use super::status::TeamStatus;
use super::Team;

/// Seconds between two depletion steps.
pub const ADVANCE_INTERVAL_SECS: u32 = 30;

/// Behaviour of [`adjust_pressure`] at the edit bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClampMode {
    /// Stepping past a bound jumps to the other one.  Used while
    /// configuring a team that has not started.
    Wrap,
    /// Stop at the bound.  Used when correcting a running team.
    Clamp,
}

/// `[min_reserve, 110 % of default]` for `bottle` in `unit`.
pub fn pressure_bounds(bottle: BottleIndex, unit: units::UnitSystem) -> (u16, u16) {
    (
        catalog::min_reserve(unit),
        catalog::profile(bottle).max_pressure(unit),
    )
}

/// Step `value` by `delta` within `[min, max]`.
///
/// In [`ClampMode::Wrap`] any step past `max` lands on `min` and any step
/// below `min` lands on `max`.
pub fn adjust_pressure(value: u16, delta: i16, mode: ClampMode, (min, max): (u16, u16)) -> u16 {
    let target = i32::from(value) + i32::from(delta);
    match mode {
        ClampMode::Wrap if target > i32::from(max) => min,
        ClampMode::Wrap if target < i32::from(min) => max,
        _ => value.saturating_add_signed(delta).clamp(min, max),
    }
}

/// Begin monitoring with `bottle` at `pressure` (in the configured unit).
pub fn start(
    team: &mut Team,
    bottle: BottleIndex,
    pressure: u16,
    now: Timestamp,
    config: &Configuration,
) {
    if team.is_active() {
        warn!("team {}: start ignored, already running", team.slot.get());
        return;
    }
    let record = &mut team.record;
    record.bottle = bottle;
    record.unit = config.units;
    record.pressure = pressure;
    record.volume = units::volume_from_pressure(pressure, config.units, bottle.profile());
    record.start_time = now;
    record.status = TeamStatus::FullNoAlarm;
    team.mayday.reset();
    update_end_time(team, now, config);
    info!(
        "team {}: started nr={} bottle={} pressure={}{}",
        team.slot.get(),
        team.record.team_number.get(),
        bottle.profile().name,
        pressure,
        config.units.label()
    );
}

/// One depletion step: consume half a minute of air, re-derive pressure,
/// re-project the end time and evaluate alarms.
pub fn advance(team: &mut Team, now: Timestamp, config: &Configuration) -> AlarmOutcome {
    if !team.is_active() {
        return team.last_alarm;
    }
    let record = &mut team.record;
    let profile = record.bottle.profile();
    record.volume = record.volume.saturating_sub(config.breathing_rate / 2);
    record.pressure = units::pressure_from_volume(record.volume, record.unit, profile);
    debug!(
        "team {}: volume={}dl pressure={}{}",
        team.slot.get(),
        record.volume,
        record.pressure,
        record.unit.label()
    );
    update_end_time(team, now, config);
    evaluate(team)
}

/// Re-project the time the reserve will be reached.
///
/// Only recomputed while pressure is at or above the minimum reserve;
/// below it the last projection is kept.
pub fn update_end_time(team: &mut Team, now: Timestamp, config: &Configuration) {
    let record = &team.record;
    if record.pressure < catalog::min_reserve(record.unit) {
        return;
    }
    let usable = record
        .volume
        .saturating_sub(record.bottle.profile().safety_volume());
    let minutes = usable / config.breathing_rate.max(1);
    team.end_time = Some(now.saturating_add(60 * i64::from(minutes)));
}

/// Acknowledge the pending alarm.  Returns the new status, or `None` when
/// no alarm was pending.
pub fn confirm(team: &mut Team) -> Option<TeamStatus> {
    let next = team.record.status.confirmed()?;
    team.record.status = next;
    team.last_alarm.settle();
    info!("team {}: alarm confirmed -> {}", team.slot.get(), next.name());
    Some(next)
}

/// Step the team's pressure edit buffer, opening it from the record's
/// pressure if needed.  A zero `delta` only opens the buffer.  Returns the
/// new buffer value.
pub fn step_edit(team: &mut Team, delta: i16, mode: ClampMode) -> u16 {
    let bounds = pressure_bounds(team.record.bottle, team.record.unit);
    let current = team.edit.unwrap_or(team.record.pressure);
    let next = if delta == 0 {
        current
    } else {
        adjust_pressure(current, delta, mode, bounds)
    };
    team.edit = Some(next);
    next
}

/// Drop an open edit without applying it.
pub fn cancel_edit(team: &mut Team) {
    team.edit = None;
}

/// Write the edited pressure into the record.
///
/// Starts a not-started team, otherwise re-derives volume and end time and
/// re-evaluates alarms.  Without an open edit the current pressure is
/// committed as-is.
pub fn commit_pressure_edit(
    team: &mut Team,
    now: Timestamp,
    config: &Configuration,
) -> AlarmOutcome {
    let pressure = team.edit.take().unwrap_or(team.record.pressure);
    let pressure = units::convert(pressure, team.record.unit, config.units);

    if !team.is_active() {
        let bottle = team.record.bottle;
        start(team, bottle, pressure, now, config);
    } else {
        let record = &mut team.record;
        record.unit = config.units;
        record.pressure = pressure;
        record.volume =
            units::volume_from_pressure(pressure, record.unit, record.bottle.profile());
        update_end_time(team, now, config);
        info!(
            "team {}: pressure corrected to {}{}",
            team.slot.get(),
            pressure,
            config.units.label()
        );
    }
    evaluate(team)
}

/// Reset the slot to a fresh not-started team with the configured
/// defaults.
pub fn stop(team: &mut Team, config: &Configuration) {
    if team.is_active() {
        info!("team {}: stopped", team.slot.get());
    }
    *team = Team::idle(team.slot, config);
}

/// Change the team number of a team being configured.
pub fn set_team_number(team: &mut Team, number: TeamNumber) {
    team.record.team_number = number;
}

/// Change the bottle of a team being configured.  Pressure is reset to the
/// new bottle's default.
pub fn set_bottle(team: &mut Team, bottle: BottleIndex, config: &Configuration) {
    if team.is_active() {
        warn!("team {}: bottle change ignored, team running", team.slot.get());
        return;
    }
    let number = team.record.team_number;
    team.record = TeamRecord::idle(team.slot, bottle, config.units);
    team.record.team_number = number;
    team.edit = None;
    team.last_alarm.band = alarm::band_of(&team.record);
}

/// Re-apply configuration defaults to a not-started team that is not
/// being configured.  Returns `true` when anything changed.
pub fn refresh_idle(team: &mut Team, config: &Configuration) -> bool {
    if team.is_active() || team.is_editing() {
        return false;
    }
    let mut fresh = TeamRecord::idle(team.slot, config.default_bottle, config.units);
    fresh.team_number = team.record.team_number;
    if fresh == team.record {
        return false;
    }
    team.record = fresh;
    team.last_alarm.band = alarm::band_of(&team.record);
    true
}

/// Bring the record and any open edit into `config.units`.
///
/// Returns `true` when the record was converted and must be persisted.
pub fn reconcile_units(team: &mut Team, config: &Configuration) -> bool {
    let from = team.record.unit;
    if let Some(edit) = team.edit.as_mut() {
        *edit = units::convert(*edit, from, config.units);
    }
    units::reconcile(&mut team.record, config.units)
}

fn evaluate(team: &mut Team) -> AlarmOutcome {
    let outcome = alarm::evaluate_alarm(&mut team.record, &mut team.mayday);
    if let Some(status) = outcome.fired {
        info!("team {}: alarm {}", team.slot.get(), status.name());
    }
    if outcome.mayday_alert {
        warn!("team {}: MAYDAY", team.slot.get());
    }
    team.last_alarm = outcome;
    outcome
}
