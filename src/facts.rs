//! Display facts.
//!
//! Everything the watch face shows for one team, pre-formatted into
//! fixed-capacity strings.  Times are rendered in a caller-supplied UTC
//! offset since the tracker stores epoch seconds only.

use core::fmt::Write as _;

use chrono::{DateTime, FixedOffset};
use heapless::String;

use crate::team::{FillBand, Team, TeamSlot, TeamStatus, Timestamp, alarm};

/// Shown in place of a time that does not exist yet.
pub const NO_TIME: &str = "--:--";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TeamFacts {
    pub slot: TeamSlot,
    pub status: TeamStatus,
    /// Current pressure, or the edit buffer while one is open.
    pub pressure: String<6>,
    pub unit: &'static str,
    pub team_number: String<3>,
    /// `HH:MM`.
    pub start_time: String<5>,
    /// Whole minutes since start.
    pub elapsed_minutes: String<6>,
    /// `HH:MM`, frozen once pressure is below the reserve.
    pub end_time: String<5>,
    /// Icon selection.
    pub band: FillBand,
    /// An alarm is waiting for confirmation.
    pub alarm_pending: bool,
    /// The most recent evaluation raised a new alarm (short vibration).
    pub alarm_just_fired: bool,
    pub mayday: bool,
    /// The most recent evaluation asked for the mayday double pulse.
    pub mayday_alert: bool,
    pub editing: bool,
}

/// Build the facts for `team` as of `now`.
pub fn team_facts(team: &Team, now: Timestamp, offset: FixedOffset) -> TeamFacts {
    let record = &team.record;
    let active = team.is_active();

    let mut pressure = String::new();
    let _ = write!(pressure, "{}", team.shown_pressure());
    let mut team_number = String::new();
    let _ = write!(team_number, "{}", record.team_number.get());

    let (start_time, elapsed_minutes) = if active {
        let minutes = now.saturating_sub(record.start_time).max(0) / 60;
        let mut elapsed = String::new();
        let _ = write!(elapsed, "{}", minutes.min(99_999));
        (clock_text(record.start_time, offset), elapsed)
    } else {
        (text(NO_TIME), text("0"))
    };

    let end_time = match team.end_time {
        Some(at) if active => clock_text(at, offset),
        _ => text(NO_TIME),
    };

    let band = alarm::band_of(record);
    TeamFacts {
        slot: team.slot,
        status: record.status,
        pressure,
        unit: record.unit.label(),
        team_number,
        start_time,
        elapsed_minutes,
        end_time,
        band,
        alarm_pending: record.status.is_unconfirmed_alarm(),
        alarm_just_fired: active && team.last_alarm.alarm_fired(),
        mayday: active && band == FillBand::Mayday,
        mayday_alert: active && team.last_alarm.mayday_alert,
        editing: team.is_editing(),
    }
}

/// `HH:MM` of `at` in `offset`.
pub fn clock_text(at: Timestamp, offset: FixedOffset) -> String<5> {
    let Some(utc) = DateTime::from_timestamp(at, 0) else {
        return text(NO_TIME);
    };
    let mut out = String::new();
    if write!(out, "{}", utc.with_timezone(&offset).format("%H:%M")).is_err() {
        return text(NO_TIME);
    }
    out
}

fn text<const N: usize>(s: &str) -> String<N> {
    let mut out = String::new();
    let _ = out.push_str(s);
    out
}
