//! Alarm band classification and the mayday repeat cadence.
//!
//! ```text
//!  default ─┬─────────────── Full        (no alarm)
//!           │  - third
//!           ├─────────────── ThirdFull   → ThirdFullAlarm
//!           │  - 2*third
//!           ├─────────────── HalfFull    → HalfFullAlarm
//!           │  - 3*third
//!           ├─────────────── ThirdEmpty  → ThirdEmptyAlarm
//!      min ─┼─────────────── Empty       → EmptyAlarm
//!  min*4/5 ─┼─────────────── Mayday      → repeating double alert only
//!        0 ─┘
//!
//!  third = (default - min) / 4
//! ```
//!
//! Mayday sits beside the status chain: it never moves `status`, it only
//! drives the double alert.
//!
//! All thresholds are in the unit the record's pressure is expressed in.

use crate::catalog;

use super::record::TeamRecord;
use super::status::TeamStatus;

/// Evaluations between two mayday alerts.
pub const MAYDAY_REPEAT: u8 = 20;

/// Fill level of a bottle relative to its nominal pressure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum FillBand {
    #[default]
    Full,
    ThirdFull,
    HalfFull,
    ThirdEmpty,
    Empty,
    Mayday,
}

impl FillBand {
    /// The un-confirmed status a team is raised to on entering this band.
    pub const fn alarm_status(self) -> Option<TeamStatus> {
        match self {
            Self::Full | Self::Mayday => None,
            Self::ThirdFull => Some(TeamStatus::ThirdFullAlarm),
            Self::HalfFull => Some(TeamStatus::HalfFullAlarm),
            Self::ThirdEmpty => Some(TeamStatus::ThirdEmptyAlarm),
            Self::Empty => Some(TeamStatus::EmptyAlarm),
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::Full => "full",
            Self::ThirdFull => "third-full",
            Self::HalfFull => "half-full",
            Self::ThirdEmpty => "third-empty",
            Self::Empty => "empty",
            Self::Mayday => "mayday",
        }
    }
}

/// Pure band lookup.
pub fn classify(pressure: u16, default_pressure: u16, min_pressure: u16) -> FillBand {
    let third = default_pressure.saturating_sub(min_pressure) / 4;
    let mayday_floor = (u32::from(min_pressure) * 4 / 5) as u16;

    if pressure >= default_pressure.saturating_sub(third) {
        FillBand::Full
    } else if pressure >= default_pressure.saturating_sub(third.saturating_mul(2)) {
        FillBand::ThirdFull
    } else if pressure >= default_pressure.saturating_sub(third.saturating_mul(3)) {
        FillBand::HalfFull
    } else if pressure >= min_pressure {
        FillBand::ThirdEmpty
    } else if pressure >= mayday_floor {
        FillBand::Empty
    } else {
        FillBand::Mayday
    }
}

/// Band of a record, using its own bottle and unit.
pub fn band_of(record: &TeamRecord) -> FillBand {
    let profile = catalog::profile(record.bottle);
    classify(
        record.pressure,
        profile.default_pressure(record.unit),
        catalog::min_reserve(record.unit),
    )
}

// ---------------------------------------------------------------------------
// Mayday cadence
// ---------------------------------------------------------------------------

/// Counts evaluations spent in the mayday band.
///
/// Starts one short of [`MAYDAY_REPEAT`] so the first mayday evaluation
/// alerts immediately.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MaydayCadence {
    counter: u8,
}

impl Default for MaydayCadence {
    fn default() -> Self {
        Self {
            counter: MAYDAY_REPEAT - 1,
        }
    }
}

impl MaydayCadence {
    /// Count one evaluation; `true` when the double alert is due.
    pub fn step(&mut self) -> bool {
        self.counter = self.counter.saturating_add(1);
        if self.counter >= MAYDAY_REPEAT {
            self.counter = 0;
            true
        } else {
            false
        }
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

// ---------------------------------------------------------------------------
// Evaluation
// ---------------------------------------------------------------------------

/// Result of one alarm evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AlarmOutcome {
    pub band: FillBand,
    /// Set when this evaluation raised a new un-confirmed alarm.
    pub fired: Option<TeamStatus>,
    /// Pressure is below the mayday floor.
    pub mayday: bool,
    /// The repeating mayday double alert is due on this evaluation.
    pub mayday_alert: bool,
}

impl AlarmOutcome {
    pub const fn alarm_fired(&self) -> bool {
        self.fired.is_some()
    }

    /// Drop the one-shot alert flags once they have been shown.
    pub fn settle(&mut self) {
        self.fired = None;
        self.mayday_alert = false;
    }
}

/// Evaluate a running record against its bands.
///
/// Raises `status` to the band's un-confirmed alarm only when the status is
/// still below it, so an alarm fires once per band and a manual pressure
/// increase never moves status backwards.  Not-started records only get
/// their band reported.
pub fn evaluate_alarm(record: &mut TeamRecord, cadence: &mut MaydayCadence) -> AlarmOutcome {
    let band = band_of(record);
    let mut outcome = AlarmOutcome {
        band,
        ..AlarmOutcome::default()
    };
    if !record.status.is_active() {
        return outcome;
    }

    if let Some(alarm) = band.alarm_status() {
        if record.status < alarm {
            record.status = alarm;
            outcome.fired = Some(alarm);
        }
    }

    if band == FillBand::Mayday {
        outcome.mayday = true;
        outcome.mayday_alert = cadence.step();
    } else {
        cadence.reset();
    }
    outcome
}
