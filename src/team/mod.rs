//! Monitored teams.
//!
//! [`TeamRecord`] is the durable part of a team; [`Team`] wraps it with the
//! runtime state that is never persisted (projected end time, mayday
//! cadence, open pressure edit, last alarm outcome).  The free functions in
//! [`engine`] are the only way a `Team` changes.

pub mod alarm;
pub mod engine;
pub mod record;
pub mod status;

pub use alarm::{AlarmOutcome, FillBand, MaydayCadence};
pub use engine::ClampMode;
pub use record::{
    RECORD_LEN, RecordError, StorageKey, TEAM_COUNT, TEAM_NUMBER_MAX, TeamNumber, TeamRecord, TeamSlot,
    Timestamp,
};
pub use status::TeamStatus;

use crate::config::Configuration;

/// One team slot with its runtime state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Team {
    pub slot: TeamSlot,
    pub record: TeamRecord,
    /// Epoch seconds at which the reserve is reached.  Frozen at its last
    /// value once pressure drops below the minimum reserve.
    pub end_time: Option<Timestamp>,
    pub mayday: MaydayCadence,
    /// Pressure being edited, in the record's unit.  Depletion of this
    /// team is paused while it is open.
    pub edit: Option<u16>,
    /// Outcome of the most recent alarm evaluation.
    pub last_alarm: AlarmOutcome,
}

impl Team {
    /// A not-started team carrying the configured default bottle.
    pub fn idle(slot: TeamSlot, config: &Configuration) -> Self {
        Self::from_record(
            slot,
            TeamRecord::idle(slot, config.default_bottle, config.units),
        )
    }

    pub fn from_record(slot: TeamSlot, record: TeamRecord) -> Self {
        Self {
            slot,
            record,
            end_time: None,
            mayday: MaydayCadence::default(),
            edit: None,
            last_alarm: AlarmOutcome {
                band: alarm::band_of(&record),
                ..AlarmOutcome::default()
            },
        }
    }

    pub fn is_active(&self) -> bool {
        self.record.status.is_active()
    }

    pub fn is_editing(&self) -> bool {
        self.edit.is_some()
    }

    /// Pressure to show: the edit buffer while open, else the record.
    pub fn shown_pressure(&self) -> u16 {
        self.edit.unwrap_or(self.record.pressure)
    }
}
