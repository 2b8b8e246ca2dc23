//! Outbound application events.
//!
//! The [`AppService`](super::service::AppService) emits these through the
//! [`EventSink`](super::ports::EventSink) port.  The display shell turns
//! `AlarmRaised` into a short vibration and a due `Mayday` into the double
//! pulse; the log adapter just prints them.

use crate::config::ConfigUpdate;
use crate::team::{RecordError, TeamSlot, TeamStatus, Timestamp};
use crate::units::UnitSystem;

/// Structured events emitted by the application core.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    /// Persisted teams were restored at boot.
    Restored { active: u8 },

    TeamStarted {
        slot: TeamSlot,
        team_number: u8,
        pressure: u16,
        unit: UnitSystem,
        at: Timestamp,
    },

    TeamStopped(TeamSlot),

    /// A team entered a new band; the alert must be given once.
    AlarmRaised { slot: TeamSlot, status: TeamStatus },

    AlarmConfirmed { slot: TeamSlot, status: TeamStatus },

    /// Repeating double alert for a team below the mayday floor.
    Mayday { slot: TeamSlot, pressure: u16 },

    /// A running team's pressure was corrected by hand.
    PressureCommitted { slot: TeamSlot, pressure: u16 },

    ConfigChanged(ConfigUpdate),

    /// A team record was converted to the active unit system.
    UnitsReconciled { slot: TeamSlot, unit: UnitSystem },

    /// A stored team record could not be decoded and was deleted.
    RecordDiscarded { slot: TeamSlot, reason: RecordError },
}
