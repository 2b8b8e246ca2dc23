//! Inbound commands to the application service.
//!
//! These are the engine-level requests the display shell, the screen
//! controller or the configuration channel hand to
//! [`AppService`](super::service::AppService).  Raw indices are validated
//! into [`TeamSlot`] / [`BottleIndex`] / [`TeamNumber`] before a command is
//! built.

use crate::catalog::BottleIndex;
use crate::config::ConfigUpdate;
use crate::team::{ClampMode, TeamNumber, TeamSlot};

/// Commands that adapters can send into the application core.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppCommand {
    /// Start monitoring a not-started team at `pressure` (configured unit).
    Start {
        slot: TeamSlot,
        bottle: BottleIndex,
        pressure: u16,
    },

    /// Acknowledge the team's pending alarm.
    Confirm(TeamSlot),

    /// Step the team's pressure edit buffer.
    AdjustPressure {
        slot: TeamSlot,
        delta: i16,
        mode: ClampMode,
    },

    /// Apply the edit buffer (starting the team if needed).
    CommitPressure(TeamSlot),

    /// Discard the edit buffer.
    CancelEdit(TeamSlot),

    /// Stop monitoring and reset the slot to defaults.
    Stop(TeamSlot),

    /// Change the team number of a team being configured.
    SetTeamNumber { slot: TeamSlot, number: TeamNumber },

    /// Change the bottle of a team being configured.
    SetBottle { slot: TeamSlot, bottle: BottleIndex },

    /// Merge one configuration field.
    Configure(ConfigUpdate),
}
