//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing every application event as one
//! structured log line.  The simulator uses it as its only output; on the
//! watch it sits next to the vibration adapter.

use log::{info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`AppEvent`].
#[derive(Debug, Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Restored { active } => {
                info!("BOOT  | restored running_teams={active}");
            }
            AppEvent::TeamStarted {
                slot,
                team_number,
                pressure,
                unit,
                at,
            } => {
                info!(
                    "START | slot={} team={} pressure={}{} at={}",
                    slot.get(),
                    team_number,
                    pressure,
                    unit.label(),
                    at
                );
            }
            AppEvent::TeamStopped(slot) => {
                info!("STOP  | slot={}", slot.get());
            }
            AppEvent::AlarmRaised { slot, status } => {
                warn!("ALARM | slot={} status={}", slot.get(), status.name());
            }
            AppEvent::AlarmConfirmed { slot, status } => {
                info!("ACK   | slot={} status={}", slot.get(), status.name());
            }
            AppEvent::Mayday { slot, pressure } => {
                warn!("MAYDAY | slot={} pressure={}", slot.get(), pressure);
            }
            AppEvent::PressureCommitted { slot, pressure } => {
                info!("PRESS | slot={} pressure={}", slot.get(), pressure);
            }
            AppEvent::ConfigChanged(update) => {
                info!("CONFIG | {update:?}");
            }
            AppEvent::UnitsReconciled { slot, unit } => {
                info!("UNITS | slot={} now={}", slot.get(), unit.label());
            }
            AppEvent::RecordDiscarded { slot, reason } => {
                warn!("STORE | slot={} record discarded: {reason}", slot.get());
            }
        }
    }
}
