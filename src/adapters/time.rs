//! Clock adapters.
//!
//! - [`SystemClock`] reads the host wall clock through `chrono`.
//! - [`SimulatedClock`] is advanced by hand; the simulator runs it faster
//!   than real time and the tests step it deterministically.

use core::cell::Cell;

use crate::app::ports::ClockPort;
use crate::team::Timestamp;

/// Host wall clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl ClockPort for SystemClock {
    fn now(&self) -> Timestamp {
        chrono::Utc::now().timestamp()
    }
}

/// Manually advanced clock.
#[derive(Debug, Default)]
pub struct SimulatedClock {
    now: Cell<Timestamp>,
}

impl SimulatedClock {
    pub fn starting_at(epoch_secs: Timestamp) -> Self {
        Self {
            now: Cell::new(epoch_secs),
        }
    }

    /// Move forward by `secs` and return the new time.
    pub fn advance(&self, secs: i64) -> Timestamp {
        let next = self.now.get().saturating_add(secs);
        self.now.set(next);
        next
    }
}

impl ClockPort for SimulatedClock {
    fn now(&self) -> Timestamp {
        self.now.get()
    }
}
