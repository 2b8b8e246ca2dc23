//! Press-and-hold repetition for the Up / Down buttons.
//!
//! Click classification (single, double, long) is done by the watch's
//! input layer and arrives as a [`UserAction`](crate::app::screens::UserAction).
//! Holding a directional button is the one gesture that needs time on our
//! side: while held, the pressure screen steps once every
//! [`HOLD_REPEAT_MS`].
//!
//! ```text
//!  Idle ──hold start──▶ Held{dir, last_ms} ──tick ≥ 50 ms──▶ step(dir)
//!    ▲                       │
//!    └──hold stop / cancel───┘
//! ```
//!
//! `tick()` is polled from the main loop with a monotonic millisecond
//! counter; the repeater itself owns no timer.

/// Interval between two repeated steps while a button is held.
pub const HOLD_REPEAT_MS: u32 = 50;

/// A directional button.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
}

impl Direction {
    /// Signed step of `magnitude` in this direction.
    pub const fn delta(self, magnitude: i16) -> i16 {
        match self {
            Self::Up => magnitude,
            Self::Down => -magnitude,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Held {
    direction: Direction,
    last_ms: u32,
}

/// Cancellable repeating task driven by [`tick`](Self::tick).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HoldRepeater {
    held: Option<Held>,
}

impl HoldRepeater {
    pub const fn new() -> Self {
        Self { held: None }
    }

    /// Begin repeating `direction`.  A hold already in progress is
    /// replaced.
    pub fn start(&mut self, direction: Direction, now_ms: u32) {
        self.held = Some(Held {
            direction,
            last_ms: now_ms,
        });
    }

    /// Release of `direction`.  Releasing the other button is ignored.
    pub fn stop(&mut self, direction: Direction) {
        if self.held.is_some_and(|h| h.direction == direction) {
            self.held = None;
        }
    }

    /// Drop any hold, e.g. when leaving the pressure screen.
    pub fn cancel(&mut self) {
        self.held = None;
    }

    pub fn is_active(&self) -> bool {
        self.held.is_some()
    }

    /// Poll.  Returns the direction to step when the interval elapsed.
    /// A late poll yields a single step, not a burst.
    pub fn tick(&mut self, now_ms: u32) -> Option<Direction> {
        let held = self.held.as_mut()?;
        if now_ms.wrapping_sub(held.last_ms) < HOLD_REPEAT_MS {
            return None;
        }
        held.last_ms = now_ms;
        Some(held.direction)
    }
}
