//! Persisted per-team record and its packed wire layout.
//!
//! ```text
//! ┌────────┬──────────────┬──────────┬────────┬────────┬────────┬──────┐
//! │ nr (1) │ start i64 (8)│ press (2)│ vol (2)│ bottle │ status │ unit │
//! └────────┴──────────────┴──────────┴────────┴────────┴────────┴──────┘
//!   0        1..9           9..11      11..13   13       14       15
//! ```
//!
//! Multi-byte fields are little-endian.  Decoding validates every field so
//! a corrupted flash page can never put an impossible value into the
//! engine.

use core::fmt;
use core::fmt::Write as _;

use crate::catalog::{self, BottleIndex};
use crate::error::Error;
use crate::units::{self, UnitSystem};

use super::status::TeamStatus;

/// Number of independently monitored team slots.
pub const TEAM_COUNT: usize = 3;

/// Highest selectable team number.
pub const TEAM_NUMBER_MAX: u8 = 10;

/// Size of an encoded [`TeamRecord`].
pub const RECORD_LEN: usize = 16;

/// Epoch seconds.
pub type Timestamp = i64;

/// Storage key of a team record.
pub type StorageKey = heapless::String<8>;

// ---------------------------------------------------------------------------
// Boundary newtypes
// ---------------------------------------------------------------------------

/// Index of a team slot, `0..TEAM_COUNT`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TeamSlot(u8);

impl TeamSlot {
    pub const FIRST: Self = Self(0);

    pub fn new(raw: usize) -> Result<Self, Error> {
        if raw < TEAM_COUNT {
            Ok(Self(raw as u8))
        } else {
            Err(Error::InvalidTeamSlot(raw))
        }
    }

    pub const fn get(self) -> usize {
        self.0 as usize
    }

    pub fn all() -> impl Iterator<Item = Self> {
        (0..TEAM_COUNT as u8).map(Self)
    }

    /// Next slot, wrapping after the last one.
    pub const fn next(self) -> Self {
        Self((self.0 + 1) % TEAM_COUNT as u8)
    }

    /// Previous slot, wrapping before the first one.
    pub const fn prev(self) -> Self {
        Self((self.0 + TEAM_COUNT as u8 - 1) % TEAM_COUNT as u8)
    }

    /// Storage key of this slot's record, `team0`..`team2`.
    pub fn storage_key(self) -> StorageKey {
        let mut key = StorageKey::new();
        let _ = write!(key, "team{}", self.0);
        key
    }

    /// Team number a fresh slot shows: slot 0 is team 1.
    pub const fn default_team_number(self) -> TeamNumber {
        TeamNumber(self.0 + 1)
    }
}

/// Display-only team number, `1..=10`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TeamNumber(u8);

impl TeamNumber {
    pub fn new(raw: u8) -> Result<Self, Error> {
        if (1..=TEAM_NUMBER_MAX).contains(&raw) {
            Ok(Self(raw))
        } else {
            Err(Error::InvalidTeamNumber(raw))
        }
    }

    pub const fn get(self) -> u8 {
        self.0
    }

    /// 1 → 2 → … → 10 → 1
    pub const fn next(self) -> Self {
        if self.0 >= TEAM_NUMBER_MAX {
            Self(1)
        } else {
            Self(self.0 + 1)
        }
    }

    /// 10 → 9 → … → 1 → 10
    pub const fn prev(self) -> Self {
        if self.0 <= 1 {
            Self(TEAM_NUMBER_MAX)
        } else {
            Self(self.0 - 1)
        }
    }
}

// ---------------------------------------------------------------------------
// Record
// ---------------------------------------------------------------------------

/// Durable state of one monitored team.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TeamRecord {
    pub team_number: TeamNumber,
    pub start_time: Timestamp,
    /// Current pressure, in `unit`.
    pub pressure: u16,
    /// Remaining air in deciliters, derived from `pressure`.
    pub volume: u16,
    pub bottle: BottleIndex,
    pub status: TeamStatus,
    /// Unit `pressure` is expressed in.
    pub unit: UnitSystem,
}

impl TeamRecord {
    /// A not-yet-started record filled with `bottle`'s nominal pressure.
    pub fn idle(slot: TeamSlot, bottle: BottleIndex, unit: UnitSystem) -> Self {
        let profile = catalog::profile(bottle);
        let pressure = profile.default_pressure(unit);
        Self {
            team_number: slot.default_team_number(),
            start_time: 0,
            pressure,
            volume: units::volume_from_pressure(pressure, unit, profile),
            bottle,
            status: TeamStatus::NotStarted,
            unit,
        }
    }

    pub fn encode(&self) -> [u8; RECORD_LEN] {
        let mut buf = [0u8; RECORD_LEN];
        buf[0] = self.team_number.get();
        buf[1..9].copy_from_slice(&self.start_time.to_le_bytes());
        buf[9..11].copy_from_slice(&self.pressure.to_le_bytes());
        buf[11..13].copy_from_slice(&self.volume.to_le_bytes());
        buf[13] = self.bottle.get() as u8;
        buf[14] = self.status.as_u8();
        buf[15] = u8::from(self.unit.is_imperial());
        buf
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, RecordError> {
        if bytes.len() != RECORD_LEN {
            return Err(RecordError::BadLength(bytes.len()));
        }
        let team_number =
            TeamNumber::new(bytes[0]).map_err(|_| RecordError::BadTeamNumber(bytes[0]))?;

        let mut start = [0u8; 8];
        start.copy_from_slice(&bytes[1..9]);
        let pressure = u16::from_le_bytes([bytes[9], bytes[10]]);
        let volume = u16::from_le_bytes([bytes[11], bytes[12]]);

        let bottle = BottleIndex::new(usize::from(bytes[13]))
            .map_err(|_| RecordError::BadBottle(bytes[13]))?;
        let status = TeamStatus::from_u8(bytes[14]).ok_or(RecordError::BadStatus(bytes[14]))?;
        let unit = match bytes[15] {
            0 => UnitSystem::Metric,
            1 => UnitSystem::Imperial,
            other => return Err(RecordError::BadUnit(other)),
        };

        Ok(Self {
            team_number,
            start_time: i64::from_le_bytes(start),
            pressure,
            volume,
            bottle,
            status,
            unit,
        })
    }
}

// ---------------------------------------------------------------------------
// Decode errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordError {
    BadLength(usize),
    BadTeamNumber(u8),
    BadBottle(u8),
    BadStatus(u8),
    BadUnit(u8),
}

impl fmt::Display for RecordError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BadLength(n) => write!(f, "expected {RECORD_LEN} bytes, got {n}"),
            Self::BadTeamNumber(v) => write!(f, "team number {v} out of range"),
            Self::BadBottle(v) => write!(f, "bottle index {v} out of range"),
            Self::BadStatus(v) => write!(f, "unknown status {v}"),
            Self::BadUnit(v) => write!(f, "unknown unit tag {v}"),
        }
    }
}
