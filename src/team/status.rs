//! Team monitoring status.
//!
//! ```text
//!  NotStarted ──start──▶ FullNoAlarm
//!                            │ pressure < default - third
//!                            ▼
//!                      ThirdFullAlarm ──confirm──▶ ThirdFullConfirmed
//!                            │                          │
//!                            ▼                          ▼
//!                      HalfFullAlarm  ──confirm──▶ HalfFullConfirmed
//!                            │                          │
//!                            ▼                          ▼
//!                      ThirdEmptyAlarm ─confirm──▶ ThirdEmptyConfirmed
//!                            │                          │
//!                            ▼                          ▼
//!                      EmptyAlarm     ──confirm──▶ EmptyConfirmed
//!
//!  any ──stop──▶ NotStarted
//! ```
//!
//! The discriminants are persisted, so their order is part of the storage
//! format.  Status only ever moves forward except through `stop`.

/// Ordered monitoring status of one team.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum TeamStatus {
    NotStarted = 0,
    FullNoAlarm = 1,
    ThirdFullAlarm = 2,
    ThirdFullConfirmed = 3,
    HalfFullAlarm = 4,
    HalfFullConfirmed = 5,
    ThirdEmptyAlarm = 6,
    ThirdEmptyConfirmed = 7,
    EmptyAlarm = 8,
    EmptyConfirmed = 9,
}

impl TeamStatus {
    /// Total number of statuses.
    pub const COUNT: usize = 10;

    /// Decode a persisted discriminant.
    pub const fn from_u8(raw: u8) -> Option<Self> {
        Some(match raw {
            0 => Self::NotStarted,
            1 => Self::FullNoAlarm,
            2 => Self::ThirdFullAlarm,
            3 => Self::ThirdFullConfirmed,
            4 => Self::HalfFullAlarm,
            5 => Self::HalfFullConfirmed,
            6 => Self::ThirdEmptyAlarm,
            7 => Self::ThirdEmptyConfirmed,
            8 => Self::EmptyAlarm,
            9 => Self::EmptyConfirmed,
            _ => return None,
        })
    }

    pub const fn as_u8(self) -> u8 {
        self as u8
    }

    /// `true` for the four alarm values still waiting for a user confirm.
    pub const fn is_unconfirmed_alarm(self) -> bool {
        matches!(
            self,
            Self::ThirdFullAlarm | Self::HalfFullAlarm | Self::ThirdEmptyAlarm | Self::EmptyAlarm
        )
    }

    pub const fn is_active(self) -> bool {
        !matches!(self, Self::NotStarted)
    }

    /// The confirmed value that follows an un-confirmed alarm.
    pub const fn confirmed(self) -> Option<Self> {
        match self {
            Self::ThirdFullAlarm => Some(Self::ThirdFullConfirmed),
            Self::HalfFullAlarm => Some(Self::HalfFullConfirmed),
            Self::ThirdEmptyAlarm => Some(Self::ThirdEmptyConfirmed),
            Self::EmptyAlarm => Some(Self::EmptyConfirmed),
            _ => None,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::NotStarted => "NotStarted",
            Self::FullNoAlarm => "FullNoAlarm",
            Self::ThirdFullAlarm => "ThirdFullAlarm",
            Self::ThirdFullConfirmed => "ThirdFullConfirmed",
            Self::HalfFullAlarm => "HalfFullAlarm",
            Self::HalfFullConfirmed => "HalfFullConfirmed",
            Self::ThirdEmptyAlarm => "ThirdEmptyAlarm",
            Self::ThirdEmptyConfirmed => "ThirdEmptyConfirmed",
            Self::EmptyAlarm => "EmptyAlarm",
            Self::EmptyConfirmed => "EmptyConfirmed",
        }
    }
}
