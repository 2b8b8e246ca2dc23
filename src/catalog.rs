//! Static bottle catalog.
//!
//! Immutable table of the SCBA cylinder profiles the tracker knows about.
//! Every [`TeamRecord`](crate::team::TeamRecord) references one entry by
//! [`BottleIndex`]; entries are shared read-only by all teams.
//!
//! | Idx | Name    | Capacity | Default        | dl/bar |
//! |-----|---------|----------|----------------|--------|
//! | 0   | 9l      | 90 dl    | 300 bar / 4351 | 80     |
//! | 1   | 6,8l    | 68 dl    | 300 bar / 4351 | 60     |
//! | 2   | 2x4l    | 80 dl    | 200 bar / 2900 | 80     |
//! | 3   | 2x6,8l  | 136 dl   | 300 bar / 4351 | 120    |
//! | 4   | 6l      | 60 dl    | 300 bar / 4351 | 54     |
//! | 5   | 2x6l    | 120 dl   | 300 bar / 4351 | 108    |

use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::units::UnitSystem;

/// Number of entries in the catalog.
pub const BOTTLE_COUNT: usize = 6;

/// Reserve pressure below which a team must begin its exit (bar).
pub const MIN_RESERVE_BAR: u16 = 50;

/// Reserve pressure in psi, `floor(50 * 14.503773773)`.
pub const MIN_RESERVE_PSI: u16 = 725;

/// One cylinder profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BottleProfile {
    /// Water capacity in deciliters.
    pub capacity_dl: u16,
    /// Nominal fill pressure in bar.
    pub default_bar: u16,
    /// Nominal fill pressure in psi.
    pub default_psi: u16,
    /// Usable air per bar of pressure, in deciliters.  Always > 0.
    pub dl_per_bar: u16,
    /// Whether the profile is enabled on a fresh device.
    pub default_available: bool,
    pub name: &'static str,
}

impl BottleProfile {
    /// Nominal fill pressure expressed in `unit`.
    pub const fn default_pressure(&self, unit: UnitSystem) -> u16 {
        match unit {
            UnitSystem::Metric => self.default_bar,
            UnitSystem::Imperial => self.default_psi,
        }
    }

    /// Upper bound for manual pressure entry: 110 % of the nominal fill.
    pub fn max_pressure(&self, unit: UnitSystem) -> u16 {
        (u32::from(self.default_pressure(unit)) * 110 / 100) as u16
    }

    /// Air volume held back as exit reserve, in deciliters.
    pub fn safety_volume(&self) -> u16 {
        self.dl_per_bar.saturating_mul(MIN_RESERVE_BAR)
    }
}

/// Reserve pressure in the requested unit.
pub const fn min_reserve(unit: UnitSystem) -> u16 {
    match unit {
        UnitSystem::Metric => MIN_RESERVE_BAR,
        UnitSystem::Imperial => MIN_RESERVE_PSI,
    }
}

static BOTTLES: [BottleProfile; BOTTLE_COUNT] = [
    BottleProfile {
        capacity_dl: 90,
        default_bar: 300,
        default_psi: 4351,
        dl_per_bar: 80,
        default_available: true,
        name: "9l",
    },
    BottleProfile {
        capacity_dl: 68,
        default_bar: 300,
        default_psi: 4351,
        dl_per_bar: 60,
        default_available: true,
        name: "6,8l",
    },
    BottleProfile {
        capacity_dl: 80,
        default_bar: 200,
        default_psi: 2900,
        dl_per_bar: 80,
        default_available: true,
        name: "2x4l",
    },
    BottleProfile {
        capacity_dl: 136,
        default_bar: 300,
        default_psi: 4351,
        dl_per_bar: 120,
        default_available: true,
        name: "2x6,8l",
    },
    BottleProfile {
        capacity_dl: 60,
        default_bar: 300,
        default_psi: 4351,
        dl_per_bar: 54,
        default_available: false,
        name: "6l",
    },
    BottleProfile {
        capacity_dl: 120,
        default_bar: 300,
        default_psi: 4351,
        dl_per_bar: 108,
        default_available: false,
        name: "2x6l",
    },
];

/// Validated index into the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct BottleIndex(u8);

impl TryFrom<u8> for BottleIndex {
    type Error = Error;

    fn try_from(raw: u8) -> Result<Self, Error> {
        Self::new(usize::from(raw))
    }
}

impl From<BottleIndex> for u8 {
    fn from(index: BottleIndex) -> Self {
        index.0
    }
}

impl BottleIndex {
    pub const FIRST: Self = Self(0);

    /// Validate a raw index at the boundary.
    pub fn new(raw: usize) -> Result<Self, Error> {
        if raw < BOTTLE_COUNT {
            Ok(Self(raw as u8))
        } else {
            Err(Error::InvalidBottle(raw))
        }
    }

    pub const fn get(self) -> usize {
        self.0 as usize
    }

    /// All catalog indices in order.
    pub fn all() -> impl Iterator<Item = Self> {
        (0..BOTTLE_COUNT as u8).map(Self)
    }

    /// The profile this index refers to.
    pub fn profile(self) -> &'static BottleProfile {
        profile(self)
    }
}

/// Look up a profile.  Indices are validated on construction, so this
/// cannot fail.
pub fn profile(index: BottleIndex) -> &'static BottleProfile {
    &BOTTLES[index.get()]
}

/// The full table, in index order.
pub fn profiles() -> &'static [BottleProfile; BOTTLE_COUNT] {
    &BOTTLES
}
