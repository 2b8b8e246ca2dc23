//! Pressure unit handling.
//!
//! Pressures are stored as unsigned integers in whichever unit system the
//! device is configured for.  Conversions truncate (floor) to match the
//! precision shown on the watch face.  Air volume is unit-agnostic
//! (deciliters) and is never converted.

use serde::{Deserialize, Serialize};

use crate::catalog::BottleProfile;
use crate::team::TeamRecord;

/// psi per bar.
pub const BAR_TO_PSI: f64 = 14.503_773_773;

/// Global unit system flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum UnitSystem {
    #[default]
    Metric,
    Imperial,
}

impl UnitSystem {
    pub const fn is_imperial(self) -> bool {
        matches!(self, Self::Imperial)
    }

    pub const fn from_imperial_flag(imperial: bool) -> Self {
        if imperial { Self::Imperial } else { Self::Metric }
    }

    /// Short unit label for display.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Metric => "bar",
            Self::Imperial => "psi",
        }
    }
}

/// `floor(bar * 14.503773773)`, saturating at `u16::MAX`.
pub fn to_psi(bar: u16) -> u16 {
    (f64::from(bar) * BAR_TO_PSI).floor().min(f64::from(u16::MAX)) as u16
}

/// `floor(psi / 14.503773773)`.
pub fn to_bar(psi: u16) -> u16 {
    (f64::from(psi) / BAR_TO_PSI).floor() as u16
}

/// Convert a pressure between unit systems.
pub fn convert(pressure: u16, from: UnitSystem, to: UnitSystem) -> u16 {
    match (from, to) {
        (UnitSystem::Metric, UnitSystem::Imperial) => to_psi(pressure),
        (UnitSystem::Imperial, UnitSystem::Metric) => to_bar(pressure),
        _ => pressure,
    }
}

/// Air volume (dl) held in `profile` at `pressure` expressed in `unit`.
///
/// Saturates at `u16::MAX`.
pub fn volume_from_pressure(pressure: u16, unit: UnitSystem, profile: &BottleProfile) -> u16 {
    let k = u32::from(profile.dl_per_bar);
    let volume = match unit {
        UnitSystem::Metric => u32::from(pressure) * k,
        UnitSystem::Imperial => (f64::from(pressure) * f64::from(k) / BAR_TO_PSI).floor() as u32,
    };
    volume.min(u32::from(u16::MAX)) as u16
}

/// Pressure (in `unit`) corresponding to `volume` dl in `profile`.
///
/// Metric uses integer floor division, so a round trip through
/// [`volume_from_pressure`] loses at most one conversion constant worth of
/// volume.
pub fn pressure_from_volume(volume: u16, unit: UnitSystem, profile: &BottleProfile) -> u16 {
    let k = profile.dl_per_bar;
    debug_assert!(k > 0, "bottle {} has zero dl/bar", profile.name);
    if k == 0 {
        return 0;
    }
    match unit {
        UnitSystem::Metric => volume / k,
        UnitSystem::Imperial => {
            (f64::from(volume) * BAR_TO_PSI / f64::from(k))
                .floor()
                .min(f64::from(u16::MAX)) as u16
        }
    }
}

/// Bring a record's pressure into `target` units.
///
/// Returns `true` when the record was converted and must be persisted.
/// Calling it again with the same target is a no-op.
pub fn reconcile(record: &mut TeamRecord, target: UnitSystem) -> bool {
    if record.unit == target {
        return false;
    }
    record.pressure = convert(record.pressure, record.unit, target);
    record.unit = target;
    true
}
