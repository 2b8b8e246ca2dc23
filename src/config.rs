//! Site configuration.
//!
//! Process-wide tunables for the tracker.  Loaded once at boot from
//! durable storage, mutated only by inbound configuration updates, never
//! reset during normal operation.
//!
//! Each field is persisted under its own key (namespace `scba`) so a
//! single update only rewrites what changed:
//!
//! | Key            | Type | Field                      |
//! |----------------|------|----------------------------|
//! | `breath_rate`  | u16  | air consumption, dl/min    |
//! | `bottle0`..`5` | bool | bottle enabled on site     |
//! | `def_bottle`   | u8   | default bottle index       |
//! | `imperial`     | bool | psi instead of bar         |
//!
//! Values are `postcard`-encoded.

use core::fmt::Write as _;

use log::{info, warn};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::app::ports::{ConfigError, StorageError, StoragePort};
use crate::catalog::{self, BOTTLE_COUNT, BottleIndex};
use crate::error::Error;
use crate::units::UnitSystem;

/// Storage namespace shared by configuration and team records.
pub const NAMESPACE: &str = "scba";

const KEY_BREATH_RATE: &str = "breath_rate";
const KEY_DEFAULT_BOTTLE: &str = "def_bottle";
const KEY_IMPERIAL: &str = "imperial";

/// Accepted air consumption range, dl/min.
pub const BREATHING_RATE_RANGE: core::ops::RangeInclusive<u16> = 1..=2000;

/// Default air consumption: 50 l/min, a team under mid to heavy work.
pub const DEFAULT_BREATHING_RATE: u16 = 500;

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Configuration {
    /// Air consumption in deciliters per minute.
    pub breathing_rate: u16,
    /// Per-bottle site availability, indexed like the catalog.
    pub bottles_enabled: [bool; BOTTLE_COUNT],
    /// Bottle preselected for a fresh team.  Always enabled.
    pub default_bottle: BottleIndex,
    pub units: UnitSystem,
}

impl Default for Configuration {
    fn default() -> Self {
        let mut bottles_enabled = [false; BOTTLE_COUNT];
        for (slot, profile) in bottles_enabled.iter_mut().zip(catalog::profiles()) {
            *slot = profile.default_available;
        }
        Self {
            breathing_rate: DEFAULT_BREATHING_RATE,
            bottles_enabled,
            default_bottle: BottleIndex::FIRST,
            units: UnitSystem::Metric,
        }
    }
}

impl Configuration {
    pub fn is_available(&self, bottle: BottleIndex) -> bool {
        self.bottles_enabled[bottle.get()]
    }

    /// Enabled bottles in catalog order.
    pub fn available_bottles(&self) -> impl Iterator<Item = BottleIndex> + '_ {
        BottleIndex::all().filter(|b| self.is_available(*b))
    }

    /// Next enabled bottle after `from`, wrapping.  Returns `from` when it
    /// is the only enabled one.
    pub fn next_available(&self, from: BottleIndex) -> BottleIndex {
        (1..=BOTTLE_COUNT)
            .map(|step| (from.get() + step) % BOTTLE_COUNT)
            .filter_map(|raw| BottleIndex::new(raw).ok())
            .find(|b| self.is_available(*b))
            .unwrap_or(from)
    }

    /// Previous enabled bottle before `from`, wrapping.
    pub fn prev_available(&self, from: BottleIndex) -> BottleIndex {
        (1..=BOTTLE_COUNT)
            .map(|step| (from.get() + BOTTLE_COUNT - step) % BOTTLE_COUNT)
            .filter_map(|raw| BottleIndex::new(raw).ok())
            .find(|b| self.is_available(*b))
            .unwrap_or(from)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !BREATHING_RATE_RANGE.contains(&self.breathing_rate) {
            return Err(ConfigError::ValidationFailed(
                "breathing rate must be 1-2000 dl/min",
            ));
        }
        if !self.bottles_enabled.iter().any(|e| *e) {
            return Err(ConfigError::ValidationFailed(
                "at least one bottle type must stay enabled",
            ));
        }
        if !self.is_available(self.default_bottle) {
            return Err(ConfigError::ValidationFailed(
                "default bottle must be an enabled bottle type",
            ));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Updates
// ---------------------------------------------------------------------------

/// One recognised field of an inbound configuration message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigUpdate {
    BreathingRate(u16),
    BottleAvailable { bottle: BottleIndex, available: bool },
    DefaultBottle(BottleIndex),
    Units(UnitSystem),
}

impl ConfigUpdate {
    /// Decode a companion-app message.
    ///
    /// The message is a flat JSON object.  Recognised keys are
    /// `breath_rate`, `type1`..`type6` (1-based bottle availability),
    /// `def_bottle` (1-based) and `imperial`.  Values may be numbers,
    /// booleans or numeric strings.  Anything else is skipped.
    ///
    /// The result is ordered so that enabling bottles comes before picking
    /// a default, and disabling comes after.
    pub fn decode_message(json: &str) -> Result<Vec<Self>, Error> {
        let value: Value = serde_json::from_str(json).map_err(|_| Error::MalformedMessage)?;
        let Value::Object(map) = value else {
            return Err(Error::MalformedMessage);
        };

        let mut updates = Vec::with_capacity(map.len());
        for (key, value) in &map {
            match Self::decode_field(key, value) {
                Some(update) => updates.push(update),
                None => warn!("config message: ignoring {key}={value}"),
            }
        }
        updates.sort_by_key(Self::apply_order);
        Ok(updates)
    }

    fn decode_field(key: &str, value: &Value) -> Option<Self> {
        let number = value_as_u64(value)?;
        match key {
            "breath_rate" => u16::try_from(number).ok().map(Self::BreathingRate),
            "def_bottle" => one_based_bottle(number).map(Self::DefaultBottle),
            "imperial" => Some(Self::Units(UnitSystem::from_imperial_flag(number != 0))),
            _ => {
                let nr: u64 = key.strip_prefix("type")?.parse().ok()?;
                let bottle = one_based_bottle(nr)?;
                Some(Self::BottleAvailable {
                    bottle,
                    available: number != 0,
                })
            }
        }
    }

    fn apply_order(&self) -> u8 {
        match self {
            Self::BottleAvailable { available: true, .. } => 0,
            Self::DefaultBottle(_) => 1,
            Self::BottleAvailable { available: false, .. } => 2,
            Self::BreathingRate(_) => 3,
            Self::Units(_) => 4,
        }
    }
}

fn value_as_u64(value: &Value) -> Option<u64> {
    match value {
        Value::Bool(b) => Some(u64::from(*b)),
        Value::Number(n) => n.as_u64(),
        Value::String(s) => match s.trim() {
            "true" => Some(1),
            "false" => Some(0),
            other => other.parse().ok(),
        },
        _ => None,
    }
}

fn one_based_bottle(nr: u64) -> Option<BottleIndex> {
    let raw = usize::try_from(nr.checked_sub(1)?).ok()?;
    BottleIndex::new(raw).ok()
}

// ---------------------------------------------------------------------------
// Store
// ---------------------------------------------------------------------------

/// What [`ConfigStore::apply`] changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ApplyOutcome {
    /// Anything at all was written.
    pub changed: bool,
    /// The unit system flipped; teams must be reconciled.
    pub units_changed: bool,
    /// The default bottle moved because the old one was disabled.
    pub default_moved: Option<BottleIndex>,
}

/// Owns the live [`Configuration`] and its per-field persistence.
#[derive(Debug, Clone, Default)]
pub struct ConfigStore {
    config: Configuration,
}

impl ConfigStore {
    pub fn new(config: Configuration) -> Self {
        Self { config }
    }

    /// Read every field from storage, falling back to the default for any
    /// field that is absent or undecodable.
    pub fn load(storage: &dyn StoragePort) -> Self {
        let defaults = Configuration::default();
        let mut config = defaults.clone();

        config.breathing_rate = read_field(storage, KEY_BREATH_RATE, defaults.breathing_rate);
        for bottle in BottleIndex::all() {
            let key = bottle_key(bottle);
            config.bottles_enabled[bottle.get()] =
                read_field(storage, &key, defaults.bottles_enabled[bottle.get()]);
        }
        let raw_default: u8 = read_field(storage, KEY_DEFAULT_BOTTLE, 0);
        config.default_bottle =
            BottleIndex::new(usize::from(raw_default)).unwrap_or(defaults.default_bottle);
        config.units = UnitSystem::from_imperial_flag(read_field(storage, KEY_IMPERIAL, false));

        if let Err(e) = config.validate() {
            warn!("ConfigStore: stored configuration invalid ({e}), using defaults");
            return Self::new(defaults);
        }
        info!(
            "ConfigStore: loaded rate={}dl/min default_bottle={} units={}",
            config.breathing_rate,
            config.default_bottle.get(),
            config.units.label()
        );
        Self::new(config)
    }

    pub fn config(&self) -> &Configuration {
        &self.config
    }

    /// Merge one update into the live configuration.
    ///
    /// The candidate is validated and every changed field is written before
    /// the in-memory copy is replaced, so a rejected or unpersistable
    /// update leaves the live configuration untouched.
    pub fn apply(
        &mut self,
        update: ConfigUpdate,
        storage: &mut dyn StoragePort,
    ) -> Result<ApplyOutcome, ConfigError> {
        let mut candidate = self.config.clone();
        match update {
            ConfigUpdate::BreathingRate(rate) => candidate.breathing_rate = rate,
            ConfigUpdate::BottleAvailable { bottle, available } => {
                candidate.bottles_enabled[bottle.get()] = available;
            }
            ConfigUpdate::DefaultBottle(bottle) => candidate.default_bottle = bottle,
            ConfigUpdate::Units(units) => candidate.units = units,
        }

        let mut outcome = ApplyOutcome::default();
        // Only disabling the current default moves it; an explicit default
        // must name an enabled bottle.
        if let ConfigUpdate::BottleAvailable {
            bottle,
            available: false,
        } = update
        {
            if bottle == candidate.default_bottle {
                let first = candidate.available_bottles().next();
                if let Some(first) = first {
                    outcome.default_moved = Some(first);
                    candidate.default_bottle = first;
                }
            }
        }
        candidate.validate()?;

        if candidate.breathing_rate != self.config.breathing_rate {
            write_field(storage, KEY_BREATH_RATE, &candidate.breathing_rate)?;
        }
        for bottle in BottleIndex::all() {
            let idx = bottle.get();
            if candidate.bottles_enabled[idx] != self.config.bottles_enabled[idx] {
                write_field(storage, &bottle_key(bottle), &candidate.bottles_enabled[idx])?;
            }
        }
        if candidate.default_bottle != self.config.default_bottle {
            write_field(storage, KEY_DEFAULT_BOTTLE, &(candidate.default_bottle.get() as u8))?;
        }
        if candidate.units != self.config.units {
            write_field(storage, KEY_IMPERIAL, &candidate.units.is_imperial())?;
            outcome.units_changed = true;
        }

        outcome.changed = candidate != self.config;
        if outcome.changed {
            info!("ConfigStore: applied {update:?}");
        }
        self.config = candidate;
        Ok(outcome)
    }
}

fn bottle_key(bottle: BottleIndex) -> heapless::String<8> {
    let mut key = heapless::String::new();
    let _ = write!(key, "bottle{}", bottle.get());
    key
}

fn read_field<T: DeserializeOwned>(storage: &dyn StoragePort, key: &str, default: T) -> T {
    let mut buf = [0u8; 8];
    match storage.read(NAMESPACE, key, &mut buf) {
        Ok(len) => match postcard::from_bytes(&buf[..len]) {
            Ok(value) => value,
            Err(_) => {
                warn!("ConfigStore: field '{key}' corrupted, using default");
                default
            }
        },
        Err(StorageError::NotFound) => default,
        Err(e) => {
            warn!("ConfigStore: field '{key}' unreadable ({e}), using default");
            default
        }
    }
}

fn write_field<T: Serialize>(
    storage: &mut dyn StoragePort,
    key: &str,
    value: &T,
) -> Result<(), ConfigError> {
    let bytes = postcard::to_allocvec(value).map_err(|_| ConfigError::IoError)?;
    storage.write(NAMESPACE, key, &bytes).map_err(|e| match e {
        StorageError::Full => ConfigError::StorageFull,
        _ => ConfigError::IoError,
    })
}
