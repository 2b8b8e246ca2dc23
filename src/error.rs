//! Unified error type for the tracker.
//!
//! The team engine itself never fails: everything it does is saturating
//! arithmetic on already-validated inputs.  Errors only arise at the
//! boundary (raw indices coming from the shell or from storage) and in the
//! persistence / configuration ports.  All variants are `Copy` so they can
//! be handed back to the shell without allocation.

use core::fmt;

use crate::app::ports::{ConfigError, StorageError};
use crate::team::record::RecordError;

// ---------------------------------------------------------------------------
// Top-level error
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// Team slot outside `0..TEAM_COUNT`.
    InvalidTeamSlot(usize),
    /// Team number outside `1..=10`.
    InvalidTeamNumber(u8),
    /// Bottle index outside the catalog.
    InvalidBottle(usize),
    /// Bottle exists but is disabled in the site configuration.
    BottleUnavailable(usize),
    /// The command needs a team that is not yet monitored.
    TeamAlreadyStarted(usize),
    /// The command needs a monitored team.
    TeamNotStarted(usize),
    /// Durable storage failed.
    Storage(StorageError),
    /// A configuration update was rejected.
    Config(ConfigError),
    /// A persisted team record could not be decoded.
    Record(RecordError),
    /// An inbound configuration message was not a JSON object.
    MalformedMessage,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidTeamSlot(slot) => write!(f, "team slot {slot} out of range"),
            Self::InvalidTeamNumber(nr) => write!(f, "team number {nr} out of range 1-10"),
            Self::InvalidBottle(idx) => write!(f, "bottle index {idx} out of range"),
            Self::BottleUnavailable(idx) => write!(f, "bottle index {idx} is disabled"),
            Self::TeamAlreadyStarted(slot) => write!(f, "team slot {slot} is already monitored"),
            Self::TeamNotStarted(slot) => write!(f, "team slot {slot} is not monitored"),
            Self::Storage(e) => write!(f, "storage: {e}"),
            Self::Config(e) => write!(f, "config: {e}"),
            Self::Record(e) => write!(f, "record: {e}"),
            Self::MalformedMessage => write!(f, "configuration message is not a JSON object"),
        }
    }
}

impl std::error::Error for Error {}

impl From<StorageError> for Error {
    fn from(e: StorageError) -> Self {
        Self::Storage(e)
    }
}

impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

impl From<RecordError> for Error {
    fn from(e: RecordError) -> Self {
        Self::Record(e)
    }
}

/// Crate-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
