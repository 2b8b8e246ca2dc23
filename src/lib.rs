//! SCBA team air-monitoring library.
//!
//! Tracks the breathing-air reserve of up to three teams, depletes it on a
//! fixed cadence and raises staged alarms as the reserve crosses its
//! bands.  Everything here is pure logic behind port traits; the watch
//! firmware and the host simulator supply the adapters.
//!
//! ```text
//!  catalog ─┐
//!  units ───┼──▶ team (record · status · alarm · engine) ──▶ app::service
//!  config ──┘                                                   │
//!                                   facts ◀─────────────────────┤
//!                                   app::screens ───commands───▶┘
//! ```

#![deny(unused_must_use)]

pub mod adapters;
pub mod app;
pub mod catalog;
pub mod config;
pub mod drivers;
pub mod error;
pub mod facts;
pub mod team;
pub mod units;

pub use error::{Error, Result};
