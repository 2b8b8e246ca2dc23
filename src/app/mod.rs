//! Application core: tracker logic behind port traits.
//!
//! The service owns the configuration and the team slots, the screen
//! controller maps button actions to service commands.  Storage, clock and
//! event output reach this layer only through the traits in [`ports`], so
//! the whole core runs on the host against in-memory adapters.

pub mod commands;
pub mod events;
pub mod ports;
pub mod screens;
pub mod service;
