//! Input helpers.

pub mod button;
