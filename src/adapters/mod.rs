//! Adapters: concrete implementations of the port traits.
//!
//! | Adapter    | Implements  | Connects to                 |
//! |------------|-------------|-----------------------------|
//! | `log_sink` | EventSink   | `log` facade                |
//! | `persist`  | StoragePort | in-memory map (host, tests) |
//! | `time`     | ClockPort   | host clock / simulated time |

pub mod log_sink;
pub mod persist;
pub mod time;
