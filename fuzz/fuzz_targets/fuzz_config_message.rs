//! Fuzz target: companion-app configuration messages
//!
//! Whatever arrives over the link, the live configuration must stay valid.
//!
//! cargo fuzz run fuzz_config_message

#![no_main]

use libfuzzer_sys::fuzz_target;
use scbatrack::adapters::log_sink::LogEventSink;
use scbatrack::adapters::persist::MemoryStore;
use scbatrack::app::service::AppService;
use scbatrack::config::ConfigStore;

fuzz_target!(|data: &[u8]| {
    let Ok(json) = core::str::from_utf8(data) else {
        return;
    };
    let mut store = MemoryStore::new();
    let mut sink = LogEventSink::new();
    let mut app = AppService::new(ConfigStore::default());
    let _ = app.apply_config_message(json, &mut store, &mut sink);
    assert!(app.config().validate().is_ok());
});
