//! Fuzz target: team record restore
//!
//! Arbitrary flash contents under a team key must never panic the decoder
//! or the service that restores and keeps depleting the team.
//!
//! cargo fuzz run fuzz_team_record

#![no_main]

use libfuzzer_sys::fuzz_target;
use scbatrack::adapters::log_sink::LogEventSink;
use scbatrack::adapters::persist::MemoryStore;
use scbatrack::app::ports::StoragePort;
use scbatrack::app::service::AppService;
use scbatrack::config::NAMESPACE;
use scbatrack::team::TeamRecord;

fuzz_target!(|data: &[u8]| {
    if let Ok(record) = TeamRecord::decode(data) {
        assert_eq!(&record.encode()[..], data, "accepted record must be canonical");
    }

    let mut store = MemoryStore::new();
    let _ = store.write(NAMESPACE, "team0", data);
    let mut sink = LogEventSink::new();
    let mut app = AppService::load(&mut store, 0, &mut sink);
    for now in 1..=600 {
        app.tick(now, &mut store, &mut sink);
    }
});
