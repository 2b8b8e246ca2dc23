//! Mock adapters for integration tests.
//!
//! `MockStore` counts writes and deletes per key so tests can assert on
//! exactly what was persisted; `RecordingSink` keeps every emitted event.

use std::collections::HashMap;

use scbatrack::app::events::AppEvent;
use scbatrack::app::ports::{EventSink, StorageError, StoragePort};

// ── MockStore ─────────────────────────────────────────────────

#[derive(Default)]
pub struct MockStore {
    store: HashMap<String, Vec<u8>>,
    pub writes: Vec<String>,
    pub deletes: Vec<String>,
}

#[allow(dead_code)]
impl MockStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, namespace: &str, key: &str) -> Option<&Vec<u8>> {
        self.store.get(&format!("{}::{}", namespace, key))
    }

    pub fn put(&mut self, namespace: &str, key: &str, data: &[u8]) {
        self.store
            .insert(format!("{}::{}", namespace, key), data.to_vec());
    }

    pub fn writes_to(&self, key: &str) -> usize {
        self.writes.iter().filter(|k| k.ends_with(&format!("::{key}"))).count()
    }

    pub fn clear_log(&mut self) {
        self.writes.clear();
        self.deletes.clear();
    }
}

impl StoragePort for MockStore {
    fn read(&self, namespace: &str, key: &str, buf: &mut [u8]) -> Result<usize, StorageError> {
        match self.get(namespace, key) {
            Some(v) => {
                let n = v.len().min(buf.len());
                buf[..n].copy_from_slice(&v[..n]);
                Ok(n)
            }
            None => Err(StorageError::NotFound),
        }
    }

    fn write(&mut self, namespace: &str, key: &str, data: &[u8]) -> Result<(), StorageError> {
        let k = format!("{}::{}", namespace, key);
        self.writes.push(k.clone());
        self.store.insert(k, data.to_vec());
        Ok(())
    }

    fn delete(&mut self, namespace: &str, key: &str) -> Result<(), StorageError> {
        let k = format!("{}::{}", namespace, key);
        self.store.remove(&k);
        self.deletes.push(k);
        Ok(())
    }

    fn exists(&self, namespace: &str, key: &str) -> bool {
        self.get(namespace, key).is_some()
    }
}

// ── RecordingSink ─────────────────────────────────────────────

#[derive(Default)]
pub struct RecordingSink {
    pub events: Vec<AppEvent>,
}

#[allow(dead_code)]
impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self, pred: impl Fn(&AppEvent) -> bool) -> usize {
        self.events.iter().filter(|e| pred(e)).count()
    }

    pub fn take(&mut self) -> Vec<AppEvent> {
        std::mem::take(&mut self.events)
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &AppEvent) {
        self.events.push(event.clone());
    }
}
