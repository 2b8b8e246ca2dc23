//! In-memory storage adapter.
//!
//! Implements [`StoragePort`] over a `HashMap` keyed by
//! `namespace::key`.  Used by the simulator and the host tests; the watch
//! build puts its own flash-backed implementation behind the same trait.
//!
//! Writes can be made to fail on demand so persistence-failure paths are
//! testable.

use std::cell::RefCell;
use std::collections::HashMap;

use log::info;

use crate::app::ports::{StorageError, StoragePort};

#[derive(Debug, Default)]
pub struct MemoryStore {
    store: RefCell<HashMap<String, Vec<u8>>>,
    fail_writes: Option<StorageError>,
}

impl MemoryStore {
    pub fn new() -> Self {
        info!("MemoryStore: simulation backend");
        Self::default()
    }

    fn composite_key(namespace: &str, key: &str) -> String {
        format!("{namespace}::{key}")
    }

    /// Make every following write and delete fail with `error`, or
    /// succeed again with `None`.
    pub fn fail_writes(&mut self, error: Option<StorageError>) {
        self.fail_writes = error;
    }

    /// Raw stored bytes, for inspection in tests.
    pub fn raw(&self, namespace: &str, key: &str) -> Option<Vec<u8>> {
        self.store
            .borrow()
            .get(&Self::composite_key(namespace, key))
            .cloned()
    }

    pub fn len(&self) -> usize {
        self.store.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.borrow().is_empty()
    }
}

impl StoragePort for MemoryStore {
    fn read(&self, namespace: &str, key: &str, buf: &mut [u8]) -> Result<usize, StorageError> {
        match self.store.borrow().get(&Self::composite_key(namespace, key)) {
            Some(data) => {
                let len = data.len().min(buf.len());
                buf[..len].copy_from_slice(&data[..len]);
                Ok(len)
            }
            None => Err(StorageError::NotFound),
        }
    }

    fn write(&mut self, namespace: &str, key: &str, data: &[u8]) -> Result<(), StorageError> {
        if let Some(e) = self.fail_writes {
            return Err(e);
        }
        self.store
            .borrow_mut()
            .insert(Self::composite_key(namespace, key), data.to_vec());
        Ok(())
    }

    fn delete(&mut self, namespace: &str, key: &str) -> Result<(), StorageError> {
        if let Some(e) = self.fail_writes {
            return Err(e);
        }
        self.store
            .borrow_mut()
            .remove(&Self::composite_key(namespace, key));
        Ok(())
    }

    fn exists(&self, namespace: &str, key: &str) -> bool {
        self.store
            .borrow()
            .contains_key(&Self::composite_key(namespace, key))
    }
}
