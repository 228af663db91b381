//! In-memory store
//!
//! A hash map behind a read-write lock: many concurrent readers, one
//! writer at a time.

use std::collections::HashMap;

use parking_lot::RwLock;

use crate::error::{LedgerError, Result};

use super::Storage;

/// Hash-map store guarded by an `RwLock`
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live keys
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// True if no keys are present
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

impl Storage for MemoryStore {
    fn put(&self, key: &str, value: &str) -> Result<()> {
        self.entries
            .write()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn get(&self, key: &str) -> Result<String> {
        self.entries
            .read()
            .get(key)
            .cloned()
            .ok_or(LedgerError::KeyNotFound)
    }

    fn delete(&self, key: &str) -> Result<()> {
        self.entries
            .write()
            .remove(key)
            .map(|_| ())
            .ok_or(LedgerError::KeyNotFound)
    }
}
