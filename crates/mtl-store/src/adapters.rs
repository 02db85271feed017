//! In-memory `KvStore` adapter, used by the test suite and by hosts that
//! manage durability themselves.

use crate::ports::KvStore;
use mtl_types::LedgerError;
use std::collections::BTreeMap;

/// BTreeMap-backed store. Deterministic iteration order, no I/O.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: BTreeMap<String, Vec<u8>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate all entries; used by conservation property tests.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Vec<u8>)> {
        self.entries.iter()
    }
}

impl KvStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, LedgerError> {
        Ok(self.entries.get(key).cloned())
    }

    fn put(&mut self, key: &str, value: Vec<u8>) -> Result<(), LedgerError> {
        self.entries.insert(key.to_string(), value);
        Ok(())
    }
}
