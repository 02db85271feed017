//! Port to the orchestrator-provided key-value store.

use mtl_types::LedgerError;

/// Backing store abstraction. Both calls are transactional relative to the
/// enclosing transaction; the orchestrator serializes commit.
pub trait KvStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, LedgerError>;
    fn put(&mut self, key: &str, value: Vec<u8>) -> Result<(), LedgerError>;
}
