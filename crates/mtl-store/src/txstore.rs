//! # Per-Transaction Staging Overlay
//!
//! Handlers never write to the backing store directly. All writes go into a
//! [`TxStore`] overlay; reads consult the overlay first so a handler always
//! observes its own effects (including across aliased addresses, e.g. a fee
//! recipient that is also the sender). After the handler returns `Ok`, the
//! runtime drains the overlay into the backing store in one commit wave; on
//! `Err` the overlay is dropped and nothing persists.

use crate::ports::KvStore;
use mtl_types::error::codes;
use mtl_types::LedgerError;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::trace;

/// Write overlay over a read-only view of the backing store.
pub struct TxStore<'a> {
    base: &'a dyn KvStore,
    staged: BTreeMap<String, Vec<u8>>,
}

impl<'a> TxStore<'a> {
    pub fn new(base: &'a dyn KvStore) -> Self {
        Self {
            base,
            staged: BTreeMap::new(),
        }
    }

    /// Read through the overlay.
    pub fn get(&self, key: &str) -> Result<Option<Vec<u8>>, LedgerError> {
        if let Some(v) = self.staged.get(key) {
            return Ok(Some(v.clone()));
        }
        self.base.get(key)
    }

    /// Stage a write. Visible to subsequent `get` calls in this transaction.
    pub fn put(&mut self, key: &str, value: Vec<u8>) {
        trace!(key, bytes = value.len(), "stage write");
        self.staged.insert(key.to_string(), value);
    }

    pub fn exists(&self, key: &str) -> Result<bool, LedgerError> {
        Ok(self.get(key)?.is_some())
    }

    /// Typed read: JSON-decode the stored entity.
    pub fn get_json<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, LedgerError> {
        match self.get(key)? {
            None => Ok(None),
            Some(bytes) => serde_json::from_slice(&bytes).map(Some).map_err(|e| {
                LedgerError::store(codes::DATA_CORRUPT, format!("corrupt entity at {key}: {e}"))
            }),
        }
    }

    /// Typed write: stage the JSON encoding of the entity.
    pub fn put_json<T: Serialize>(&mut self, key: &str, value: &T) -> Result<(), LedgerError> {
        let bytes = serde_json::to_vec(value).map_err(|e| {
            LedgerError::store(codes::STORE_PUT, format!("encode failed for {key}: {e}"))
        })?;
        self.put(key, bytes);
        Ok(())
    }

    /// Read-modify-write of the monotonic token serial counter. The first
    /// token ever registered receives SN 0 (the native token).
    pub fn next_token_sn(&mut self) -> Result<i64, LedgerError> {
        let next = match self.get(crate::keys::TOKEN_MAX_NO)? {
            None => 0,
            Some(bytes) => {
                let text = String::from_utf8(bytes).map_err(|_| {
                    LedgerError::store(codes::DATA_CORRUPT, "corrupt token counter")
                })?;
                text.trim().parse::<i64>().map_err(|_| {
                    LedgerError::store(codes::DATA_CORRUPT, "corrupt token counter")
                })?
            }
        };
        self.put(crate::keys::TOKEN_MAX_NO, (next + 1).to_string().into_bytes());
        Ok(next)
    }

    /// Number of staged writes (used by the runtime for logging).
    pub fn staged_len(&self) -> usize {
        self.staged.len()
    }

    /// Consume the overlay for the commit wave.
    pub fn into_writes(self) -> BTreeMap<String, Vec<u8>> {
        self.staged
    }
}
