//! # mtl-store
//!
//! Store facade for the MT Ledger core.
//!
//! The host orchestrator supplies an opaque transactional key-value store;
//! this crate wraps it behind the [`KvStore`] port and gives handlers a
//! per-transaction staging overlay ([`TxStore`]) so that every transaction
//! is all-or-nothing: reads see staged writes, and nothing reaches the
//! backing store until the single commit wave after the handler succeeds.
//!
//! Key discipline lives in [`keys`]; values are always the JSON encoding of
//! the entity structure (field spellings are part of the compatibility
//! contract of the entity crates).

pub mod adapters;
pub mod keys;
pub mod ports;
pub mod txstore;

pub use adapters::MemoryStore;
pub use ports::KvStore;
pub use txstore::TxStore;
