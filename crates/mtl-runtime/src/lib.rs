//! # mtl-runtime
//!
//! Operation dispatch and the transaction boundary of the ledger.
//!
//! [`Runtime::invoke`] is the single entry point the orchestrator calls. Each
//! invocation opens a staging overlay over the backing store, runs one
//! handler, and writes the staged entries back only when the handler
//! succeeds. Any error drops the overlay, so a rejected operation leaves no
//! trace at all — not even the caller's nonce rotation.
//!
//! One deliberate exception: a DEX fill against a pair whose listing was
//! retracted cancels the item, refunds its escrow, and still reports the pair
//! error to the caller. The handler signals this with
//! [`HandlerReply::commit_error`]; the staged writes commit, then the error
//! surfaces.

pub mod handlers;

use mtl_store::{KvStore, TxStore};
use mtl_types::LedgerError;
use tracing::{debug, info, warn};

/// Handler result: a reply value for the caller plus an optional error to
/// surface after the staged writes commit.
#[derive(Debug)]
pub struct HandlerReply {
    pub value: String,
    pub commit_error: Option<LedgerError>,
}

impl HandlerReply {
    pub fn ok(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            commit_error: None,
        }
    }

    pub fn empty() -> Self {
        Self::ok("")
    }
}

/// The ledger state machine over a backing store.
pub struct Runtime<S: KvStore> {
    store: S,
}

impl<S: KvStore> Runtime<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// The backing store, for host shutdown or test inspection.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Run one operation. `now` is the orchestrator's transaction timestamp;
    /// no handler reads a clock of its own.
    pub fn invoke(&mut self, op: &str, args: &[String], now: i64) -> Result<String, LedgerError> {
        debug!(op, argc = args.len(), "invoke");
        let mut tx = TxStore::new(&self.store);
        let reply = match handlers::dispatch(&mut tx, op, args, now) {
            Ok(reply) => reply,
            Err(err) => {
                warn!(op, %err, "rejected");
                return Err(err);
            }
        };
        let writes = tx.into_writes();
        let staged = writes.len();
        for (key, value) in writes {
            self.store.put(&key, value)?;
        }
        match reply.commit_error {
            Some(err) => {
                warn!(op, staged, %err, "committed with error reply");
                Err(err)
            }
            None => {
                info!(op, staged, "committed");
                Ok(reply.value)
            }
        }
    }
}
