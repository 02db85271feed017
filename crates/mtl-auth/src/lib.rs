//! # mtl-auth
//!
//! Authenticated-request discipline for the ledger.
//!
//! Every state-changing operation carries a detached ECDSA signature over a
//! canonical message: the operation's declared fields joined by `|`, with the
//! caller's current nonce (`tkey`) as the trailing component. The signer's
//! public key is the PEM stored in the wallet record; supported curves are
//! P-256, P-384, and P-521 with SHA-512, SHA-384, and SHA-512 digests
//! respectively.
//!
//! On success the wallet's nonce is rotated before any other mutation is
//! staged, so replaying the same signature fails with `1102,nonce error`.
//! Rotation is deterministic (derived from the transaction inputs) so every
//! replica agrees on the next nonce.

pub mod nonce;
pub mod pem;
pub mod verify;

pub use nonce::{check_nonce, derive_nonce};
pub use pem::normalize_pem;
pub use verify::{canonical_message, verify_signature};

use mtl_types::LedgerError;
use mtl_wallet::Wallet;
use tracing::debug;

/// Full authentication step for a handler: nonce check, signature
/// verification over `parts + [tkey]`, then nonce rotation on the wallet.
/// The caller stages the wallet afterwards; nothing persists on error.
pub fn authenticate(
    wallet: &mut Wallet,
    parts: &[&str],
    signature_b64: &str,
    tkey: &str,
    job_date: i64,
) -> Result<(), LedgerError> {
    check_nonce(&wallet.nonce, tkey, job_date)?;
    let mut fields: Vec<&str> = parts.to_vec();
    fields.push(tkey);
    let message = canonical_message(&fields);
    verify_signature(&wallet.public_key, &message, signature_b64)?;
    wallet.nonce = derive_nonce(&wallet.id, job_date, signature_b64);
    debug!(wallet = %wallet.id, "authenticated; nonce rotated");
    Ok(())
}
