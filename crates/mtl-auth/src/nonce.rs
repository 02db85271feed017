//! # Nonce Protocol
//!
//! Each wallet stores a 40-character opaque nonce. A state-changing request
//! supplies the current nonce as `tkey` (legacy wallets with an empty stored
//! nonce supply the transaction's `jobDate` in base 10 instead). After a
//! successful verification the nonce is rotated, so the same signature can
//! never authorize a second transaction.
//!
//! Rotation must be replica-deterministic: the next nonce is the first 40
//! hex characters of SHA-256 over `address|jobDate|signature`. All three
//! inputs are fixed by the transaction, and the signature itself is
//! unforgeable before the transaction exists.

use mtl_types::LedgerError;
use sha2::{Digest, Sha256};

pub const NONCE_LEN: usize = 40;

/// Compare the supplied `tkey` against the stored nonce (or the legacy
/// `jobDate` form); `1102,nonce error` on mismatch.
pub fn check_nonce(stored: &str, tkey: &str, job_date: i64) -> Result<(), LedgerError> {
    let expected_legacy;
    let expected = if stored.is_empty() {
        expected_legacy = job_date.to_string();
        expected_legacy.as_str()
    } else {
        stored
    };
    if tkey != expected {
        return Err(LedgerError::nonce_error());
    }
    Ok(())
}

/// Deterministic next nonce.
pub fn derive_nonce(address: &str, job_date: i64, signature_b64: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(address.as_bytes());
    hasher.update(b"|");
    hasher.update(job_date.to_string().as_bytes());
    hasher.update(b"|");
    hasher.update(signature_b64.as_bytes());
    let mut out = hex::encode(hasher.finalize());
    out.truncate(NONCE_LEN);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stored_nonce_must_match() {
        assert!(check_nonce("abc", "abc", 7).is_ok());
        let err = check_nonce("abc", "xyz", 7).unwrap_err();
        assert_eq!(err.to_string(), "1102,nonce error");
        // jobDate is not accepted once a nonce is stored
        assert!(check_nonce("abc", "7", 7).is_err());
    }

    #[test]
    fn test_legacy_wallet_accepts_job_date() {
        assert!(check_nonce("", "1700000000", 1700000000).is_ok());
        assert!(check_nonce("", "1700000001", 1700000000).is_err());
    }

    #[test]
    fn test_derived_nonce_shape_and_determinism() {
        let a = derive_nonce("MTx", 100, "sigsig");
        let b = derive_nonce("MTx", 100, "sigsig");
        let c = derive_nonce("MTx", 101, "sigsig");
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.len(), NONCE_LEN);
        assert!(a.bytes().all(|ch| ch.is_ascii_alphanumeric()));
    }
}
