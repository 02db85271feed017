//! # Wallet Addresses and Derived Identifiers
//!
//! A wallet address is 40 characters: the literal `MT`, 30 alphanumerics,
//! and the CRC32/IEEE of those 30 characters as 8 lowercase hex digits.
//!
//! Identifier generation must be deterministic across replicas, so the
//! "random" middle section is derived from transaction inputs via SHA-256
//! rather than an OS RNG. Market/item keys (`MRC040_…`, `DEX402_…`) use the
//! same derivation, truncated to the fixed 40-character key width.

use crate::error::{codes, LedgerError};
use sha2::{Digest, Sha256};

/// Total address/key width used throughout the store.
pub const ADDRESS_LEN: usize = 40;

/// Structural + checksum validation of a wallet address.
pub fn is_address(s: &str) -> bool {
    if s.len() != ADDRESS_LEN || !s.starts_with("MT") {
        return false;
    }
    let body = &s[2..32];
    let crc = &s[32..40];
    if !body.bytes().all(|b| b.is_ascii_alphanumeric()) {
        return false;
    }
    if !crc.bytes().all(|b| b.is_ascii_hexdigit() && !b.is_ascii_uppercase()) {
        return false;
    }
    format!("{:08x}", crc32fast::hash(body.as_bytes())) == crc
}

/// [`is_address`] as a `Result`, yielding `3001,invalid address …`.
pub fn check_address(s: &str) -> Result<(), LedgerError> {
    if is_address(s) {
        Ok(())
    } else {
        Err(LedgerError::invalid_address(s))
    }
}

/// Derive a fresh wallet address from transaction inputs. The same inputs
/// always produce the same address on every replica.
pub fn derive_address(parts: &[&str]) -> String {
    let body = derive_hex(parts, 30);
    let crc = format!("{:08x}", crc32fast::hash(body.as_bytes()));
    format!("MT{body}{crc}")
}

/// Derive a fixed-width store key `<prefix><hex>` of [`ADDRESS_LEN`] chars
/// (or longer prefixed widths, e.g. MRC401's 81-character composite ids are
/// built by the caller from a project id and an item id).
pub fn derive_id(prefix: &str, parts: &[&str]) -> Result<String, LedgerError> {
    if prefix.len() >= ADDRESS_LEN {
        return Err(LedgerError::internal(
            codes::INTERNAL,
            format!("id prefix too long: {prefix}"),
        ));
    }
    let body = derive_hex(parts, ADDRESS_LEN - prefix.len());
    Ok(format!("{prefix}{body}"))
}

fn derive_hex(parts: &[&str], len: usize) -> String {
    let mut hasher = Sha256::new();
    for (i, part) in parts.iter().enumerate() {
        if i > 0 {
            hasher.update(b"|");
        }
        hasher.update(part.as_bytes());
    }
    let digest = hasher.finalize();
    let mut out = hex::encode(digest);
    // 64 hex chars cover every width used here (max 38).
    out.truncate(len);
    out
}
