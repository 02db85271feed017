//! # ECDSA Verification (NIST P-curves)
//!
//! Signatures are ASN.1 DER `SEQUENCE { R INTEGER, S INTEGER }`, base64 on
//! the wire. The public key is a PKIX SPKI in PEM; the curve is taken from
//! the key itself. Digest selection follows the wallet client convention:
//! SHA-384 for P-384, SHA-512 for P-256 and P-521 (the digest is truncated
//! to the scalar width by the verifier where it exceeds it).

use crate::pem::normalize_pem;
use base64::Engine;
use ecdsa::elliptic_curve::pkcs8::DecodePublicKey;
use ecdsa::signature::hazmat::PrehashVerifier;
use mtl_types::error::codes;
use mtl_types::LedgerError;
use sha2::{Digest, Sha384, Sha512};
use tracing::debug;

/// Pipe-join of the declared fields; the trailing field is always the
/// caller's `tkey`.
pub fn canonical_message(parts: &[&str]) -> String {
    parts.join("|")
}

fn sig_error() -> LedgerError {
    LedgerError::authentication(codes::SIGNATURE_INVALID, "signature verify failed")
}

/// Verify `signature_b64` over `message` with the PEM public key.
pub fn verify_signature(
    public_key_pem: &str,
    message: &str,
    signature_b64: &str,
) -> Result<(), LedgerError> {
    let pem = normalize_pem(public_key_pem)?;
    let der = base64::engine::general_purpose::STANDARD
        .decode(signature_b64.trim())
        .map_err(|_| sig_error())?;

    if let Ok(vk) = p256::ecdsa::VerifyingKey::from_public_key_pem(&pem) {
        let sig = p256::ecdsa::Signature::from_der(&der).map_err(|_| sig_error())?;
        let digest = Sha512::digest(message.as_bytes());
        debug!(curve = "P-256", "verifying signature");
        return vk.verify_prehash(&digest, &sig).map_err(|_| sig_error());
    }
    if let Ok(vk) = p384::ecdsa::VerifyingKey::from_public_key_pem(&pem) {
        let sig = p384::ecdsa::Signature::from_der(&der).map_err(|_| sig_error())?;
        let digest = Sha384::digest(message.as_bytes());
        debug!(curve = "P-384", "verifying signature");
        return vk.verify_prehash(&digest, &sig).map_err(|_| sig_error());
    }
    if let Ok(vk) = ecdsa::VerifyingKey::<p521::NistP521>::from_public_key_pem(&pem) {
        let sig = p521::ecdsa::Signature::from_der(&der).map_err(|_| sig_error())?;
        let digest = Sha512::digest(message.as_bytes());
        debug!(curve = "P-521", "verifying signature");
        return vk.verify_prehash(&digest, &sig).map_err(|_| sig_error());
    }

    Err(LedgerError::authentication(
        codes::CURVE_UNSUPPORTED,
        "unsupported public key",
    ))
}
