//! PEM normalization. Clients send public keys in three shapes: proper PEM,
//! single-line PEM with the newlines stripped, and a raw base64 SPKI body.
//! All three are normalized to canonical PEM (64-column base64 between the
//! `PUBLIC KEY` header and footer) before key parsing.

use mtl_types::error::codes;
use mtl_types::LedgerError;

const HEADER: &str = "-----BEGIN PUBLIC KEY-----";
const FOOTER: &str = "-----END PUBLIC KEY-----";

fn is_base64_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '+' || c == '/' || c == '='
}

/// Normalize any accepted public-key shape to canonical PEM.
pub fn normalize_pem(input: &str) -> Result<String, LedgerError> {
    let mut body = input.trim();
    if let Some(rest) = body.strip_prefix(HEADER).or_else(|| {
        body.find(HEADER)
            .map(|i| &body[i + HEADER.len()..])
    }) {
        body = rest;
    }
    if let Some(i) = body.find(FOOTER) {
        body = &body[..i];
    }
    let compact: String = body.chars().filter(|c| !c.is_whitespace()).collect();
    if compact.is_empty() || !compact.chars().all(is_base64_char) {
        return Err(LedgerError::validation(
            codes::PUBLIC_KEY_INVALID,
            "malformed public key",
        ));
    }
    let mut out = String::with_capacity(compact.len() + 64);
    out.push_str(HEADER);
    out.push('\n');
    for chunk in compact.as_bytes().chunks(64) {
        // chunks of an ASCII string stay valid UTF-8
        out.push_str(std::str::from_utf8(chunk).expect("ascii base64"));
        out.push('\n');
    }
    out.push_str(FOOTER);
    out.push('\n');
    Ok(out)
}
