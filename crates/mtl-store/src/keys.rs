//! # Key Scheme
//!
//! | Entity | Key |
//! |--------|-----|
//! | Wallet | the 40-char address itself |
//! | MRC010 | `TOKEN_DATA_<sn>` |
//! | MRC040 | 40-char, prefix `MRC040_` |
//! | MRC400 | 40-char, prefix `MRC400_` |
//! | MRC401 | 81-char `<mrc400id>_<itemid>` |
//! | MRC402 | 40-char, prefix `MRC402_` |
//! | DEX402 | 40-char, prefix `DEX402_` |
//! | token counter | `TOKEN_MAX_NO` |

use mtl_types::error::codes;
use mtl_types::LedgerError;

pub const TOKEN_MAX_NO: &str = "TOKEN_MAX_NO";

pub const MRC040_PREFIX: &str = "MRC040_";
pub const MRC400_PREFIX: &str = "MRC400_";
pub const MRC402_PREFIX: &str = "MRC402_";
pub const DEX402_PREFIX: &str = "DEX402_";

pub fn token_key(sn: i64) -> String {
    format!("TOKEN_DATA_{sn}")
}

/// Validate a 40-char prefixed market/project key.
pub fn check_prefixed_key(name: &str, prefix: &str, id: &str) -> Result<(), LedgerError> {
    if id.len() != 40 || !id.starts_with(prefix) {
        return Err(LedgerError::validation(
            codes::BAD_PARAMETER,
            format!("invalid {name} id: {id}"),
        ));
    }
    Ok(())
}

/// Validate an 81-char MRC401 composite id `<mrc400id>_<itemid>` and return
/// the project id half.
pub fn check_mrc401_key(id: &str) -> Result<&str, LedgerError> {
    let bad = || {
        LedgerError::validation(codes::BAD_PARAMETER, format!("invalid mrc401 id: {id}"))
    };
    if id.len() != 81 || id.as_bytes()[40] != b'_' {
        return Err(bad());
    }
    let project = &id[..40];
    check_prefixed_key("mrc400", MRC400_PREFIX, project).map_err(|_| bad())?;
    Ok(project)
}
