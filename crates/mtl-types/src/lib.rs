//! # mtl-types
//!
//! Shared primitives for the MT Ledger core.
//!
//! ## Contents
//!
//! - **Address**: 40-character wallet identifiers (`MT` + 30 alphanumerics +
//!   8-hex CRC32) with checksum validation and deterministic derivation
//! - **Amount**: exact non-negative integer arithmetic over canonical base-10
//!   strings, backed by `U256` with checked operations
//! - **FeeRate**: commission percentages with 4 decimal places of precision,
//!   floor-truncated when applied
//! - **LedgerError**: the wire error taxonomy; `Display` is always
//!   `"<code>,<message>"` so consumers can parse the numeric prefix
//!
//! Every value here is deterministic: no clocks, no randomness, no
//! platform-dependent iteration order.

pub mod address;
pub mod amount;
pub mod error;
pub mod fee;
pub mod validate;

pub use address::{check_address, derive_address, derive_id, is_address};
pub use amount::Amount;
pub use error::LedgerError;
pub use fee::FeeRate;
