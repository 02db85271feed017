//! # Error Taxonomy
//!
//! Every failure surfaced by the ledger is a `LedgerError`. The wire format
//! is `"<code>,<human message>"`; the numeric prefix groups errors:
//!
//! | Range | Meaning |
//! |-------|---------|
//! | 1xxx  | validation (malformed input, bad nonce) |
//! | 2xxx  | crypto (signature, key parsing) |
//! | 3xxx  | addresses / data |
//! | 4xxx  | object state / authorization |
//! | 5xxx  | insufficient balance |
//! | 6xxx  | existence / market |
//! | 8xxx  | store |
//! | 9xxx  | generic |
//!
//! A handler either succeeds or returns exactly one `LedgerError`; all writes
//! staged inside the transaction are discarded on error.

use thiserror::Error;

/// Well-known error codes. Codes named in the compatibility contract are
/// pinned; the rest are assigned within their group.
pub mod codes {
    // 1xxx validation
    pub const INVALID_NUMBER: u16 = 1101;
    pub const NONCE_ERROR: u16 = 1102;
    pub const DECIMAL_RANGE: u16 = 1103;
    pub const AMOUNT_OVERFLOW: u16 = 1104;
    pub const BAD_PARAMETER: u16 = 1201;
    pub const PARAMETER_COUNT: u16 = 1202;
    pub const PRICE_PRECISION: u16 = 1203;
    pub const STRING_LENGTH: u16 = 1204;
    pub const BAD_URL: u16 = 1205;

    // 2xxx crypto
    pub const SIGNATURE_INVALID: u16 = 2010;
    pub const PUBLIC_KEY_INVALID: u16 = 2020;
    pub const CURVE_UNSUPPORTED: u16 = 2030;

    // 3xxx addresses / data
    pub const INVALID_ADDRESS: u16 = 3001;
    pub const DATA_NOT_FOUND: u16 = 3002;
    pub const DATA_CORRUPT: u16 = 3003;
    pub const ALREADY_MELTED: u16 = 3004;
    pub const ALREADY_EXISTS: u16 = 3005;

    // 4xxx object state / authorization
    pub const NOT_PERMITTED: u16 = 4100;
    pub const WRONG_STATE: u16 = 4201;
    pub const ALREADY_CANCELED: u16 = 4202;
    pub const ITEM_MELTED: u16 = 4203;
    pub const ALREADY_SOLD: u16 = 4204;
    pub const PAIR_NOT_ALLOWED: u16 = 4205;
    pub const AUCTION_CLOSED: u16 = 4206;
    pub const AUCTION_OPEN: u16 = 4207;

    // 5xxx insufficient balance
    pub const NOT_ENOUGH_BALANCE: u16 = 5000;
    pub const NOT_ENOUGH_PENDING: u16 = 5001;
    pub const SUPPLY_UNDERFLOW: u16 = 5002;

    // 6xxx existence / market
    pub const NOT_FOUND: u16 = 6005;
    pub const DUPLICATE_KEY: u16 = 6100;

    // 8xxx store
    pub const STORE_GET: u16 = 8100;
    pub const STORE_PUT: u16 = 8200;

    // 9xxx generic
    pub const INTERNAL: u16 = 9900;
}

/// Categorized ledger error. Each variant carries the wire code and message;
/// the variant itself records the taxonomy kind for matching in handlers and
/// tests.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    /// Malformed input: non-integer, out-of-range, bad address, bad PEM.
    #[error("{code},{message}")]
    Validation { code: u16, message: String },

    /// Nonce mismatch, signature invalid, wrong signer.
    #[error("{code},{message}")]
    Authentication { code: u16, message: String },

    /// Caller is not the owner / logger / creator.
    #[error("{code},{message}")]
    Authorization { code: u16, message: String },

    /// Object is in the wrong state for the operation.
    #[error("{code},{message}")]
    Precondition { code: u16, message: String },

    /// Insufficient balance, pending, or supply.
    #[error("{code},{message}")]
    Resource { code: u16, message: String },

    /// Object not found or duplicate key.
    #[error("{code},{message}")]
    Existence { code: u16, message: String },

    /// Low-level store read/write failure.
    #[error("{code},{message}")]
    Store { code: u16, message: String },

    /// Anything that should never happen.
    #[error("{code},{message}")]
    Internal { code: u16, message: String },
}

impl LedgerError {
    pub fn validation(code: u16, message: impl Into<String>) -> Self {
        Self::Validation { code, message: message.into() }
    }

    pub fn authentication(code: u16, message: impl Into<String>) -> Self {
        Self::Authentication { code, message: message.into() }
    }

    pub fn authorization(code: u16, message: impl Into<String>) -> Self {
        Self::Authorization { code, message: message.into() }
    }

    pub fn precondition(code: u16, message: impl Into<String>) -> Self {
        Self::Precondition { code, message: message.into() }
    }

    pub fn resource(code: u16, message: impl Into<String>) -> Self {
        Self::Resource { code, message: message.into() }
    }

    pub fn existence(code: u16, message: impl Into<String>) -> Self {
        Self::Existence { code, message: message.into() }
    }

    pub fn store(code: u16, message: impl Into<String>) -> Self {
        Self::Store { code, message: message.into() }
    }

    pub fn internal(code: u16, message: impl Into<String>) -> Self {
        Self::Internal { code, message: message.into() }
    }

    /// The numeric wire code.
    pub fn code(&self) -> u16 {
        match self {
            Self::Validation { code, .. }
            | Self::Authentication { code, .. }
            | Self::Authorization { code, .. }
            | Self::Precondition { code, .. }
            | Self::Resource { code, .. }
            | Self::Existence { code, .. }
            | Self::Store { code, .. }
            | Self::Internal { code, .. } => *code,
        }
    }

    // --- pinned constructors ------------------------------------------------

    /// `1102,nonce error` — tkey does not match the stored nonce.
    pub fn nonce_error() -> Self {
        Self::authentication(codes::NONCE_ERROR, "nonce error")
    }

    /// `5000,Not enough balance`.
    pub fn not_enough_balance() -> Self {
        Self::resource(codes::NOT_ENOUGH_BALANCE, "Not enough balance")
    }

    /// `1203,Price precision is too long`.
    pub fn price_precision() -> Self {
        Self::validation(codes::PRICE_PRECISION, "Price precision is too long")
    }

    /// `4203,already melted` — terminal MRC401 state.
    pub fn already_melted() -> Self {
        Self::precondition(codes::ITEM_MELTED, "already melted")
    }

    /// `3001,invalid address`.
    pub fn invalid_address(addr: &str) -> Self {
        Self::validation(codes::INVALID_ADDRESS, format!("invalid address {addr}"))
    }

    /// `4100,not permitted` — caller lacks ownership of the object.
    pub fn not_permitted(what: &str) -> Self {
        Self::authorization(codes::NOT_PERMITTED, format!("{what} not permitted"))
    }

    /// `6005,<what> not found`.
    pub fn not_found(what: &str) -> Self {
        Self::existence(codes::NOT_FOUND, format!("{what} not found"))
    }
}
