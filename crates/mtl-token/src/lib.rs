//! # mtl-token
//!
//! MRC010 fungible token registry.
//!
//! Tokens are identified by a monotonically increasing serial number taken
//! from the store's `TOKEN_MAX_NO` counter inside the registering
//! transaction (the very first registration is the native token, SN 0).
//! Supply accounting obeys global conservation: `totalsupply - burntamount`
//! always equals the sum of wallet balances plus pending escrow across the
//! ledger; `mint` and `burn` are the only operations that move these fields.
//!
//! The registry also owns the DEX pair discipline (`basetoken` /
//! `targettokens`) and the MRC100 logger allow-list.

pub mod entities;
pub mod registry;

pub use entities::{Mrc010, TokenReserve};
pub use registry::{check_pair, get_token, save_token};
