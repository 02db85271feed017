//! # mtl-wallet
//!
//! Wallet entity and the balance engine behind every fungible, NFT, and SFT
//! movement in the ledger.
//!
//! ## Balance model
//!
//! A wallet carries four orthogonal ledgers, serialized together under the
//! pinned JSON field names:
//!
//! - `balances` — ordered fungible buckets `(tokenId, amount, unlockDate)`.
//!   Buckets with a future `unlockDate` are frozen; spendable balance is the
//!   sum of unlocked buckets. Zero buckets for non-native tokens are removed
//!   on write; the native bucket (token 0) is retained even at zero.
//! - `pending` — escrow owed to this wallet by its own open DEX items.
//! - `nftBalances` — per-MRC402 sub-balances split `free` / `onSale` /
//!   `onAuction`; an entry with all three zero is removed.
//! - `mrc800Balances` — plain per-token amounts for MRC800 game tokens.
//!
//! All mutation primitives preserve the cleanup invariants; handlers compose
//! them and the staging overlay in `mtl-store` makes the composition atomic.

pub mod balance;
pub mod entities;
pub mod nft;
pub mod repo;

pub use entities::{BalanceBucket, LastJob, NftSubBalance, Wallet};
pub use nft::Compartment;
