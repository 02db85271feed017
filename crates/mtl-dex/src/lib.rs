//! # mtl-dex
//!
//! Fungible-pair DEX (MRC040). An item is an order-like offer pinned to a
//! declared base/target pair:
//!
//! - `SELL`: the owner escrows `qtt` of the target token and asks `price`
//!   (smallest base units per whole target unit) for it.
//! - `BUY`: the owner escrows `price × qtt / 10^target.decimal` of the base
//!   token and asks for `qtt` of the target.
//!
//! Escrow is held in the owner wallet's `pending` compartment, so the
//! spendable balance shrinks at registration and the conservation invariant
//! keeps holding. Exchanges may partially fill; cancel refunds whatever
//! escrow remains. If the pair declaration was retracted after registration,
//! the next exchange attempt auto-cancels the item — that cancellation is
//! committed even though the exchange itself reports the pair error.

pub mod entities;
pub mod market;

pub use entities::{ExchangeResult, Mrc040, Side, Status};
pub use market::ExchangeOutcome;
