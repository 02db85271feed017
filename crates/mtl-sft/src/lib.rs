//! # mtl-sft
//!
//! MRC402 multi-edition (semi-fungible) tokens and their DEX402 market.
//!
//! Unlike MRC401 items, MRC402 holdings live in wallets as three-compartment
//! sub-balances (`free`/`onSale`/`onAuction`); listing moves units between
//! compartments and trades move them between wallets. Every unit is backed
//! by the per-unit `initialreserve` escrowed at creation, returned on burn
//! or melt.
//!
//! A DEX402 item has no stored status field. Its state is derived from its
//! timestamps and remaining amount (see [`entities::Dex402::status`]), so a
//! waiting auction becomes live and a live auction becomes settleable purely
//! by the passage of `now`.
//!
//! Settlement money is routed through a single payment reducer that
//! aggregates creator, platform, and shareholder commissions per address
//! before any wallet is touched; the floor residue of every split stays
//! with the seller.

pub mod entities;
pub mod market;
pub mod token;

pub use entities::{Dex402, Dex402Status, Mrc402};
