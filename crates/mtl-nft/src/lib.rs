//! # mtl-nft
//!
//! MRC400 NFT projects and their MRC401 single-edition items.
//!
//! A project is the namespace and policy record: it names the token items
//! trade in (`allowtoken`) and its owner is the creator who collects melting
//! and sale fees. An item is one indivisible collectible whose ownership
//! lives in the item record itself; wallets are only touched when money
//! moves.
//!
//! An item is always in exactly one of: idle, on sale (`selldate > 0`), in
//! auction (`auctiondate > 0`), or melted (`owner == "MELTED"`, terminal).
//! Melting pays the item's `initialreserve` back out, split between the
//! creator (melting fee) and the final owner.

pub mod entities;
pub mod market;
pub mod project;

pub use entities::{Mrc400, Mrc401, Transferable, MELTED_OWNER};
