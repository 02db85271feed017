//! Operation handlers. Each handler validates its positional arguments,
//! authenticates the caller, and composes the domain crates; the runtime
//! owns the commit.

pub mod dex;
pub mod nft;
pub mod sft;
pub mod token;
pub mod wallet;

use crate::HandlerReply;
use mtl_store::TxStore;
use mtl_types::error::codes;
use mtl_types::LedgerError;
use mtl_wallet::repo as wallet_repo;
use serde::de::DeserializeOwned;

/// Route one operation to its handler.
pub fn dispatch(
    tx: &mut TxStore,
    op: &str,
    args: &[String],
    now: i64,
) -> Result<HandlerReply, LedgerError> {
    match op {
        "NewWallet" => wallet::new_wallet(tx, args, now),
        "BalanceOf" => wallet::balance_of(tx, args),
        "GetNonce" => wallet::get_nonce(tx, args),
        "Transfer" => wallet::transfer(tx, args, now),
        "MultiTransfer" => wallet::multi_transfer(tx, args, now),
        "Exchange" => wallet::exchange(tx, args, now),

        "TokenRegister" => token::register(tx, args, now),
        "TokenUpdate" => token::update(tx, args, now),
        "TokenBurning" => token::burning(tx, args, now),
        "TokenIncrease" => token::increase(tx, args, now),
        "TokenSetBase" => token::set_base(tx, args, now),
        "TokenAddTarget" => token::add_target(tx, args, now),
        "TokenRemoveTarget" => token::remove_target(tx, args, now),
        "TokenAddLogger" => token::add_logger(tx, args, now),
        "TokenRemoveLogger" => token::remove_logger(tx, args, now),
        "GetToken" => token::get(tx, args),

        "StodexRegister" => dex::register(tx, args, now),
        "StodexUnRegister" => dex::unregister(tx, args, now),
        "StodexExchange" => dex::exchange(tx, args, now),

        "Mrc400Create" => nft::project_create(tx, args, now),
        "Mrc400Update" => nft::project_update(tx, args, now),
        "GetMRC400" => nft::project_get(tx, args),
        "Mrc401Create" => nft::item_create(tx, args, now),
        "Mrc401Update" => nft::item_update(tx, args, now),
        "Mrc401Transfer" => nft::item_transfer(tx, args, now),
        "Mrc401Sell" => nft::sell(tx, args, now),
        "Mrc401UnSell" => nft::unsell(tx, args, now),
        "Mrc401Buy" => nft::buy(tx, args, now),
        "Mrc401Melt" => nft::melt(tx, args, now),
        "Mrc401Auction" => nft::auction(tx, args, now),
        "Mrc401UnAuction" => nft::unauction(tx, args, now),
        "Mrc401AuctionBid" => nft::auction_bid(tx, args, now),
        "Mrc401AuctionFinish" => nft::auction_finish(tx, args, now),
        "GetMRC401" => nft::item_get(tx, args),

        "Mrc402Create" => sft::create(tx, args, now),
        "Mrc402Update" => sft::update(tx, args, now),
        "Mrc402Mint" => sft::mint(tx, args, now),
        "Mrc402Burn" => sft::burn(tx, args, now),
        "Mrc402Melt" => sft::melt(tx, args, now),
        "Mrc402Transfer" => sft::transfer(tx, args, now),
        "Mrc402Sell" => sft::sell(tx, args, now),
        "Mrc402UnSell" => sft::unsell(tx, args, now),
        "Mrc402Buy" => sft::buy(tx, args, now),
        "Mrc402Auction" => sft::auction(tx, args, now),
        "Mrc402UnAuction" => sft::unauction(tx, args, now),
        "Mrc402AuctionBid" => sft::auction_bid(tx, args, now),
        "Mrc402AuctionFinish" => sft::auction_finish(tx, args, now),
        "GetMRC402" => sft::get(tx, args),
        "GetDEX402" => sft::market_get(tx, args),

        _ => Err(LedgerError::validation(
            codes::BAD_PARAMETER,
            format!("unknown operation {op}"),
        )),
    }
}

/// Authenticate `address` over the operation's declared fields, then record
/// the job on the wallet. Stages the rotated nonce.
pub(crate) fn auth(
    tx: &mut TxStore,
    op: &str,
    address: &str,
    parts: &[&str],
    sign: &str,
    tkey: &str,
    now: i64,
) -> Result<(), LedgerError> {
    let mut wallet = wallet_repo::load(tx, address)?;
    mtl_auth::authenticate(&mut wallet, parts, sign, tkey, now)?;
    wallet.record_job(op, &parts.join("|"), now);
    wallet_repo::save(tx, &wallet)
}

pub(crate) fn parse_json<T: DeserializeOwned>(name: &str, s: &str) -> Result<T, LedgerError> {
    serde_json::from_str(s).map_err(|err| {
        LedgerError::validation(codes::BAD_PARAMETER, format!("malformed {name} json: {err}"))
    })
}

/// Stored JSON for the read-only queries, returned byte for byte.
pub(crate) fn stored_json(tx: &TxStore, key: &str, what: &str) -> Result<String, LedgerError> {
    match tx.get(key)? {
        Some(bytes) => String::from_utf8(bytes).map_err(|_| {
            LedgerError::store(codes::DATA_CORRUPT, format!("corrupt record at {key}"))
        }),
        None => Err(LedgerError::not_found(what)),
    }
}
