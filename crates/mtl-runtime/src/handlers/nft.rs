//! MRC400 project and MRC401 item handlers. The signer is derived from the
//! stored records: project operations need the project owner, item
//! operations the item owner, except that `Bound` items transfer on the
//! project owner's signature.

use super::{auth, parse_json, stored_json};
use crate::HandlerReply;
use mtl_nft::project::{self, ItemParams, ItemUpdateParams, ProjectParams, ProjectUpdateParams};
use mtl_nft::{market, Transferable};
use mtl_store::{keys, TxStore};
use mtl_types::error::codes;
use mtl_types::validate::{check_arg_count, parse_not_negative_i64};
use mtl_types::{Amount, LedgerError};

pub fn project_create(
    tx: &mut TxStore,
    args: &[String],
    now: i64,
) -> Result<HandlerReply, LedgerError> {
    check_arg_count("Mrc400Create", args, 3)?;
    let params: ProjectParams = parse_json("project", &args[0])?;
    let owner = params.owner.clone();
    auth(tx, "Mrc400Create", &owner, &[&args[0]], &args[1], &args[2], now)?;
    let id = project::create_project(tx, params, &args[1], now)?;
    Ok(HandlerReply::ok(id))
}

pub fn project_update(
    tx: &mut TxStore,
    args: &[String],
    now: i64,
) -> Result<HandlerReply, LedgerError> {
    check_arg_count("Mrc400Update", args, 4)?;
    let params: ProjectUpdateParams = parse_json("project", &args[1])?;
    let owner = project::get_project(tx, &args[0])?.owner;
    auth(tx, "Mrc400Update", &owner, &[&args[0], &args[1]], &args[2], &args[3], now)?;
    project::update_project(tx, &args[0], &owner, params)?;
    Ok(HandlerReply::empty())
}

pub fn project_get(tx: &TxStore, args: &[String]) -> Result<HandlerReply, LedgerError> {
    check_arg_count("GetMRC400", args, 1)?;
    keys::check_prefixed_key("mrc400", keys::MRC400_PREFIX, &args[0])?;
    let json = stored_json(tx, &args[0], &format!("mrc400 {}", args[0]))?;
    Ok(HandlerReply::ok(json))
}

pub fn item_create(tx: &mut TxStore, args: &[String], now: i64) -> Result<HandlerReply, LedgerError> {
    check_arg_count("Mrc401Create", args, 4)?;
    let items: Vec<ItemParams> = parse_json("item list", &args[1])?;
    let owner = project::get_project(tx, &args[0])?.owner;
    auth(tx, "Mrc401Create", &owner, &[&args[0], &args[1]], &args[2], &args[3], now)?;
    let ids = project::create_items(tx, &args[0], &owner, items, now)?;
    let json = serde_json::to_string(&ids).map_err(|err| {
        LedgerError::internal(codes::INTERNAL, format!("item id encode: {err}"))
    })?;
    Ok(HandlerReply::ok(json))
}

pub fn item_update(tx: &mut TxStore, args: &[String], now: i64) -> Result<HandlerReply, LedgerError> {
    check_arg_count("Mrc401Update", args, 4)?;
    let params: ItemUpdateParams = parse_json("item", &args[1])?;
    let item = project::get_item(tx, &args[0])?;
    let owner = project::get_project(tx, &item.mrc400)?.owner;
    auth(tx, "Mrc401Update", &owner, &[&args[0], &args[1]], &args[2], &args[3], now)?;
    project::update_item(tx, &args[0], &owner, params)?;
    Ok(HandlerReply::empty())
}

pub fn item_transfer(
    tx: &mut TxStore,
    args: &[String],
    now: i64,
) -> Result<HandlerReply, LedgerError> {
    check_arg_count("Mrc401Transfer", args, 4)?;
    let item = project::get_item(tx, &args[1])?;
    let signer = match item.transferable {
        Transferable::Bound => project::get_project(tx, &item.mrc400)?.owner,
        Transferable::Permanent | Transferable::Temprary => item.owner.clone(),
    };
    auth(tx, "Mrc401Transfer", &signer, &[&args[0], &args[1]], &args[2], &args[3], now)?;
    project::transfer(tx, &signer, &args[0], &args[1])?;
    Ok(HandlerReply::empty())
}

pub fn sell(tx: &mut TxStore, args: &[String], now: i64) -> Result<HandlerReply, LedgerError> {
    check_arg_count("Mrc401Sell", args, 6)?;
    let seller = &args[0];
    let price = Amount::parse(&args[2])?;
    let token = parse_not_negative_i64("token", &args[3])?;
    auth(
        tx,
        "Mrc401Sell",
        seller,
        &[seller, &args[1], &args[2], &args[3]],
        &args[4],
        &args[5],
        now,
    )?;
    market::sell(tx, seller, &args[1], &price, token, now)?;
    Ok(HandlerReply::empty())
}

pub fn unsell(tx: &mut TxStore, args: &[String], now: i64) -> Result<HandlerReply, LedgerError> {
    check_arg_count("Mrc401UnSell", args, 4)?;
    let seller = &args[0];
    auth(tx, "Mrc401UnSell", seller, &[seller, &args[1]], &args[2], &args[3], now)?;
    market::unsell(tx, seller, &args[1])?;
    Ok(HandlerReply::empty())
}

pub fn buy(tx: &mut TxStore, args: &[String], now: i64) -> Result<HandlerReply, LedgerError> {
    check_arg_count("Mrc401Buy", args, 4)?;
    let buyer = &args[0];
    auth(tx, "Mrc401Buy", buyer, &[buyer, &args[1]], &args[2], &args[3], now)?;
    market::buy(tx, buyer, &args[1], now)?;
    Ok(HandlerReply::empty())
}

pub fn melt(tx: &mut TxStore, args: &[String], now: i64) -> Result<HandlerReply, LedgerError> {
    check_arg_count("Mrc401Melt", args, 3)?;
    let item = project::get_item(tx, &args[0])?;
    if item.is_melted() {
        return Err(LedgerError::already_melted());
    }
    auth(tx, "Mrc401Melt", &item.owner, &[&args[0]], &args[1], &args[2], now)?;
    project::melt(tx, &item.owner, &args[0], now)?;
    Ok(HandlerReply::empty())
}

pub fn auction(tx: &mut TxStore, args: &[String], now: i64) -> Result<HandlerReply, LedgerError> {
    check_arg_count("Mrc401Auction", args, 9)?;
    let seller = &args[0];
    let start_price = Amount::parse(&args[2])?;
    let buynow_price = Amount::parse(&args[3])?;
    let bidding_unit = Amount::parse(&args[4])?;
    let token = parse_not_negative_i64("token", &args[5])?;
    let end_date = parse_not_negative_i64("endDate", &args[6])?;
    auth(
        tx,
        "Mrc401Auction",
        seller,
        &[seller, &args[1], &args[2], &args[3], &args[4], &args[5], &args[6]],
        &args[7],
        &args[8],
        now,
    )?;
    market::auction(
        tx,
        seller,
        &args[1],
        &start_price,
        &buynow_price,
        &bidding_unit,
        token,
        end_date,
        now,
    )?;
    Ok(HandlerReply::empty())
}

pub fn unauction(tx: &mut TxStore, args: &[String], now: i64) -> Result<HandlerReply, LedgerError> {
    check_arg_count("Mrc401UnAuction", args, 4)?;
    let seller = &args[0];
    auth(tx, "Mrc401UnAuction", seller, &[seller, &args[1]], &args[2], &args[3], now)?;
    market::unauction(tx, seller, &args[1])?;
    Ok(HandlerReply::empty())
}

pub fn auction_bid(tx: &mut TxStore, args: &[String], now: i64) -> Result<HandlerReply, LedgerError> {
    check_arg_count("Mrc401AuctionBid", args, 6)?;
    let buyer = &args[0];
    let amount = Amount::parse_positive(&args[2])?;
    let token = parse_not_negative_i64("token", &args[3])?;
    auth(
        tx,
        "Mrc401AuctionBid",
        buyer,
        &[buyer, &args[1], &args[2], &args[3]],
        &args[4],
        &args[5],
        now,
    )?;
    market::bid(tx, buyer, &args[1], &amount, token, now)?;
    Ok(HandlerReply::empty())
}

/// Unauthenticated: anyone may settle a lapsed auction.
pub fn auction_finish(
    tx: &mut TxStore,
    args: &[String],
    now: i64,
) -> Result<HandlerReply, LedgerError> {
    check_arg_count("Mrc401AuctionFinish", args, 1)?;
    market::finish(tx, &args[0], now)?;
    Ok(HandlerReply::empty())
}

pub fn item_get(tx: &TxStore, args: &[String]) -> Result<HandlerReply, LedgerError> {
    check_arg_count("GetMRC401", args, 1)?;
    keys::check_mrc401_key(&args[0])?;
    let json = stored_json(tx, &args[0], &format!("mrc401 {}", args[0]))?;
    Ok(HandlerReply::ok(json))
}
