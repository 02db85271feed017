//! MRC402 token and DEX402 market handlers. Creator-only operations derive
//! the signer from the stored token; `Mrc402Melt` leads with the holder
//! address because any holder may melt.

use super::{auth, parse_json, stored_json};
use crate::HandlerReply;
use mtl_sft::market;
use mtl_sft::token::{self, CreateParams, UpdateParams};
use mtl_store::{keys, TxStore};
use mtl_types::validate::{check_arg_count, check_string, parse_not_negative_i64};
use mtl_types::{Amount, LedgerError};

pub fn create(tx: &mut TxStore, args: &[String], now: i64) -> Result<HandlerReply, LedgerError> {
    check_arg_count("Mrc402Create", args, 3)?;
    let params: CreateParams = parse_json("mrc402", &args[0])?;
    let creator = params.creator.clone();
    auth(tx, "Mrc402Create", &creator, &[&args[0]], &args[1], &args[2], now)?;
    let id = token::create(tx, params, &args[1], now)?;
    Ok(HandlerReply::ok(id))
}

pub fn update(tx: &mut TxStore, args: &[String], now: i64) -> Result<HandlerReply, LedgerError> {
    check_arg_count("Mrc402Update", args, 4)?;
    let params: UpdateParams = parse_json("mrc402", &args[1])?;
    let creator = token::get_mrc402(tx, &args[0])?.creator;
    auth(tx, "Mrc402Update", &creator, &[&args[0], &args[1]], &args[2], &args[3], now)?;
    token::update(tx, &args[0], &creator, params)?;
    Ok(HandlerReply::empty())
}

pub fn mint(tx: &mut TxStore, args: &[String], now: i64) -> Result<HandlerReply, LedgerError> {
    check_arg_count("Mrc402Mint", args, 4)?;
    let amount = Amount::parse_positive(&args[1])?;
    let creator = token::get_mrc402(tx, &args[0])?.creator;
    auth(tx, "Mrc402Mint", &creator, &[&args[0], &args[1]], &args[2], &args[3], now)?;
    token::mint(tx, &args[0], &creator, &amount, now)?;
    Ok(HandlerReply::empty())
}

pub fn burn(tx: &mut TxStore, args: &[String], now: i64) -> Result<HandlerReply, LedgerError> {
    check_arg_count("Mrc402Burn", args, 4)?;
    let amount = Amount::parse_positive(&args[1])?;
    let creator = token::get_mrc402(tx, &args[0])?.creator;
    auth(tx, "Mrc402Burn", &creator, &[&args[0], &args[1]], &args[2], &args[3], now)?;
    token::burn(tx, &args[0], &creator, &amount, now)?;
    Ok(HandlerReply::empty())
}

pub fn melt(tx: &mut TxStore, args: &[String], now: i64) -> Result<HandlerReply, LedgerError> {
    check_arg_count("Mrc402Melt", args, 5)?;
    let holder = &args[0];
    let amount = Amount::parse_positive(&args[2])?;
    auth(
        tx,
        "Mrc402Melt",
        holder,
        &[holder, &args[1], &args[2]],
        &args[3],
        &args[4],
        now,
    )?;
    token::melt(tx, &args[1], holder, &amount, now)?;
    Ok(HandlerReply::empty())
}

pub fn transfer(tx: &mut TxStore, args: &[String], now: i64) -> Result<HandlerReply, LedgerError> {
    check_arg_count("Mrc402Transfer", args, 8)?;
    let (from, to) = (&args[0], &args[1]);
    let amount = Amount::parse_positive(&args[3])?;
    check_string("tag", &args[4], 0, 64)?;
    check_string("memo", &args[5], 0, 1024)?;
    auth(
        tx,
        "Mrc402Transfer",
        from,
        &[from, to, &args[2], &args[3], &args[4], &args[5]],
        &args[6],
        &args[7],
        now,
    )?;
    token::transfer(tx, from, to, &args[2], &amount)?;
    Ok(HandlerReply::empty())
}

pub fn sell(tx: &mut TxStore, args: &[String], now: i64) -> Result<HandlerReply, LedgerError> {
    check_arg_count("Mrc402Sell", args, 9)?;
    let seller = &args[0];
    let amount = Amount::parse(&args[2])?;
    let price = Amount::parse(&args[3])?;
    let sell_token = parse_not_negative_i64("token", &args[4])?;
    auth(
        tx,
        "Mrc402Sell",
        seller,
        &[seller, &args[1], &args[2], &args[3], &args[4], &args[5], &args[6]],
        &args[7],
        &args[8],
        now,
    )?;
    let id = market::sell(
        tx,
        seller,
        &args[1],
        &amount,
        &price,
        sell_token,
        &args[5],
        &args[6],
        &args[7],
        now,
    )?;
    Ok(HandlerReply::ok(id))
}

pub fn unsell(tx: &mut TxStore, args: &[String], now: i64) -> Result<HandlerReply, LedgerError> {
    check_arg_count("Mrc402UnSell", args, 4)?;
    let seller = &args[0];
    auth(tx, "Mrc402UnSell", seller, &[seller, &args[1]], &args[2], &args[3], now)?;
    market::unsell(tx, seller, &args[1], now)?;
    Ok(HandlerReply::empty())
}

pub fn buy(tx: &mut TxStore, args: &[String], now: i64) -> Result<HandlerReply, LedgerError> {
    check_arg_count("Mrc402Buy", args, 5)?;
    let buyer = &args[0];
    let amount = Amount::parse_positive(&args[2])?;
    auth(tx, "Mrc402Buy", buyer, &[buyer, &args[1], &args[2]], &args[3], &args[4], now)?;
    market::buy(tx, buyer, &args[1], &amount, now)?;
    Ok(HandlerReply::empty())
}

pub fn auction(tx: &mut TxStore, args: &[String], now: i64) -> Result<HandlerReply, LedgerError> {
    check_arg_count("Mrc402Auction", args, 13)?;
    let seller = &args[0];
    let amount = Amount::parse(&args[2])?;
    let start_price = Amount::parse(&args[3])?;
    let buynow_price = Amount::parse(&args[4])?;
    let bidding_unit = Amount::parse(&args[5])?;
    let sell_token = parse_not_negative_i64("token", &args[6])?;
    let start_date = parse_not_negative_i64("startDate", &args[7])?;
    let end_date = parse_not_negative_i64("endDate", &args[8])?;
    auth(
        tx,
        "Mrc402Auction",
        seller,
        &[
            seller, &args[1], &args[2], &args[3], &args[4], &args[5], &args[6], &args[7],
            &args[8], &args[9], &args[10],
        ],
        &args[11],
        &args[12],
        now,
    )?;
    let id = market::auction(
        tx,
        seller,
        &args[1],
        &amount,
        &start_price,
        &buynow_price,
        &bidding_unit,
        sell_token,
        start_date,
        end_date,
        &args[9],
        &args[10],
        &args[11],
        now,
    )?;
    Ok(HandlerReply::ok(id))
}

pub fn unauction(tx: &mut TxStore, args: &[String], now: i64) -> Result<HandlerReply, LedgerError> {
    check_arg_count("Mrc402UnAuction", args, 4)?;
    let seller = &args[0];
    auth(tx, "Mrc402UnAuction", seller, &[seller, &args[1]], &args[2], &args[3], now)?;
    market::unauction(tx, seller, &args[1], now)?;
    Ok(HandlerReply::empty())
}

pub fn auction_bid(tx: &mut TxStore, args: &[String], now: i64) -> Result<HandlerReply, LedgerError> {
    check_arg_count("Mrc402AuctionBid", args, 6)?;
    let buyer = &args[0];
    let price = Amount::parse_positive(&args[2])?;
    let bid_token = parse_not_negative_i64("token", &args[3])?;
    auth(
        tx,
        "Mrc402AuctionBid",
        buyer,
        &[buyer, &args[1], &args[2], &args[3]],
        &args[4],
        &args[5],
        now,
    )?;
    market::bid(tx, buyer, &args[1], &price, bid_token, now)?;
    Ok(HandlerReply::empty())
}

/// Unauthenticated: anyone may settle a lapsed auction.
pub fn auction_finish(
    tx: &mut TxStore,
    args: &[String],
    now: i64,
) -> Result<HandlerReply, LedgerError> {
    check_arg_count("Mrc402AuctionFinish", args, 1)?;
    market::finish(tx, &args[0], now)?;
    Ok(HandlerReply::empty())
}

pub fn get(tx: &TxStore, args: &[String]) -> Result<HandlerReply, LedgerError> {
    check_arg_count("GetMRC402", args, 1)?;
    keys::check_prefixed_key("mrc402", keys::MRC402_PREFIX, &args[0])?;
    let json = stored_json(tx, &args[0], &format!("mrc402 {}", args[0]))?;
    Ok(HandlerReply::ok(json))
}

pub fn market_get(tx: &TxStore, args: &[String]) -> Result<HandlerReply, LedgerError> {
    check_arg_count("GetDEX402", args, 1)?;
    keys::check_prefixed_key("dex402", keys::DEX402_PREFIX, &args[0])?;
    let json = stored_json(tx, &args[0], &format!("dex402 {}", args[0]))?;
    Ok(HandlerReply::ok(json))
}
