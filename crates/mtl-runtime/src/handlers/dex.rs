//! MRC040 fungible-pair DEX handlers.

use super::auth;
use crate::HandlerReply;
use mtl_dex::market::{self, ExchangeOutcome};
use mtl_dex::Side;
use mtl_store::TxStore;
use mtl_types::error::codes;
use mtl_types::validate::{check_arg_count, check_string, parse_not_negative_i64};
use mtl_types::{Amount, LedgerError};

pub fn register(tx: &mut TxStore, args: &[String], now: i64) -> Result<HandlerReply, LedgerError> {
    check_arg_count("StodexRegister", args, 8)?;
    let owner = &args[0];
    let side = Side::parse(&args[1]).ok_or_else(|| {
        LedgerError::validation(codes::BAD_PARAMETER, format!("unknown side {}", args[1]))
    })?;
    let base = parse_not_negative_i64("baseToken", &args[2])?;
    let target = parse_not_negative_i64("targetToken", &args[3])?;
    let price = Amount::parse_positive(&args[4])?;
    let qtt = Amount::parse_positive(&args[5])?;
    auth(
        tx,
        "StodexRegister",
        owner,
        &[owner, &args[1], &args[2], &args[3], &args[4], &args[5]],
        &args[6],
        &args[7],
        now,
    )?;
    // the request signature salts the derived item id
    let id = market::register(tx, owner, side, base, target, &price, &qtt, &args[6], now)?;
    Ok(HandlerReply::ok(id))
}

pub fn unregister(tx: &mut TxStore, args: &[String], now: i64) -> Result<HandlerReply, LedgerError> {
    check_arg_count("StodexUnRegister", args, 4)?;
    let owner = &args[0];
    auth(tx, "StodexUnRegister", owner, &[owner, &args[1]], &args[2], &args[3], now)?;
    market::unregister(tx, owner, &args[1], now)?;
    Ok(HandlerReply::empty())
}

/// A fill whose pair was retracted after listing cancels the item instead of
/// trading; the cancel commits and the pair error still reaches the caller.
pub fn exchange(tx: &mut TxStore, args: &[String], now: i64) -> Result<HandlerReply, LedgerError> {
    check_arg_count("StodexExchange", args, 6)?;
    let requester = &args[0];
    let qtt = Amount::parse_positive(&args[2])?;
    check_string("exchangePK", &args[3], 1, 128)?;
    auth(
        tx,
        "StodexExchange",
        requester,
        &[requester, &args[1], &args[2], &args[3]],
        &args[4],
        &args[5],
        now,
    )?;
    match market::exchange(tx, requester, &args[1], &qtt, &args[3], now)? {
        ExchangeOutcome::Filled { result_key } => Ok(HandlerReply::ok(result_key)),
        ExchangeOutcome::AutoCancelled(err) => Ok(HandlerReply {
            value: String::new(),
            commit_error: Some(err),
        }),
    }
}
