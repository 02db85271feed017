//! MRC010 token registry handlers. The signer of every mutating operation
//! except `TokenRegister` is the stored token owner.

use super::{auth, parse_json, stored_json};
use crate::HandlerReply;
use mtl_store::{keys, TxStore};
use mtl_token::registry::{self, RegisterParams};
use mtl_types::validate::{check_arg_count, check_string, parse_not_negative_i64};
use mtl_types::{Amount, LedgerError};

pub fn register(tx: &mut TxStore, args: &[String], now: i64) -> Result<HandlerReply, LedgerError> {
    check_arg_count("TokenRegister", args, 3)?;
    let params: RegisterParams = parse_json("token", &args[0])?;
    let owner = params.owner.clone();
    auth(tx, "TokenRegister", &owner, &[&args[0]], &args[1], &args[2], now)?;
    let sn = registry::register(tx, params, now)?;
    Ok(HandlerReply::ok(sn.to_string()))
}

pub fn update(tx: &mut TxStore, args: &[String], now: i64) -> Result<HandlerReply, LedgerError> {
    check_arg_count("TokenUpdate", args, 6)?;
    let sn = parse_not_negative_i64("token", &args[0])?;
    let owner = registry::get_token(tx, sn)?.owner;
    auth(
        tx,
        "TokenUpdate",
        &owner,
        &[&args[0], &args[1], &args[2], &args[3]],
        &args[4],
        &args[5],
        now,
    )?;
    registry::update(tx, sn, &owner, &args[1], &args[2], &args[3])?;
    Ok(HandlerReply::empty())
}

pub fn burning(tx: &mut TxStore, args: &[String], now: i64) -> Result<HandlerReply, LedgerError> {
    let amount = supply_change_args("TokenBurning", args)?;
    let sn = parse_not_negative_i64("token", &args[0])?;
    let owner = registry::get_token(tx, sn)?.owner;
    auth(
        tx,
        "TokenBurning",
        &owner,
        &[&args[0], &args[1], &args[2]],
        &args[3],
        &args[4],
        now,
    )?;
    registry::burn(tx, sn, &owner, &amount, now)?;
    Ok(HandlerReply::empty())
}

pub fn increase(tx: &mut TxStore, args: &[String], now: i64) -> Result<HandlerReply, LedgerError> {
    let amount = supply_change_args("TokenIncrease", args)?;
    let sn = parse_not_negative_i64("token", &args[0])?;
    let owner = registry::get_token(tx, sn)?.owner;
    auth(
        tx,
        "TokenIncrease",
        &owner,
        &[&args[0], &args[1], &args[2]],
        &args[3],
        &args[4],
        now,
    )?;
    registry::mint(tx, sn, &owner, &amount, now)?;
    Ok(HandlerReply::empty())
}

fn supply_change_args(op: &str, args: &[String]) -> Result<Amount, LedgerError> {
    check_arg_count(op, args, 5)?;
    check_string("memo", &args[2], 0, 1024)?;
    Amount::parse_positive(&args[1])
}

pub fn set_base(tx: &mut TxStore, args: &[String], now: i64) -> Result<HandlerReply, LedgerError> {
    check_arg_count("TokenSetBase", args, 4)?;
    let sn = parse_not_negative_i64("token", &args[0])?;
    let base = parse_not_negative_i64("baseToken", &args[1])?;
    let owner = registry::get_token(tx, sn)?.owner;
    auth(tx, "TokenSetBase", &owner, &[&args[0], &args[1]], &args[2], &args[3], now)?;
    registry::set_base(tx, sn, &owner, base)?;
    Ok(HandlerReply::empty())
}

pub fn add_target(tx: &mut TxStore, args: &[String], now: i64) -> Result<HandlerReply, LedgerError> {
    check_arg_count("TokenAddTarget", args, 4)?;
    let sn = parse_not_negative_i64("token", &args[0])?;
    let target = parse_not_negative_i64("targetToken", &args[1])?;
    let owner = registry::get_token(tx, sn)?.owner;
    auth(tx, "TokenAddTarget", &owner, &[&args[0], &args[1]], &args[2], &args[3], now)?;
    registry::add_target(tx, sn, &owner, target)?;
    Ok(HandlerReply::empty())
}

pub fn remove_target(
    tx: &mut TxStore,
    args: &[String],
    now: i64,
) -> Result<HandlerReply, LedgerError> {
    check_arg_count("TokenRemoveTarget", args, 4)?;
    let sn = parse_not_negative_i64("token", &args[0])?;
    let target = parse_not_negative_i64("targetToken", &args[1])?;
    let owner = registry::get_token(tx, sn)?.owner;
    auth(
        tx,
        "TokenRemoveTarget",
        &owner,
        &[&args[0], &args[1]],
        &args[2],
        &args[3],
        now,
    )?;
    registry::remove_target(tx, sn, &owner, target)?;
    Ok(HandlerReply::empty())
}

pub fn add_logger(tx: &mut TxStore, args: &[String], now: i64) -> Result<HandlerReply, LedgerError> {
    check_arg_count("TokenAddLogger", args, 4)?;
    let sn = parse_not_negative_i64("token", &args[0])?;
    let owner = registry::get_token(tx, sn)?.owner;
    auth(tx, "TokenAddLogger", &owner, &[&args[0], &args[1]], &args[2], &args[3], now)?;
    registry::add_logger(tx, sn, &owner, &args[1], now)?;
    Ok(HandlerReply::empty())
}

pub fn remove_logger(
    tx: &mut TxStore,
    args: &[String],
    now: i64,
) -> Result<HandlerReply, LedgerError> {
    check_arg_count("TokenRemoveLogger", args, 4)?;
    let sn = parse_not_negative_i64("token", &args[0])?;
    let owner = registry::get_token(tx, sn)?.owner;
    auth(
        tx,
        "TokenRemoveLogger",
        &owner,
        &[&args[0], &args[1]],
        &args[2],
        &args[3],
        now,
    )?;
    registry::remove_logger(tx, sn, &owner, &args[1])?;
    Ok(HandlerReply::empty())
}

pub fn get(tx: &TxStore, args: &[String]) -> Result<HandlerReply, LedgerError> {
    check_arg_count("GetToken", args, 1)?;
    let sn = parse_not_negative_i64("token", &args[0])?;
    let json = stored_json(tx, &keys::token_key(sn), &format!("token {sn}"))?;
    Ok(HandlerReply::ok(json))
}
