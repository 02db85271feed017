//! Wallet lifecycle and fungible-transfer handlers.

use super::{auth, parse_json};
use crate::HandlerReply;
use mtl_auth::{derive_nonce, normalize_pem};
use mtl_store::TxStore;
use mtl_types::error::codes;
use mtl_types::validate::{check_arg_count, check_string, parse_not_negative_i64};
use mtl_types::{derive_address, Amount, LedgerError};
use mtl_wallet::{repo as wallet_repo, Wallet};
use serde::Deserialize;
use tracing::info;

pub const MAX_MULTI_TRANSFER: usize = 100;

/// `NewWallet(publicKeyPEM, addInfo)` — the only operation without a
/// signature: the request is self-certifying, it carries the key the
/// address is derived from.
pub fn new_wallet(tx: &mut TxStore, args: &[String], now: i64) -> Result<HandlerReply, LedgerError> {
    check_arg_count("NewWallet", args, 2)?;
    let pem = normalize_pem(&args[0])?;
    let address = derive_address(&[&pem, &args[1], &now.to_string()]);
    if wallet_repo::exists(tx, &address)? {
        return Err(LedgerError::existence(
            codes::ALREADY_EXISTS,
            format!("wallet {address} already exists"),
        ));
    }
    let nonce = derive_nonce(&address, now, &pem);
    let wallet = Wallet::new(address.clone(), pem, nonce, now);
    wallet_repo::save(tx, &wallet)?;
    info!(address = %address, "wallet created");
    Ok(HandlerReply::ok(address))
}

pub fn balance_of(tx: &TxStore, args: &[String]) -> Result<HandlerReply, LedgerError> {
    check_arg_count("BalanceOf", args, 1)?;
    let wallet = wallet_repo::load(tx, &args[0])?;
    let json = serde_json::to_string(&wallet.balances).map_err(|err| {
        LedgerError::internal(codes::INTERNAL, format!("balance encode: {err}"))
    })?;
    Ok(HandlerReply::ok(json))
}

pub fn get_nonce(tx: &TxStore, args: &[String]) -> Result<HandlerReply, LedgerError> {
    check_arg_count("GetNonce", args, 1)?;
    let wallet = wallet_repo::load(tx, &args[0])?;
    Ok(HandlerReply::ok(wallet.nonce))
}

pub fn transfer(tx: &mut TxStore, args: &[String], now: i64) -> Result<HandlerReply, LedgerError> {
    check_arg_count("Transfer", args, 9)?;
    let (from, to) = (&args[0], &args[1]);
    let amount = Amount::parse_positive(&args[2])?;
    let token = parse_not_negative_i64("token", &args[3])?;
    let unlock_date = parse_not_negative_i64("unlockDate", &args[4])?;
    check_string("tag", &args[5], 0, 64)?;
    check_string("memo", &args[6], 0, 1024)?;
    if from == to {
        return Err(LedgerError::validation(
            codes::BAD_PARAMETER,
            "transfer to self",
        ));
    }
    auth(
        tx,
        "Transfer",
        from,
        &[from, to, &args[2], &args[3], &args[4]],
        &args[7],
        &args[8],
        now,
    )?;
    wallet_repo::debit(tx, from, token, &amount, now)?;
    wallet_repo::credit(tx, to, token, &amount, unlock_date, now)?;
    Ok(HandlerReply::empty())
}

/// One entry of a `MultiTransfer` list. Tag and memo fields in the payload
/// are accepted and ignored.
#[derive(Debug, Deserialize)]
struct TransferEntry {
    address: String,
    amount: Amount,
    #[serde(default)]
    unlockdate: i64,
}

pub fn multi_transfer(
    tx: &mut TxStore,
    args: &[String],
    now: i64,
) -> Result<HandlerReply, LedgerError> {
    check_arg_count("MultiTransfer", args, 5)?;
    let from = &args[0];
    let entries: Vec<TransferEntry> = parse_json("transfer list", &args[1])?;
    let token = parse_not_negative_i64("token", &args[2])?;
    if entries.is_empty() || entries.len() > MAX_MULTI_TRANSFER {
        return Err(LedgerError::validation(
            codes::BAD_PARAMETER,
            format!("transfer list must hold 1..{MAX_MULTI_TRANSFER} entries"),
        ));
    }
    auth(
        tx,
        "MultiTransfer",
        from,
        &[from, &args[1], &args[2]],
        &args[3],
        &args[4],
        now,
    )?;
    for entry in &entries {
        if entry.amount.is_zero() {
            return Err(LedgerError::validation(
                codes::INVALID_NUMBER,
                format!("amount must be positive for {}", entry.address),
            ));
        }
        if entry.unlockdate < 0 {
            return Err(LedgerError::validation(
                codes::INVALID_NUMBER,
                format!("negative unlockdate for {}", entry.address),
            ));
        }
        if &entry.address == from {
            return Err(LedgerError::validation(
                codes::BAD_PARAMETER,
                "transfer to self",
            ));
        }
        wallet_repo::debit(tx, from, token, &entry.amount, now)?;
        wallet_repo::credit(tx, &entry.address, token, &entry.amount, entry.unlockdate, now)?;
    }
    Ok(HandlerReply::empty())
}

/// `Exchange` — a two-sided atomic swap. Both parties sign the same eight
/// shared fields; fee legs are optional and stay in the paying side's token.
pub fn exchange(tx: &mut TxStore, args: &[String], now: i64) -> Result<HandlerReply, LedgerError> {
    check_arg_count("Exchange", args, 18)?;
    let (from, to) = (&args[0], &args[9]);
    if from == to {
        return Err(LedgerError::validation(
            codes::BAD_PARAMETER,
            "exchange with self",
        ));
    }
    let from_amount = Amount::parse_positive(&args[1])?;
    let from_token = parse_not_negative_i64("fromToken", &args[2])?;
    let from_fee = parse_fee(&args[3])?;
    let to_amount = Amount::parse_positive(&args[10])?;
    let to_token = parse_not_negative_i64("toToken", &args[11])?;
    let to_fee = parse_fee(&args[12])?;
    check_string("fromTag", &args[5], 0, 64)?;
    check_string("fromMemo", &args[6], 0, 1024)?;
    check_string("toTag", &args[14], 0, 64)?;
    check_string("toMemo", &args[15], 0, 1024)?;

    let parts = [
        from.as_str(),
        to.as_str(),
        &args[1],
        &args[2],
        &args[3],
        &args[10],
        &args[11],
        &args[12],
    ];
    auth(tx, "Exchange", from, &parts, &args[7], &args[8], now)?;
    auth(tx, "Exchange", to, &parts, &args[16], &args[17], now)?;

    wallet_repo::debit(tx, from, from_token, &from_amount, now)?;
    wallet_repo::credit(tx, to, from_token, &from_amount, 0, now)?;
    wallet_repo::debit(tx, to, to_token, &to_amount, now)?;
    wallet_repo::credit(tx, from, to_token, &to_amount, 0, now)?;
    if !from_fee.is_zero() && !args[4].is_empty() {
        wallet_repo::debit(tx, from, from_token, &from_fee, now)?;
        wallet_repo::credit(tx, &args[4], from_token, &from_fee, 0, now)?;
    }
    if !to_fee.is_zero() && !args[13].is_empty() {
        wallet_repo::debit(tx, to, to_token, &to_fee, now)?;
        wallet_repo::credit(tx, &args[13], to_token, &to_fee, 0, now)?;
    }
    Ok(HandlerReply::empty())
}

fn parse_fee(s: &str) -> Result<Amount, LedgerError> {
    if s.is_empty() {
        return Ok(Amount::zero());
    }
    Amount::parse(s)
}
