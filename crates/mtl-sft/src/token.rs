//! MRC402 token lifecycle: create, update, mint, burn, melt, transfer.
//!
//! Every unit in circulation is backed by the per-unit `initialreserve` the
//! creator escrowed; burn and melt are the two paths that hand it back.

use crate::entities::Mrc402;
use mtl_store::{keys, TxStore};
use mtl_types::error::codes;
use mtl_types::validate::{check_string, check_url, parse_not_negative_i64};
use mtl_types::{derive_id, Amount, FeeRate, LedgerError};
use mtl_wallet::nft::Compartment;
use mtl_wallet::repo as wallet_repo;
use serde::Deserialize;
use std::collections::BTreeMap;
use tracing::info;

pub const MAX_SHAREHOLDERS: usize = 5;
/// Hard cap on `totalsupply`, before and after mint.
pub const MAX_SUPPLY: u64 = 99_999_999;
/// Creator, platform, and shareholder commissions are each capped at 10%.
pub const MAX_COMMISSION_PERCENT: u64 = 10;

pub fn get_mrc402(tx: &TxStore, id: &str) -> Result<Mrc402, LedgerError> {
    keys::check_prefixed_key("mrc402", keys::MRC402_PREFIX, id)?;
    tx.get_json::<Mrc402>(id)?
        .ok_or_else(|| LedgerError::not_found(&format!("mrc402 {id}")))
}

pub fn save_mrc402(tx: &mut TxStore, token: &Mrc402) -> Result<(), LedgerError> {
    tx.put_json(&token.id, token)
}

pub(crate) fn commission(name: &str, s: &str) -> Result<FeeRate, LedgerError> {
    FeeRate::parse_bounded(s, MAX_COMMISSION_PERCENT).map_err(|_| {
        LedgerError::validation(codes::INVALID_NUMBER, format!("invalid {name}: {s}"))
    })
}

/// `Mrc402Create` payload.
#[derive(Debug, Deserialize)]
pub struct CreateParams {
    pub creator: String,
    pub name: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub data: String,
    #[serde(rename = "totalsupply")]
    pub total_supply: Amount,
    #[serde(rename = "initialreserve", default)]
    pub initial_reserve: BTreeMap<String, Amount>,
    #[serde(rename = "creatorcommission", default)]
    pub creator_commission: String,
    #[serde(default)]
    pub shareholder: BTreeMap<String, String>,
    #[serde(rename = "expiredate", default)]
    pub expire_date: i64,
}

pub fn create(
    tx: &mut TxStore,
    params: CreateParams,
    salt: &str,
    now: i64,
) -> Result<String, LedgerError> {
    check_string("name", &params.name, 1, 64)?;
    check_url("url", &params.url, 0, 255)?;
    check_supply_bounds(&params.total_supply)?;
    let creator_commission = if params.creator_commission.is_empty() {
        "0".to_string()
    } else {
        params.creator_commission
    };
    commission("creatorcommission", &creator_commission)?;
    if params.shareholder.len() > MAX_SHAREHOLDERS {
        return Err(LedgerError::validation(
            codes::BAD_PARAMETER,
            format!("at most {MAX_SHAREHOLDERS} shareholders"),
        ));
    }
    for (address, rate) in &params.shareholder {
        commission("shareholder commission", rate)?;
        if !wallet_repo::exists(tx, address)? {
            return Err(LedgerError::existence(
                codes::DATA_NOT_FOUND,
                format!("wallet not found {address}"),
            ));
        }
    }
    if !wallet_repo::exists(tx, &params.creator)? {
        return Err(LedgerError::existence(
            codes::DATA_NOT_FOUND,
            format!("wallet not found {}", params.creator),
        ));
    }

    let id = derive_id(keys::MRC402_PREFIX, &[&params.creator, &now.to_string(), salt])?;
    if tx.exists(&id)? {
        return Err(LedgerError::existence(
            codes::DUPLICATE_KEY,
            format!("mrc402 {id} already exists"),
        ));
    }

    // Escrow the full backing: per-unit reserve x total supply, per token.
    take_reserve(tx, &params.creator, &params.initial_reserve, &params.total_supply, now)?;
    wallet_repo::nft_credit(tx, &params.creator, &id, Compartment::Free, &params.total_supply)?;

    let token = Mrc402 {
        id: id.clone(),
        creator: params.creator,
        name: params.name,
        url: params.url,
        data: params.data,
        decimal: 0,
        total_supply: params.total_supply,
        melted_amount: Amount::zero(),
        initial_reserve: params.initial_reserve,
        creator_commission,
        shareholder: params.shareholder,
        expire_date: params.expire_date,
        regdate: now,
    };
    save_mrc402(tx, &token)?;
    info!(id = %id, supply = %token.total_supply, "mrc402 created");
    Ok(id)
}

/// `Mrc402Update` payload; supply, reserves, and commissions are immutable.
#[derive(Debug, Deserialize)]
pub struct UpdateParams {
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub data: String,
}

pub fn update(
    tx: &mut TxStore,
    id: &str,
    caller: &str,
    params: UpdateParams,
) -> Result<(), LedgerError> {
    let mut token = get_mrc402(tx, id)?;
    require_creator(&token, caller)?;
    check_url("url", &params.url, 0, 255)?;
    token.url = params.url;
    token.data = params.data;
    save_mrc402(tx, &token)
}

/// Creator-only supply increase; consumes reserve per new unit.
pub fn mint(tx: &mut TxStore, id: &str, caller: &str, amount: &Amount, now: i64) -> Result<(), LedgerError> {
    let mut token = get_mrc402(tx, id)?;
    require_creator(&token, caller)?;
    require_positive(amount)?;
    let next_supply = token.total_supply.checked_add(amount)?;
    check_supply_bounds(&next_supply)?;
    take_reserve(tx, caller, &token.initial_reserve, amount, now)?;
    wallet_repo::nft_credit(tx, caller, id, Compartment::Free, amount)?;
    token.total_supply = next_supply;
    save_mrc402(tx, &token)?;
    info!(id, %amount, "mrc402 minted");
    Ok(())
}

/// Creator-only supply decrease; returns reserve per destroyed unit.
pub fn burn(tx: &mut TxStore, id: &str, caller: &str, amount: &Amount, now: i64) -> Result<(), LedgerError> {
    let mut token = get_mrc402(tx, id)?;
    require_creator(&token, caller)?;
    require_positive(amount)?;
    token.total_supply = token.total_supply.checked_sub(amount).ok_or_else(|| {
        LedgerError::resource(codes::SUPPLY_UNDERFLOW, "burn exceeds total supply")
    })?;
    wallet_repo::nft_debit(tx, caller, id, Compartment::Free, amount)?;
    return_reserve(tx, caller, &token.initial_reserve, amount, now)?;
    save_mrc402(tx, &token)?;
    info!(id, %amount, "mrc402 burned");
    Ok(())
}

/// Any holder reclaims the per-unit reserve of their free units. Disallowed
/// while an expiry date lies in the future.
pub fn melt(tx: &mut TxStore, id: &str, caller: &str, amount: &Amount, now: i64) -> Result<(), LedgerError> {
    let mut token = get_mrc402(tx, id)?;
    require_positive(amount)?;
    if token.expire_date > 0 && token.expire_date > now {
        return Err(LedgerError::precondition(
            codes::WRONG_STATE,
            format!("mrc402 {id} cannot melt before its expiry"),
        ));
    }
    if token.outstanding().checked_sub(amount).is_none() {
        return Err(LedgerError::resource(
            codes::SUPPLY_UNDERFLOW,
            "melt exceeds outstanding supply",
        ));
    }
    wallet_repo::nft_debit(tx, caller, id, Compartment::Free, amount)?;
    return_reserve(tx, caller, &token.initial_reserve, amount, now)?;
    token.melted_amount = token.melted_amount.checked_add(amount)?;
    save_mrc402(tx, &token)?;
    info!(id, %amount, "mrc402 melted");
    Ok(())
}

/// Move free units between wallets.
pub fn transfer(
    tx: &mut TxStore,
    from: &str,
    to: &str,
    id: &str,
    amount: &Amount,
) -> Result<(), LedgerError> {
    get_mrc402(tx, id)?;
    require_positive(amount)?;
    if !wallet_repo::exists(tx, to)? {
        return Err(LedgerError::existence(
            codes::DATA_NOT_FOUND,
            format!("wallet not found {to}"),
        ));
    }
    wallet_repo::nft_debit(tx, from, id, Compartment::Free, amount)?;
    wallet_repo::nft_credit(tx, to, id, Compartment::Free, amount)
}

/// Multiply each per-unit reserve by `units` and debit the payer.
fn take_reserve(
    tx: &mut TxStore,
    payer: &str,
    reserve: &BTreeMap<String, Amount>,
    units: &Amount,
    now: i64,
) -> Result<(), LedgerError> {
    for (token_str, per_unit) in reserve {
        let token = parse_not_negative_i64("reserve token", token_str)?;
        let total = per_unit.checked_mul(units)?;
        if !total.is_zero() {
            wallet_repo::debit(tx, payer, token, &total, now)?;
        }
    }
    Ok(())
}

fn return_reserve(
    tx: &mut TxStore,
    payee: &str,
    reserve: &BTreeMap<String, Amount>,
    units: &Amount,
    now: i64,
) -> Result<(), LedgerError> {
    for (token_str, per_unit) in reserve {
        let token = parse_not_negative_i64("reserve token", token_str)?;
        let total = per_unit.checked_mul(units)?;
        if !total.is_zero() {
            wallet_repo::credit(tx, payee, token, &total, 0, now)?;
        }
    }
    Ok(())
}

fn check_supply_bounds(supply: &Amount) -> Result<(), LedgerError> {
    if supply.is_zero() || *supply > Amount::from_u64(MAX_SUPPLY) {
        return Err(LedgerError::validation(
            codes::INVALID_NUMBER,
            format!("total supply must be 1..{MAX_SUPPLY}"),
        ));
    }
    Ok(())
}

fn require_positive(amount: &Amount) -> Result<(), LedgerError> {
    if amount.is_zero() {
        return Err(LedgerError::validation(
            codes::INVALID_NUMBER,
            "amount must be positive",
        ));
    }
    Ok(())
}

pub(crate) fn require_creator(token: &Mrc402, caller: &str) -> Result<(), LedgerError> {
    if token.creator != caller {
        return Err(LedgerError::not_permitted(&format!("mrc402 {}", token.id)));
    }
    Ok(())
}
