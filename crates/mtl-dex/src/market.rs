//! MRC040 lifecycle: register, exchange (partial fill), unregister.

use crate::entities::{ExchangeResult, Mrc040, Side, Status};
use mtl_store::{keys, TxStore};
use mtl_types::error::codes;
use mtl_types::{derive_id, Amount, LedgerError};
use mtl_token::registry as token_registry;
use mtl_wallet::repo as wallet_repo;
use tracing::{info, warn};

pub fn get_item(tx: &TxStore, id: &str) -> Result<Mrc040, LedgerError> {
    keys::check_prefixed_key("mrc040", keys::MRC040_PREFIX, id)?;
    tx.get_json::<Mrc040>(id)?
        .ok_or_else(|| LedgerError::not_found(&format!("mrc040 {id}")))
}

fn save_item(tx: &mut TxStore, item: &Mrc040) -> Result<(), LedgerError> {
    tx.put_json(&item.id, item)
}

/// Escrow owed for `qtt` units of the item: the quantity itself on the SELL
/// side, the base-token cost on the BUY side.
fn escrow_amount(item: &Mrc040, qtt: &Amount, target_decimal: u32) -> Result<Amount, LedgerError> {
    match item.side {
        Side::Sell => Ok(*qtt),
        Side::Buy => item.price.mul_div_exact(qtt, target_decimal),
    }
}

/// Register an item. The owner's spendable balance is moved into `pending`
/// escrow; `salt` (the request signature) makes the derived id unique.
#[allow(clippy::too_many_arguments)]
pub fn register(
    tx: &mut TxStore,
    owner: &str,
    side: Side,
    base_sn: i64,
    target_sn: i64,
    price: &Amount,
    qtt: &Amount,
    salt: &str,
    now: i64,
) -> Result<String, LedgerError> {
    let base = token_registry::get_token(tx, base_sn)?;
    let target = token_registry::get_token(tx, target_sn)?;
    token_registry::check_pair(&base, &target)?;

    let item = Mrc040 {
        id: derive_id(
            keys::MRC040_PREFIX,
            &[owner, &now.to_string(), salt],
        )?,
        owner: owner.to_string(),
        side,
        base_token: base_sn,
        target_token: target_sn,
        price: *price,
        qtt: *qtt,
        remain_qtt: *qtt,
        status: Status::Wait,
        regdate: now,
        complete_date: 0,
        cancel_date: 0,
    };
    if tx.exists(&item.id)? {
        return Err(LedgerError::existence(
            codes::DUPLICATE_KEY,
            format!("mrc040 {} already exists", item.id),
        ));
    }

    let total = escrow_amount(&item, qtt, target.decimal)?;
    let escrow_token = item.escrow_token();
    wallet_repo::debit(tx, owner, escrow_token, &total, now)?;
    wallet_repo::credit_pending(tx, owner, escrow_token, &total)?;

    save_item(tx, &item)?;
    info!(id = %item.id, ?side, %total, "dex item registered");
    Ok(item.id)
}

/// What `exchange` produced. `AutoCancelled` means the pair declaration was
/// retracted after registration: the item's escrow has been refunded and the
/// cancellation must be committed, but the caller still receives the pair
/// error.
#[derive(Debug)]
pub enum ExchangeOutcome {
    Filled { result_key: String },
    AutoCancelled(LedgerError),
}

/// Fill `qtt` units against the item on behalf of `requester`, recording the
/// fill under `exchange_pk`.
pub fn exchange(
    tx: &mut TxStore,
    requester: &str,
    item_id: &str,
    qtt: &Amount,
    exchange_pk: &str,
    now: i64,
) -> Result<ExchangeOutcome, LedgerError> {
    let mut item = get_item(tx, item_id)?;
    if !item.is_open() {
        return Err(LedgerError::precondition(
            codes::WRONG_STATE,
            format!("mrc040 {item_id} is not open"),
        ));
    }
    let remain_after = match item.remain_qtt.checked_sub(qtt) {
        Some(r) if !qtt.is_zero() => r,
        _ => {
            return Err(LedgerError::validation(
                codes::BAD_PARAMETER,
                "exchange quantity exceeds remaining",
            ))
        }
    };
    if tx.exists(exchange_pk)? {
        return Err(LedgerError::existence(
            codes::DUPLICATE_KEY,
            format!("exchange result {exchange_pk} already exists"),
        ));
    }

    let base = token_registry::get_token(tx, item.base_token)?;
    let target = token_registry::get_token(tx, item.target_token)?;
    if let Err(pair_err) = token_registry::check_pair(&base, &target) {
        warn!(id = %item_id, "pair retracted; auto-cancelling item");
        cancel_internal(tx, &mut item, target.decimal, now)?;
        return Ok(ExchangeOutcome::AutoCancelled(pair_err));
    }

    let base_amount = item.price.mul_div_exact(qtt, target.decimal)?;
    // ownerPlus is what the item's owner gains, ownerMinus what it gives up.
    let (owner_plus_token, owner_plus, owner_minus_token, owner_minus) = match item.side {
        Side::Sell => (item.base_token, base_amount, item.target_token, *qtt),
        Side::Buy => (item.target_token, *qtt, item.base_token, base_amount),
    };

    // Requester pays the owner's gain from spendable balance.
    wallet_repo::debit(tx, requester, owner_plus_token, &owner_plus, now)?;
    wallet_repo::credit(tx, &item.owner, owner_plus_token, &owner_plus, 0, now)?;
    // Owner's escrow covers the owner's give-up.
    wallet_repo::debit_pending(tx, &item.owner, owner_minus_token, &owner_minus)?;
    wallet_repo::credit(tx, requester, owner_minus_token, &owner_minus, 0, now)?;

    item.remain_qtt = remain_after;
    if item.remain_qtt.is_zero() {
        item.status = Status::Complete;
        item.complete_date = now;
    } else {
        item.status = Status::Trading;
    }
    save_item(tx, &item)?;

    let result = ExchangeResult {
        id: exchange_pk.to_string(),
        mrc040: item.id.clone(),
        owner: item.owner.clone(),
        requester: requester.to_string(),
        qtt: *qtt,
        price: item.price,
        base_token: item.base_token,
        target_token: item.target_token,
        regdate: now,
    };
    tx.put_json(exchange_pk, &result)?;
    info!(id = %item_id, %qtt, status = ?item.status, "dex exchange filled");
    Ok(ExchangeOutcome::Filled {
        result_key: exchange_pk.to_string(),
    })
}

/// Owner-initiated cancel: refund the remaining escrow.
pub fn unregister(
    tx: &mut TxStore,
    caller: &str,
    item_id: &str,
    now: i64,
) -> Result<(), LedgerError> {
    let mut item = get_item(tx, item_id)?;
    if item.owner != caller {
        return Err(LedgerError::not_permitted(&format!("mrc040 {item_id}")));
    }
    if !item.is_open() {
        return Err(LedgerError::precondition(
            codes::ALREADY_CANCELED,
            format!("mrc040 {item_id} is not open"),
        ));
    }
    let target = token_registry::get_token(tx, item.target_token)?;
    cancel_internal(tx, &mut item, target.decimal, now)?;
    info!(id = %item_id, "dex item cancelled");
    Ok(())
}

fn cancel_internal(
    tx: &mut TxStore,
    item: &mut Mrc040,
    target_decimal: u32,
    now: i64,
) -> Result<(), LedgerError> {
    let remain = item.remain_qtt;
    let refund = escrow_amount(item, &remain, target_decimal)?;
    let escrow_token = item.escrow_token();
    if !refund.is_zero() {
        wallet_repo::debit_pending(tx, &item.owner, escrow_token, &refund)?;
        wallet_repo::credit(tx, &item.owner, escrow_token, &refund, 0, now)?;
    }
    item.status = Status::Cancel;
    item.cancel_date = now;
    save_item(tx, item)
}
