//! Sale and English-auction flows for MRC401 items.
//!
//! Listing only flips fields on the item record; money moves on buy, bid,
//! refund, and settlement. A bid debits the bidder immediately and the item
//! record holds the running high bid until the previous bidder is refunded
//! or the auction settles.

use crate::entities::Mrc401;
use crate::project::{fee_rate, get_item, get_project, save_item};
use mtl_store::TxStore;
use mtl_types::error::codes;
use mtl_types::{Amount, LedgerError};
use mtl_wallet::repo as wallet_repo;
use tracing::info;

/// Shortest allowed auction: one hour past `now`.
pub const AUCTION_MIN_SECS: i64 = 3_600;
/// Longest allowed auction: 21 days past `now`.
pub const AUCTION_MAX_SECS: i64 = 1_814_400;

pub fn clamp_auction_end(end_date: i64, now: i64) -> i64 {
    end_date.clamp(now + AUCTION_MIN_SECS, now + AUCTION_MAX_SECS)
}

/// List an idle item at `(price, token)`. The token must be the project's
/// `allowtoken` or native.
pub fn sell(
    tx: &mut TxStore,
    caller: &str,
    item_id: &str,
    price: &Amount,
    token: i64,
    now: i64,
) -> Result<(), LedgerError> {
    let mut item = get_item(tx, item_id)?;
    item.require_idle()?;
    if item.owner != caller {
        return Err(LedgerError::not_permitted(&format!("mrc401 {item_id}")));
    }
    let project = get_project(tx, &item.mrc400)?;
    check_trade_token(&project, token)?;
    if price.is_zero() {
        return Err(LedgerError::validation(
            codes::INVALID_NUMBER,
            "sell price must be positive",
        ));
    }
    item.sell_date = now;
    item.sell_price = *price;
    item.sell_token = token;
    save_item(tx, &item)?;
    info!(id = %item_id, %price, token, "mrc401 listed");
    Ok(())
}

pub fn unsell(tx: &mut TxStore, caller: &str, item_id: &str) -> Result<(), LedgerError> {
    let mut item = get_item(tx, item_id)?;
    if item.owner != caller {
        return Err(LedgerError::not_permitted(&format!("mrc401 {item_id}")));
    }
    if !item.on_sale() {
        return Err(LedgerError::precondition(
            codes::WRONG_STATE,
            format!("mrc401 {item_id} is not on sale"),
        ));
    }
    item.clear_sale();
    save_item(tx, &item)
}

/// Buy a listed item at its asking price. When the seller is not the
/// project owner, the melting fee share of the price goes to the project
/// owner.
pub fn buy(tx: &mut TxStore, buyer: &str, item_id: &str, now: i64) -> Result<(), LedgerError> {
    let mut item = get_item(tx, item_id)?;
    if !item.on_sale() {
        return Err(LedgerError::precondition(
            codes::WRONG_STATE,
            format!("mrc401 {item_id} is not on sale"),
        ));
    }
    if item.owner == buyer {
        return Err(LedgerError::not_permitted(&format!("mrc401 {item_id}")));
    }
    let project = get_project(tx, &item.mrc400)?;
    let price = item.sell_price;
    let seller = item.owner.clone();

    wallet_repo::debit(tx, buyer, item.sell_token, &price, now)?;
    pay_with_creator_fee(tx, &project.owner, &seller, item.sell_token, &price, &item.melting_fee, "meltingfee", now)?;

    item.owner = buyer.to_string();
    item.clear_sale();
    item.last_trade_date = now;
    save_item(tx, &item)?;
    info!(id = %item_id, %price, "mrc401 sold");
    Ok(())
}

/// Open an auction on an idle item.
#[allow(clippy::too_many_arguments)]
pub fn auction(
    tx: &mut TxStore,
    caller: &str,
    item_id: &str,
    start_price: &Amount,
    buynow_price: &Amount,
    bidding_unit: &Amount,
    token: i64,
    end_date: i64,
    now: i64,
) -> Result<(), LedgerError> {
    let mut item = get_item(tx, item_id)?;
    item.require_idle()?;
    if item.owner != caller {
        return Err(LedgerError::not_permitted(&format!("mrc401 {item_id}")));
    }
    let project = get_project(tx, &item.mrc400)?;
    check_trade_token(&project, token)?;
    if start_price.is_zero() || bidding_unit.is_zero() {
        return Err(LedgerError::validation(
            codes::INVALID_NUMBER,
            "start price and bidding unit must be positive",
        ));
    }
    if !buynow_price.is_zero() && buynow_price < start_price {
        return Err(LedgerError::validation(
            codes::INVALID_NUMBER,
            "buy-now price below start price",
        ));
    }

    item.auction_date = now;
    item.auction_end = clamp_auction_end(end_date, now);
    item.auction_token = token;
    item.auction_bidding_unit = *bidding_unit;
    item.auction_start_price = *start_price;
    item.auction_buynow_price = *buynow_price;
    item.auction_current_price = Amount::zero();
    item.auction_current_bidder = String::new();
    save_item(tx, &item)?;
    info!(id = %item_id, %start_price, end = item.auction_end, "mrc401 auction opened");
    Ok(())
}

/// Withdraw an auction that nobody has bid on.
pub fn unauction(tx: &mut TxStore, caller: &str, item_id: &str) -> Result<(), LedgerError> {
    let mut item = get_item(tx, item_id)?;
    if item.owner != caller {
        return Err(LedgerError::not_permitted(&format!("mrc401 {item_id}")));
    }
    if !item.on_auction() {
        return Err(LedgerError::precondition(
            codes::WRONG_STATE,
            format!("mrc401 {item_id} is not in auction"),
        ));
    }
    if !item.auction_current_bidder.is_empty() {
        return Err(LedgerError::precondition(
            codes::AUCTION_OPEN,
            format!("mrc401 {item_id} already has a bid"),
        ));
    }
    item.clear_auction();
    save_item(tx, &item)
}

/// Place a bid. The bidder is debited immediately; the previous bidder is
/// refunded. A bid equal to a set buy-now price settles at once.
pub fn bid(
    tx: &mut TxStore,
    buyer: &str,
    item_id: &str,
    amount: &Amount,
    token: i64,
    now: i64,
) -> Result<(), LedgerError> {
    let mut item = get_item(tx, item_id)?;
    if !item.on_auction() {
        return Err(LedgerError::precondition(
            codes::WRONG_STATE,
            format!("mrc401 {item_id} is not in auction"),
        ));
    }
    if now > item.auction_end {
        return Err(LedgerError::precondition(
            codes::AUCTION_CLOSED,
            format!("mrc401 {item_id} auction has ended"),
        ));
    }
    if token != item.auction_token {
        return Err(LedgerError::validation(
            codes::BAD_PARAMETER,
            format!("bid token {token} does not match auction token"),
        ));
    }
    if buyer == item.owner || buyer == item.auction_current_bidder {
        return Err(LedgerError::not_permitted(&format!("mrc401 {item_id} bid")));
    }
    check_bid_price(&item, amount)?;

    wallet_repo::debit(tx, buyer, item.auction_token, amount, now)?;
    if !item.auction_current_bidder.is_empty() {
        let prev = item.auction_current_bidder.clone();
        wallet_repo::credit(tx, &prev, item.auction_token, &item.auction_current_price, 0, now)?;
    }

    let is_buynow = !item.auction_buynow_price.is_zero() && *amount == item.auction_buynow_price;
    if is_buynow {
        settle(tx, &mut item, buyer, amount, now)?;
    } else {
        item.auction_current_price = *amount;
        item.auction_current_bidder = buyer.to_string();
        save_item(tx, &item)?;
        info!(id = %item_id, %amount, "mrc401 bid placed");
    }
    Ok(())
}

/// Settle an ended auction. No authentication: anyone may trigger
/// settlement once the end date has passed.
pub fn finish(tx: &mut TxStore, item_id: &str, now: i64) -> Result<(), LedgerError> {
    let mut item = get_item(tx, item_id)?;
    if !item.on_auction() {
        return Err(LedgerError::precondition(
            codes::WRONG_STATE,
            format!("mrc401 {item_id} is not in auction"),
        ));
    }
    if now <= item.auction_end {
        return Err(LedgerError::precondition(
            codes::AUCTION_OPEN,
            format!("mrc401 {item_id} auction is still running"),
        ));
    }
    if item.auction_current_bidder.is_empty() {
        item.clear_auction();
        save_item(tx, &item)?;
        info!(id = %item_id, "mrc401 auction lapsed without bids");
        return Ok(());
    }
    let winner = item.auction_current_bidder.clone();
    let price = item.auction_current_price;
    settle(tx, &mut item, &winner, &price, now)
}

/// Pay the seller (sale fee to the project owner), hand over the item, and
/// close the auction. The winning amount was already debited at bid time.
fn settle(
    tx: &mut TxStore,
    item: &mut Mrc401,
    winner: &str,
    price: &Amount,
    now: i64,
) -> Result<(), LedgerError> {
    let project = get_project(tx, &item.mrc400)?;
    let seller = item.owner.clone();
    pay_with_creator_fee(tx, &project.owner, &seller, item.auction_token, price, &item.sell_fee, "sellfee", now)?;

    item.owner = winner.to_string();
    item.clear_auction();
    item.last_trade_date = now;
    save_item(tx, item)?;
    info!(id = %item.id, %price, winner, "mrc401 auction settled");
    Ok(())
}

/// Split `price` between the project owner (fee) and the seller. A seller
/// who is the project owner keeps the whole price.
#[allow(clippy::too_many_arguments)]
fn pay_with_creator_fee(
    tx: &mut TxStore,
    project_owner: &str,
    seller: &str,
    token: i64,
    price: &Amount,
    fee_str: &str,
    fee_name: &str,
    now: i64,
) -> Result<(), LedgerError> {
    let fee = if seller == project_owner {
        Amount::zero()
    } else {
        price.percent_floor(fee_rate(fee_name, fee_str)?.scaled())?
    };
    let rest = price
        .checked_sub(&fee)
        .ok_or_else(LedgerError::not_enough_balance)?;
    if !fee.is_zero() {
        wallet_repo::credit(tx, project_owner, token, &fee, 0, now)?;
    }
    if !rest.is_zero() {
        wallet_repo::credit(tx, seller, token, &rest, 0, now)?;
    }
    Ok(())
}

fn check_trade_token(project: &crate::entities::Mrc400, token: i64) -> Result<(), LedgerError> {
    if !project.allows(token) {
        return Err(LedgerError::validation(
            codes::BAD_PARAMETER,
            format!("token {token} is not allowed by project {}", project.id),
        ));
    }
    Ok(())
}

fn check_bid_price(item: &Mrc401, amount: &Amount) -> Result<(), LedgerError> {
    let bad = |msg: String| LedgerError::validation(codes::INVALID_NUMBER, msg);
    if item.auction_current_bidder.is_empty() {
        if *amount < item.auction_start_price {
            return Err(bad(format!(
                "first bid must reach the start price {}",
                item.auction_start_price
            )));
        }
    } else {
        let step = amount
            .checked_sub(&item.auction_current_price)
            .filter(|d| !d.is_zero())
            .ok_or_else(|| bad("bid must exceed the current price".to_string()))?;
        if !step.is_multiple_of(&item.auction_bidding_unit) {
            return Err(bad(format!(
                "bid must step in units of {}",
                item.auction_bidding_unit
            )));
        }
    }
    if !item.auction_buynow_price.is_zero() && *amount > item.auction_buynow_price {
        return Err(bad(format!(
            "bid above the buy-now price {}",
            item.auction_buynow_price
        )));
    }
    Ok(())
}
