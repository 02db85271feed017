//! DEX402 market: partial-fill sale and English auction over MRC402 units.
//!
//! Listing moves the seller's units `free → onSale` (or `onAuction`); the
//! units come back on cancel or lapse, and move to the buyer's `free` on a
//! fill or settlement. All settlement money runs through [`distribute`],
//! which aggregates the commission splits per address before crediting, so
//! aliased parties (a seller who is also a shareholder) are paid once with
//! their combined share.

use crate::entities::{Dex402, Dex402Status, Mrc402};
use crate::token::{commission, get_mrc402};
use mtl_store::{keys, TxStore};
use mtl_types::error::codes;
use mtl_types::{check_address, derive_id, Amount, LedgerError};
use mtl_wallet::nft::Compartment;
use mtl_wallet::repo as wallet_repo;
use std::collections::BTreeMap;
use tracing::info;

/// Longest a DEX402 auction start may be deferred; also the longest run
/// time past the start. Same 1h/21d window the NFT market uses.
pub const AUCTION_MIN_SECS: i64 = 3_600;
pub const AUCTION_MAX_SECS: i64 = 1_814_400;

pub fn get_item(tx: &TxStore, id: &str) -> Result<Dex402, LedgerError> {
    keys::check_prefixed_key("dex402", keys::DEX402_PREFIX, id)?;
    tx.get_json::<Dex402>(id)?
        .ok_or_else(|| LedgerError::not_found(&format!("dex402 {id}")))
}

fn save_item(tx: &mut TxStore, item: &Dex402) -> Result<(), LedgerError> {
    tx.put_json(&item.id, item)
}

/// List `amount` units at `price` per unit. Units move `free → onSale`.
#[allow(clippy::too_many_arguments)]
pub fn sell(
    tx: &mut TxStore,
    seller: &str,
    mrc402_id: &str,
    amount: &Amount,
    price: &Amount,
    token: i64,
    platform_address: &str,
    platform_commission: &str,
    salt: &str,
    now: i64,
) -> Result<String, LedgerError> {
    get_mrc402(tx, mrc402_id)?;
    check_positive("amount", amount)?;
    check_positive("price", price)?;
    let platform_commission = check_platform(tx, platform_address, platform_commission)?;
    if token != 0 {
        mtl_token::registry::get_token(tx, token)?;
    }

    let id = derive_id(keys::DEX402_PREFIX, &[seller, &now.to_string(), salt])?;
    if tx.exists(&id)? {
        return Err(LedgerError::existence(
            codes::DUPLICATE_KEY,
            format!("dex402 {id} already exists"),
        ));
    }
    wallet_repo::nft_move(tx, seller, mrc402_id, Compartment::Free, Compartment::OnSale, amount)?;

    let item = Dex402 {
        id: id.clone(),
        seller: seller.to_string(),
        mrc402: mrc402_id.to_string(),
        amount: *amount,
        remain_amount: *amount,
        sell_price: *price,
        sell_token: token,
        sell_date: 0,
        cancel_date: 0,
        platform_address: platform_address.to_string(),
        platform_commission,
        auction_start_date: 0,
        auction_end_date: 0,
        auction_settled_date: 0,
        auction_start_price: Amount::zero(),
        auction_buynow_price: Amount::zero(),
        auction_bidding_unit: Amount::zero(),
        auction_current_price: Amount::zero(),
        auction_current_bidder: String::new(),
        regdate: now,
    };
    save_item(tx, &item)?;
    info!(id = %id, %amount, %price, "dex402 listed");
    Ok(id)
}

/// Withdraw an open sale listing; remaining units return `onSale → free`.
pub fn unsell(tx: &mut TxStore, caller: &str, item_id: &str, now: i64) -> Result<(), LedgerError> {
    let mut item = get_item(tx, item_id)?;
    if item.seller != caller {
        return Err(LedgerError::not_permitted(&format!("dex402 {item_id}")));
    }
    require_status(&item, now, Dex402Status::Sale)?;
    wallet_repo::nft_move(
        tx,
        caller,
        &item.mrc402,
        Compartment::OnSale,
        Compartment::Free,
        &item.remain_amount,
    )?;
    item.cancel_date = now;
    save_item(tx, &item)?;
    info!(id = %item_id, "dex402 unlisted");
    Ok(())
}

/// Buy `amount` units of a sale listing. Partial fills allowed; the listing
/// is sold out when `remain_amount` reaches zero.
pub fn buy(
    tx: &mut TxStore,
    buyer: &str,
    item_id: &str,
    amount: &Amount,
    now: i64,
) -> Result<(), LedgerError> {
    let mut item = get_item(tx, item_id)?;
    require_status(&item, now, Dex402Status::Sale)?;
    if buyer == item.seller {
        return Err(LedgerError::not_permitted(&format!("dex402 {item_id}")));
    }
    let remain_after = match item.remain_amount.checked_sub(amount) {
        Some(r) if !amount.is_zero() => r,
        _ => {
            return Err(LedgerError::validation(
                codes::BAD_PARAMETER,
                "buy amount exceeds remaining",
            ))
        }
    };
    let token = get_mrc402(tx, &item.mrc402)?;
    let payment = item.sell_price.checked_mul(amount)?;

    wallet_repo::debit(tx, buyer, item.sell_token, &payment, now)?;
    distribute(tx, &token, &item, &payment, now)?;
    wallet_repo::nft_debit(tx, &item.seller, &item.mrc402, Compartment::OnSale, amount)?;
    wallet_repo::nft_credit(tx, buyer, &item.mrc402, Compartment::Free, amount)?;

    item.remain_amount = remain_after;
    if item.remain_amount.is_zero() {
        item.sell_date = now;
    }
    save_item(tx, &item)?;
    info!(id = %item_id, %amount, %payment, "dex402 filled");
    Ok(())
}

/// Open an auction lot. The start may lie in the future; the lot waits in
/// `AUCTION_WAIT` until the clock reaches it.
#[allow(clippy::too_many_arguments)]
pub fn auction(
    tx: &mut TxStore,
    seller: &str,
    mrc402_id: &str,
    amount: &Amount,
    start_price: &Amount,
    buynow_price: &Amount,
    bidding_unit: &Amount,
    token: i64,
    start_date: i64,
    end_date: i64,
    platform_address: &str,
    platform_commission: &str,
    salt: &str,
    now: i64,
) -> Result<String, LedgerError> {
    get_mrc402(tx, mrc402_id)?;
    check_positive("amount", amount)?;
    check_positive("start price", start_price)?;
    check_positive("bidding unit", bidding_unit)?;
    if !buynow_price.is_zero() && buynow_price < start_price {
        return Err(LedgerError::validation(
            codes::INVALID_NUMBER,
            "buy-now price below start price",
        ));
    }
    let platform_commission = check_platform(tx, platform_address, platform_commission)?;
    if token != 0 {
        mtl_token::registry::get_token(tx, token)?;
    }
    let start = start_date.clamp(now, now + AUCTION_MAX_SECS);
    let end = end_date.clamp(start + AUCTION_MIN_SECS, start + AUCTION_MAX_SECS);

    let id = derive_id(keys::DEX402_PREFIX, &[seller, &now.to_string(), salt])?;
    if tx.exists(&id)? {
        return Err(LedgerError::existence(
            codes::DUPLICATE_KEY,
            format!("dex402 {id} already exists"),
        ));
    }
    wallet_repo::nft_move(tx, seller, mrc402_id, Compartment::Free, Compartment::OnAuction, amount)?;

    let item = Dex402 {
        id: id.clone(),
        seller: seller.to_string(),
        mrc402: mrc402_id.to_string(),
        amount: *amount,
        remain_amount: *amount,
        sell_price: Amount::zero(),
        sell_token: token,
        sell_date: 0,
        cancel_date: 0,
        platform_address: platform_address.to_string(),
        platform_commission,
        auction_start_date: start,
        auction_end_date: end,
        auction_settled_date: 0,
        auction_start_price: *start_price,
        auction_buynow_price: *buynow_price,
        auction_bidding_unit: *bidding_unit,
        auction_current_price: Amount::zero(),
        auction_current_bidder: String::new(),
        regdate: now,
    };
    save_item(tx, &item)?;
    info!(id = %id, %amount, start, end, "dex402 auction opened");
    Ok(id)
}

/// Withdraw an auction that nobody has bid on.
pub fn unauction(tx: &mut TxStore, caller: &str, item_id: &str, now: i64) -> Result<(), LedgerError> {
    let mut item = get_item(tx, item_id)?;
    if item.seller != caller {
        return Err(LedgerError::not_permitted(&format!("dex402 {item_id}")));
    }
    match item.status(now) {
        Dex402Status::AuctionWait | Dex402Status::Auction | Dex402Status::AuctionEnd => {}
        other => {
            return Err(LedgerError::precondition(
                codes::WRONG_STATE,
                format!("dex402 {item_id} is {other:?}"),
            ))
        }
    }
    if !item.auction_current_bidder.is_empty() {
        return Err(LedgerError::precondition(
            codes::AUCTION_OPEN,
            format!("dex402 {item_id} already has a bid"),
        ));
    }
    wallet_repo::nft_move(
        tx,
        caller,
        &item.mrc402,
        Compartment::OnAuction,
        Compartment::Free,
        &item.remain_amount,
    )?;
    item.cancel_date = now;
    save_item(tx, &item)?;
    info!(id = %item_id, "dex402 auction withdrawn");
    Ok(())
}

/// Place a bid on a running auction. The winning bid claims the whole
/// remaining lot. A bid equal to a set buy-now price settles at once.
pub fn bid(
    tx: &mut TxStore,
    buyer: &str,
    item_id: &str,
    price: &Amount,
    token: i64,
    now: i64,
) -> Result<(), LedgerError> {
    let mut item = get_item(tx, item_id)?;
    match item.status(now) {
        Dex402Status::Auction => {}
        Dex402Status::AuctionWait => {
            return Err(LedgerError::precondition(
                codes::WRONG_STATE,
                format!("dex402 {item_id} auction has not started"),
            ))
        }
        Dex402Status::AuctionEnd | Dex402Status::AuctionSettled => {
            return Err(LedgerError::precondition(
                codes::AUCTION_CLOSED,
                format!("dex402 {item_id} auction has ended"),
            ))
        }
        other => {
            return Err(LedgerError::precondition(
                codes::WRONG_STATE,
                format!("dex402 {item_id} is {other:?}"),
            ))
        }
    }
    if token != item.sell_token {
        return Err(LedgerError::validation(
            codes::BAD_PARAMETER,
            format!("bid token {token} does not match auction token"),
        ));
    }
    if buyer == item.seller || buyer == item.auction_current_bidder {
        return Err(LedgerError::not_permitted(&format!("dex402 {item_id} bid")));
    }
    check_bid_price(&item, price)?;

    wallet_repo::debit(tx, buyer, item.sell_token, price, now)?;
    if !item.auction_current_bidder.is_empty() {
        let prev = item.auction_current_bidder.clone();
        wallet_repo::credit(tx, &prev, item.sell_token, &item.auction_current_price, 0, now)?;
    }

    let is_buynow = !item.auction_buynow_price.is_zero() && *price == item.auction_buynow_price;
    if is_buynow {
        settle(tx, &mut item, buyer, price, now)?;
    } else {
        item.auction_current_price = *price;
        item.auction_current_bidder = buyer.to_string();
        save_item(tx, &item)?;
        info!(id = %item_id, %price, "dex402 bid placed");
    }
    Ok(())
}

/// Settle an ended auction; anyone may call once `now` is past the end.
/// Without bids the lot simply returns to the seller.
pub fn finish(tx: &mut TxStore, item_id: &str, now: i64) -> Result<(), LedgerError> {
    let mut item = get_item(tx, item_id)?;
    match item.status(now) {
        Dex402Status::AuctionEnd => {}
        Dex402Status::AuctionWait | Dex402Status::Auction => {
            return Err(LedgerError::precondition(
                codes::AUCTION_OPEN,
                format!("dex402 {item_id} auction is still running"),
            ))
        }
        other => {
            return Err(LedgerError::precondition(
                codes::WRONG_STATE,
                format!("dex402 {item_id} is {other:?}"),
            ))
        }
    }
    if item.auction_current_bidder.is_empty() {
        wallet_repo::nft_move(
            tx,
            &item.seller,
            &item.mrc402,
            Compartment::OnAuction,
            Compartment::Free,
            &item.remain_amount,
        )?;
        item.auction_settled_date = now;
        save_item(tx, &item)?;
        info!(id = %item_id, "dex402 auction lapsed without bids");
        return Ok(());
    }
    let winner = item.auction_current_bidder.clone();
    let price = item.auction_current_price;
    settle(tx, &mut item, &winner, &price, now)
}

/// Pay out the winning amount and hand the remaining lot to the winner.
fn settle(
    tx: &mut TxStore,
    item: &mut Dex402,
    winner: &str,
    price: &Amount,
    now: i64,
) -> Result<(), LedgerError> {
    let token = get_mrc402(tx, &item.mrc402)?;
    distribute(tx, &token, item, price, now)?;
    let lot = item.remain_amount;
    wallet_repo::nft_debit(tx, &item.seller, &item.mrc402, Compartment::OnAuction, &lot)?;
    wallet_repo::nft_credit(tx, winner, &item.mrc402, Compartment::Free, &lot)?;

    item.remain_amount = Amount::zero();
    item.auction_settled_date = now;
    item.auction_current_price = *price;
    item.auction_current_bidder = winner.to_string();
    save_item(tx, item)?;
    info!(id = %item.id, %price, winner, "dex402 auction settled");
    Ok(())
}

/// The payment reducer. Commission splits are floor-truncated and
/// aggregated per address; the seller receives the remainder, so every
/// rounding residue stays on the seller's side and the sum of the credits
/// always equals `payment`.
fn distribute(
    tx: &mut TxStore,
    token: &Mrc402,
    item: &Dex402,
    payment: &Amount,
    now: i64,
) -> Result<(), LedgerError> {
    let mut shares: BTreeMap<String, Amount> = BTreeMap::new();
    let mut add_share = |address: &str, amount: Amount| -> Result<(), LedgerError> {
        if amount.is_zero() {
            return Ok(());
        }
        let slot = shares.entry(address.to_string()).or_insert_with(Amount::zero);
        *slot = slot.checked_add(&amount)?;
        Ok(())
    };

    let mut fees = Amount::zero();
    let creator_fee =
        payment.percent_floor(commission("creatorcommission", &token.creator_commission)?.scaled())?;
    add_share(&token.creator, creator_fee)?;
    fees = fees.checked_add(&creator_fee)?;

    if !item.platform_address.is_empty() {
        let platform_fee = payment
            .percent_floor(commission("platform_commission", &item.platform_commission)?.scaled())?;
        add_share(&item.platform_address, platform_fee)?;
        fees = fees.checked_add(&platform_fee)?;
    }

    for (address, rate) in &token.shareholder {
        let share = payment.percent_floor(commission("shareholder commission", rate)?.scaled())?;
        add_share(address, share)?;
        fees = fees.checked_add(&share)?;
    }

    let seller_take = payment
        .checked_sub(&fees)
        .ok_or_else(LedgerError::not_enough_balance)?;
    add_share(&item.seller, seller_take)?;

    for (address, amount) in shares {
        wallet_repo::credit(tx, &address, item.sell_token, &amount, 0, now)?;
    }
    Ok(())
}

fn check_bid_price(item: &Dex402, price: &Amount) -> Result<(), LedgerError> {
    let bad = |msg: String| LedgerError::validation(codes::INVALID_NUMBER, msg);
    if item.auction_current_bidder.is_empty() {
        if *price < item.auction_start_price {
            return Err(bad(format!(
                "first bid must reach the start price {}",
                item.auction_start_price
            )));
        }
    } else {
        let floor = item.auction_current_price.checked_add(&item.auction_bidding_unit)?;
        if *price < floor {
            return Err(bad(format!("bid must reach {floor}")));
        }
    }
    if !item.auction_buynow_price.is_zero() && *price > item.auction_buynow_price {
        return Err(bad(format!(
            "bid above the buy-now price {}",
            item.auction_buynow_price
        )));
    }
    Ok(())
}

fn check_platform(
    tx: &TxStore,
    address: &str,
    rate: &str,
) -> Result<String, LedgerError> {
    if address.is_empty() {
        return Ok("0".to_string());
    }
    check_address(address)?;
    if !wallet_repo::exists(tx, address)? {
        return Err(LedgerError::existence(
            codes::DATA_NOT_FOUND,
            format!("wallet not found {address}"),
        ));
    }
    let rate = if rate.is_empty() { "0" } else { rate };
    commission("platform_commission", rate)?;
    Ok(rate.to_string())
}

fn check_positive(name: &str, amount: &Amount) -> Result<(), LedgerError> {
    if amount.is_zero() {
        return Err(LedgerError::validation(
            codes::INVALID_NUMBER,
            format!("{name} must be positive"),
        ));
    }
    Ok(())
}

fn require_status(item: &Dex402, now: i64, want: Dex402Status) -> Result<(), LedgerError> {
    let got = item.status(now);
    if got != want {
        return Err(LedgerError::precondition(
            codes::WRONG_STATE,
            format!("dex402 {} is {got:?}", item.id),
        ));
    }
    Ok(())
}
