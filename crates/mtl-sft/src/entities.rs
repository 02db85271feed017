//! MRC402 token and DEX402 market item records.

use mtl_types::Amount;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Multi-edition token. `decimal` is always 0: units are indivisible.
/// Commission rates are percentage strings with up to 4 decimals, validated
/// at creation and parsed at the point of use.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mrc402 {
    pub id: String,
    pub creator: String,
    pub name: String,
    pub url: String,
    pub data: String,
    pub decimal: u32,
    #[serde(rename = "totalsupply")]
    pub total_supply: Amount,
    #[serde(rename = "meltedamount")]
    pub melted_amount: Amount,
    /// Per-unit reserve backing: token sn (as decimal string key) → amount
    /// escrowed per unit at creation, returned per unit on burn or melt.
    #[serde(rename = "initialreserve")]
    pub initial_reserve: BTreeMap<String, Amount>,
    #[serde(rename = "creatorcommission")]
    pub creator_commission: String,
    /// Up to five shareholders, address → commission rate.
    pub shareholder: BTreeMap<String, String>,
    #[serde(rename = "expiredate")]
    pub expire_date: i64,
    pub regdate: i64,
}

impl Mrc402 {
    /// Units melting can still reclaim.
    pub fn outstanding(&self) -> Amount {
        self.total_supply
            .checked_sub(&self.melted_amount)
            .unwrap_or_else(Amount::zero)
    }
}

/// Derived state of a DEX402 item. There is no stored status field; the
/// record's timestamps and remaining amount determine it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dex402Status {
    Sale,
    Sold,
    Canceled,
    AuctionWait,
    Auction,
    AuctionEnd,
    AuctionSettled,
}

/// DEX402 market item: a sale listing (partial fills allowed) or an auction
/// lot, never both. `auction_start_date > 0` marks the auction shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dex402 {
    pub id: String,
    pub seller: String,
    pub mrc402: String,
    pub amount: Amount,
    pub remain_amount: Amount,
    pub sell_price: Amount,
    pub sell_token: i64,
    pub sell_date: i64,
    pub cancel_date: i64,
    pub platform_address: String,
    pub platform_commission: String,
    pub auction_start_date: i64,
    pub auction_end_date: i64,
    pub auction_settled_date: i64,
    pub auction_start_price: Amount,
    pub auction_buynow_price: Amount,
    pub auction_bidding_unit: Amount,
    pub auction_current_price: Amount,
    pub auction_current_bidder: String,
    pub regdate: i64,
}

impl Dex402 {
    pub fn is_auction(&self) -> bool {
        self.auction_start_date > 0
    }

    /// Pure status derivation.
    pub fn status(&self, now: i64) -> Dex402Status {
        if self.cancel_date > 0 {
            return Dex402Status::Canceled;
        }
        if self.is_auction() {
            if self.auction_settled_date > 0 {
                Dex402Status::AuctionSettled
            } else if now < self.auction_start_date {
                Dex402Status::AuctionWait
            } else if now < self.auction_end_date {
                Dex402Status::Auction
            } else {
                Dex402Status::AuctionEnd
            }
        } else if self.remain_amount.is_zero() {
            Dex402Status::Sold
        } else {
            Dex402Status::Sale
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    pub fn sale_item() -> Dex402 {
        Dex402 {
            id: "DEX402_x".into(),
            seller: "MTs".into(),
            mrc402: "MRC402_y".into(),
            amount: Amount::parse("10").unwrap(),
            remain_amount: Amount::parse("10").unwrap(),
            sell_price: Amount::parse("5").unwrap(),
            sell_token: 0,
            sell_date: 0,
            cancel_date: 0,
            platform_address: String::new(),
            platform_commission: "0".into(),
            auction_start_date: 0,
            auction_end_date: 0,
            auction_settled_date: 0,
            auction_start_price: Amount::zero(),
            auction_buynow_price: Amount::zero(),
            auction_bidding_unit: Amount::zero(),
            auction_current_price: Amount::zero(),
            auction_current_bidder: String::new(),
            regdate: 100,
        }
    }

    #[test]
    fn test_sale_status_lattice() {
        let mut item = sale_item();
        assert_eq!(item.status(200), Dex402Status::Sale);
        item.remain_amount = Amount::zero();
        assert_eq!(item.status(200), Dex402Status::Sold);
        item.cancel_date = 300;
        assert_eq!(item.status(400), Dex402Status::Canceled);
    }

    #[test]
    fn test_auction_status_follows_clock() {
        let mut item = sale_item();
        item.auction_start_date = 1000;
        item.auction_end_date = 5000;
        assert_eq!(item.status(999), Dex402Status::AuctionWait);
        assert_eq!(item.status(1000), Dex402Status::Auction);
        assert_eq!(item.status(4999), Dex402Status::Auction);
        // the end instant itself is already past the auction
        assert_eq!(item.status(5000), Dex402Status::AuctionEnd);
        item.auction_settled_date = 5002;
        assert_eq!(item.status(6000), Dex402Status::AuctionSettled);
    }

    #[test]
    fn test_pinned_snake_case_spellings() {
        let json = serde_json::to_value(sale_item()).unwrap();
        assert_eq!(json["remain_amount"], "10");
        assert_eq!(json["auction_current_bidder"], "");
        assert!(json.get("platform_commission").is_some());
        assert!(json.get("auction_buynow_price").is_some());
    }
}
