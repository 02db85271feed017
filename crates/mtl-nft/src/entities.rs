//! MRC400 project and MRC401 item records.

use mtl_types::error::codes;
use mtl_types::{Amount, LedgerError};
use serde::{Deserialize, Serialize};

/// Terminal owner sentinel for melted items.
pub const MELTED_OWNER: &str = "MELTED";

/// NFT project: the policy record all of its items trade under.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mrc400 {
    pub id: String,
    pub owner: String,
    pub name: String,
    pub url: String,
    #[serde(rename = "imageurl")]
    pub image_url: String,
    /// Token items in this project are priced in; `0` (native) is always
    /// additionally accepted.
    #[serde(rename = "allowtoken")]
    pub allow_token: i64,
    #[serde(rename = "itemurl")]
    pub item_url: String,
    #[serde(rename = "itemimageurl")]
    pub item_image_url: String,
    pub category: String,
    pub description: String,
    pub partner: String,
    pub data: String,
    pub regdate: i64,
}

impl Mrc400 {
    /// `0` (native) or the project's declared token.
    pub fn allows(&self, token: i64) -> bool {
        token == 0 || token == self.allow_token
    }
}

/// Transfer policy of an item. `Temprary` keeps the original record's
/// spelling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Transferable {
    Permanent,
    Bound,
    Temprary,
}

impl Transferable {
    pub fn parse(s: &str) -> Option<Transferable> {
        match s {
            "Permanent" => Some(Transferable::Permanent),
            "Bound" => Some(Transferable::Bound),
            "Temprary" => Some(Transferable::Temprary),
            _ => None,
        }
    }
}

/// Single-edition NFT item. Ownership is the `owner` field; the wallet is
/// only involved when the item's price or reserve moves.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mrc401 {
    pub id: String,
    pub mrc400: String,
    pub owner: String,
    #[serde(rename = "itemurl")]
    pub item_url: String,
    #[serde(rename = "itemimageurl")]
    pub item_image_url: String,
    #[serde(rename = "groupid")]
    pub group_id: String,
    #[serde(rename = "initialtoken")]
    pub initial_token: i64,
    #[serde(rename = "initialreserve")]
    pub initial_reserve: Amount,
    /// Percentage string with up to 4 decimals, parsed at the point of use.
    #[serde(rename = "meltingfee")]
    pub melting_fee: String,
    #[serde(rename = "meltingdate")]
    pub melting_date: i64,
    pub transferable: Transferable,
    #[serde(rename = "sellfee")]
    pub sell_fee: String,
    #[serde(rename = "selldate")]
    pub sell_date: i64,
    #[serde(rename = "sellprice")]
    pub sell_price: Amount,
    #[serde(rename = "selltoken")]
    pub sell_token: i64,
    #[serde(rename = "auctiondate")]
    pub auction_date: i64,
    #[serde(rename = "auctionend")]
    pub auction_end: i64,
    #[serde(rename = "auctiontoken")]
    pub auction_token: i64,
    #[serde(rename = "auctionbiddingunit")]
    pub auction_bidding_unit: Amount,
    #[serde(rename = "auctionstartprice")]
    pub auction_start_price: Amount,
    #[serde(rename = "auctionbuynowprice")]
    pub auction_buynow_price: Amount,
    #[serde(rename = "auctioncurrentprice")]
    pub auction_current_price: Amount,
    #[serde(rename = "auctioncurrentbidder")]
    pub auction_current_bidder: String,
    #[serde(rename = "lasttradedate")]
    pub last_trade_date: i64,
    #[serde(rename = "jsonmeta")]
    pub json_meta: String,
}

impl Mrc401 {
    pub fn is_melted(&self) -> bool {
        self.owner == MELTED_OWNER
    }

    pub fn on_sale(&self) -> bool {
        self.sell_date > 0
    }

    pub fn on_auction(&self) -> bool {
        self.auction_date > 0
    }

    /// Idle = owned, not listed, not in auction, not melted. Every mode
    /// change starts from here.
    pub fn require_idle(&self) -> Result<(), LedgerError> {
        if self.is_melted() {
            return Err(LedgerError::already_melted());
        }
        if self.on_sale() {
            return Err(LedgerError::precondition(
                codes::ALREADY_SOLD,
                format!("mrc401 {} is on sale", self.id),
            ));
        }
        if self.on_auction() {
            return Err(LedgerError::precondition(
                codes::AUCTION_OPEN,
                format!("mrc401 {} is in auction", self.id),
            ));
        }
        Ok(())
    }

    pub fn clear_sale(&mut self) {
        self.sell_date = 0;
        self.sell_price = Amount::zero();
        self.sell_token = 0;
    }

    pub fn clear_auction(&mut self) {
        self.auction_date = 0;
        self.auction_end = 0;
        self.auction_token = 0;
        self.auction_bidding_unit = Amount::zero();
        self.auction_start_price = Amount::zero();
        self.auction_buynow_price = Amount::zero();
        self.auction_current_price = Amount::zero();
        self.auction_current_bidder = String::new();
    }
}
