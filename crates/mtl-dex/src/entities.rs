//! MRC040 item and exchange-result records.

use mtl_types::Amount;
use serde::{Deserialize, Serialize};

/// Which side of the pair the item's owner is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Side {
    Sell,
    Buy,
}

impl Side {
    pub fn parse(s: &str) -> Option<Side> {
        match s {
            "SELL" => Some(Side::Sell),
            "BUY" => Some(Side::Buy),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Status {
    Wait,
    Trading,
    Complete,
    Cancel,
}

/// A DEX item. `price` is in smallest base units per `10^target.decimal`
/// target units; `remainqtt` tracks the unfilled quantity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mrc040 {
    pub id: String,
    pub owner: String,
    pub side: Side,
    #[serde(rename = "basetoken")]
    pub base_token: i64,
    #[serde(rename = "targettoken")]
    pub target_token: i64,
    pub price: Amount,
    pub qtt: Amount,
    #[serde(rename = "remainqtt")]
    pub remain_qtt: Amount,
    pub status: Status,
    pub regdate: i64,
    #[serde(rename = "completedate")]
    pub complete_date: i64,
    #[serde(rename = "canceldate")]
    pub cancel_date: i64,
}

impl Mrc040 {
    pub fn is_open(&self) -> bool {
        matches!(self.status, Status::Wait | Status::Trading)
    }

    /// Which token the owner's escrow is held in.
    pub fn escrow_token(&self) -> i64 {
        match self.side {
            Side::Sell => self.target_token,
            Side::Buy => self.base_token,
        }
    }
}

/// Persisted record of a single fill, keyed by the caller-provided
/// `exchangePK`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExchangeResult {
    pub id: String,
    pub mrc040: String,
    pub owner: String,
    pub requester: String,
    pub qtt: Amount,
    pub price: Amount,
    #[serde(rename = "basetoken")]
    pub base_token: i64,
    #[serde(rename = "targettoken")]
    pub target_token: i64,
    pub regdate: i64,
}
