//! MRC010 entity. JSON spellings are pinned (`totalsupply`, `burntamount`,
//! `basetoken`, `targettokens`).

use mtl_types::Amount;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// One initial-distribution entry in a `TokenRegister` payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenReserve {
    pub address: String,
    pub amount: Amount,
    #[serde(rename = "unlockdate", default)]
    pub unlock_date: i64,
}

/// A fungible token record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mrc010 {
    pub id: i64,
    pub owner: String,
    pub symbol: String,
    pub name: String,
    pub decimal: u32,
    #[serde(rename = "totalsupply")]
    pub total_supply: Amount,
    #[serde(rename = "burntamount")]
    pub burnt_amount: Amount,
    #[serde(rename = "basetoken")]
    pub base_token: i64,
    #[serde(rename = "targettokens")]
    pub target_tokens: BTreeSet<i64>,
    pub loggers: BTreeMap<String, i64>,
    #[serde(rename = "type")]
    pub token_type: String,
    pub url: String,
    pub info: String,
    pub image: String,
    pub regdate: i64,
}

impl Mrc010 {
    /// Circulating supply (`totalsupply - burntamount`).
    pub fn circulating(&self) -> Amount {
        self.total_supply
            .checked_sub(&self.burnt_amount)
            // burnt never exceeds total; enforced by `registry::burn`
            .unwrap_or_default()
    }

    /// Is `caller` allowed to append MRC100 log records?
    pub fn may_log(&self, caller: &str) -> bool {
        self.owner == caller || self.loggers.contains_key(caller)
    }
}
