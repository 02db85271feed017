//! Wallet entity. The JSON spellings here are a compatibility contract with
//! previously persisted state; do not rename fields.

use mtl_types::Amount;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One fungible balance bucket. Buckets for the same token may coexist with
/// different unlock dates; order is insertion order and is preserved across
/// writes (the greedy drain in `balance.rs` depends on it).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceBucket {
    #[serde(rename = "tokenId")]
    pub token: i64,
    pub amount: Amount,
    #[serde(rename = "unlockDate")]
    pub unlock_date: i64,
}

impl BalanceBucket {
    pub fn new(token: i64, amount: Amount, unlock_date: i64) -> Self {
        Self {
            token,
            amount,
            unlock_date,
        }
    }

    /// Frozen buckets cannot be drained.
    pub fn is_locked(&self, now: i64) -> bool {
        self.unlock_date > now
    }
}

/// MRC402 holdings split into market compartments. The sum of the three is
/// the wallet's total holding of that token.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct NftSubBalance {
    pub free: Amount,
    #[serde(rename = "onSale")]
    pub on_sale: Amount,
    #[serde(rename = "onAuction")]
    pub on_auction: Amount,
}

impl NftSubBalance {
    pub fn is_empty(&self) -> bool {
        self.free.is_zero() && self.on_sale.is_zero() && self.on_auction.is_zero()
    }

    pub fn total(&self) -> Amount {
        self.free
            .checked_add(&self.on_sale)
            .and_then(|s| s.checked_add(&self.on_auction))
            // Compartments are bounded by total supply; this cannot overflow.
            .unwrap_or_default()
    }
}

/// Record of the last authenticated operation on the wallet.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LastJob {
    #[serde(rename = "type")]
    pub job_type: String,
    pub args: String,
    pub date: i64,
}

/// A wallet. Created once, never deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Wallet {
    pub id: String,
    #[serde(rename = "publicKey")]
    pub public_key: String,
    pub nonce: String,
    pub regdate: i64,
    #[serde(rename = "lastJob")]
    pub last_job: LastJob,
    pub balances: Vec<BalanceBucket>,
    pub pending: BTreeMap<String, Amount>,
    #[serde(rename = "nftBalances")]
    pub nft_balances: BTreeMap<String, NftSubBalance>,
    #[serde(rename = "mrc800Balances")]
    pub mrc800_balances: BTreeMap<String, Amount>,
}

impl Wallet {
    /// Fresh wallet with the retained zero bucket for the native token.
    pub fn new(id: String, public_key: String, nonce: String, regdate: i64) -> Self {
        Self {
            id,
            public_key,
            nonce,
            regdate,
            last_job: LastJob::default(),
            balances: vec![BalanceBucket::new(0, Amount::zero(), 0)],
            pending: BTreeMap::new(),
            nft_balances: BTreeMap::new(),
            mrc800_balances: BTreeMap::new(),
        }
    }

    pub fn record_job(&mut self, job_type: &str, args: &str, date: i64) {
        self.last_job = LastJob {
            job_type: job_type.to_string(),
            args: args.to_string(),
            date,
        };
    }
}
