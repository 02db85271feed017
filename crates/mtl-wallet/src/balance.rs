//! # Fungible Balance Engine
//!
//! Add, subtract, and the pending (escrow) compartment. The subtract path is
//! a greedy drain over the bucket sequence in stored order: locked buckets
//! and other tokens are skipped, the first eligible bucket is drained first,
//! and any remainder carries to the next. A drain that cannot be satisfied
//! fails with `5000,Not enough balance` and the wallet is left untouched
//! (handlers operate on staged copies).

use crate::entities::{BalanceBucket, Wallet};
use mtl_types::error::codes;
use mtl_types::{Amount, LedgerError};

impl Wallet {
    /// Sum of unlocked buckets for `token`.
    pub fn spendable(&self, token: i64, now: i64) -> Amount {
        let mut sum = Amount::zero();
        for bucket in &self.balances {
            if bucket.token == token && !bucket.is_locked(now) {
                sum = sum
                    .checked_add(&bucket.amount)
                    // Bounded by total supply per conservation; cannot overflow.
                    .unwrap_or(sum);
            }
        }
        sum
    }

    /// Credit `amount` of `token`. An `unlock_date` in the past is
    /// normalized to 0; a bucket with matching token and unlock date is
    /// topped up, otherwise a new bucket is appended.
    pub fn add_balance(
        &mut self,
        token: i64,
        amount: &Amount,
        unlock_date: i64,
        now: i64,
    ) -> Result<(), LedgerError> {
        let unlock_date = if unlock_date < now { 0 } else { unlock_date };
        for bucket in &mut self.balances {
            if bucket.token == token && bucket.unlock_date == unlock_date {
                bucket.amount = bucket.amount.checked_add(amount)?;
                return Ok(());
            }
        }
        self.balances
            .push(BalanceBucket::new(token, *amount, unlock_date));
        Ok(())
    }

    /// Debit `amount` of `token` from spendable buckets, greedily in stored
    /// order. Zeroed non-native buckets are cleaned out of the sequence.
    pub fn subtract_balance(
        &mut self,
        token: i64,
        amount: &Amount,
        now: i64,
    ) -> Result<(), LedgerError> {
        let mut remaining = *amount;
        let mut drained_zero = false;
        for bucket in &mut self.balances {
            if remaining.is_zero() {
                break;
            }
            if bucket.token != token || bucket.is_locked(now) {
                continue;
            }
            match bucket.amount.checked_sub(&remaining) {
                Some(left) => {
                    bucket.amount = left;
                    remaining = Amount::zero();
                    if left.is_zero() && bucket.token != 0 {
                        drained_zero = true;
                    }
                }
                None => {
                    remaining = remaining
                        .checked_sub(&bucket.amount)
                        .expect("remaining covers drained bucket");
                    bucket.amount = Amount::zero();
                    if bucket.token != 0 {
                        drained_zero = true;
                    }
                }
            }
        }
        if !remaining.is_zero() {
            return Err(LedgerError::not_enough_balance());
        }
        if drained_zero {
            self.clean_balances();
        }
        Ok(())
    }

    /// Drop all zero buckets except the native token's.
    pub fn clean_balances(&mut self) {
        self.balances
            .retain(|b| b.token == 0 || !b.amount.is_zero());
    }

    // --- pending (DEX escrow) ----------------------------------------------

    pub fn pending_of(&self, token: i64) -> Amount {
        self.pending
            .get(&token.to_string())
            .copied()
            .unwrap_or_default()
    }

    pub fn add_pending(&mut self, token: i64, amount: &Amount) -> Result<(), LedgerError> {
        let key = token.to_string();
        let current = self.pending.get(&key).copied().unwrap_or_default();
        let next = current.checked_add(amount)?;
        if next.is_zero() {
            self.pending.remove(&key);
        } else {
            self.pending.insert(key, next);
        }
        Ok(())
    }

    pub fn subtract_pending(&mut self, token: i64, amount: &Amount) -> Result<(), LedgerError> {
        let key = token.to_string();
        let current = self.pending.get(&key).copied().unwrap_or_default();
        let next = current.checked_sub(amount).ok_or_else(|| {
            LedgerError::resource(codes::NOT_ENOUGH_PENDING, "Not enough pending balance")
        })?;
        if next.is_zero() {
            self.pending.remove(&key);
        } else {
            self.pending.insert(key, next);
        }
        Ok(())
    }

    // --- MRC800 -------------------------------------------------------------

    pub fn mrc800_of(&self, id: &str) -> Amount {
        self.mrc800_balances.get(id).copied().unwrap_or_default()
    }

    pub fn add_mrc800(&mut self, id: &str, amount: &Amount) -> Result<(), LedgerError> {
        let next = self.mrc800_of(id).checked_add(amount)?;
        if next.is_zero() {
            self.mrc800_balances.remove(id);
        } else {
            self.mrc800_balances.insert(id.to_string(), next);
        }
        Ok(())
    }

    pub fn subtract_mrc800(&mut self, id: &str, amount: &Amount) -> Result<(), LedgerError> {
        let next = self
            .mrc800_of(id)
            .checked_sub(amount)
            .ok_or_else(LedgerError::not_enough_balance)?;
        if next.is_zero() {
            self.mrc800_balances.remove(id);
        } else {
            self.mrc800_balances.insert(id.to_string(), next);
        }
        Ok(())
    }
}
