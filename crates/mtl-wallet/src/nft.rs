//! # MRC402 Sub-Balance Operations
//!
//! Per-token holdings are split into three compartments. Listing for sale
//! moves `free → onSale`, starting an auction moves `free → onAuction`;
//! cancels, refunds, and auction failures move back. A trade credits the
//! buyer's `free` and debits the seller's market compartment. An entry whose
//! compartments are all zero is deleted from the wallet.

use crate::entities::{NftSubBalance, Wallet};
use mtl_types::{Amount, LedgerError};

/// The three MRC402 compartments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Compartment {
    Free,
    OnSale,
    OnAuction,
}

impl NftSubBalance {
    fn get(&self, c: Compartment) -> Amount {
        match c {
            Compartment::Free => self.free,
            Compartment::OnSale => self.on_sale,
            Compartment::OnAuction => self.on_auction,
        }
    }

    fn set(&mut self, c: Compartment, v: Amount) {
        match c {
            Compartment::Free => self.free = v,
            Compartment::OnSale => self.on_sale = v,
            Compartment::OnAuction => self.on_auction = v,
        }
    }
}

impl Wallet {
    pub fn nft_balance(&self, id: &str) -> NftSubBalance {
        self.nft_balances.get(id).cloned().unwrap_or_default()
    }

    /// Credit `amount` into one compartment of `id`.
    pub fn nft_add(
        &mut self,
        id: &str,
        compartment: Compartment,
        amount: &Amount,
    ) -> Result<(), LedgerError> {
        let mut sub = self.nft_balance(id);
        let next = sub.get(compartment).checked_add(amount)?;
        sub.set(compartment, next);
        self.store_nft(id, sub);
        Ok(())
    }

    /// Debit `amount` from one compartment of `id`; fails with
    /// `5000,Not enough balance` when the compartment is short.
    pub fn nft_subtract(
        &mut self,
        id: &str,
        compartment: Compartment,
        amount: &Amount,
    ) -> Result<(), LedgerError> {
        let mut sub = self.nft_balance(id);
        let next = sub
            .get(compartment)
            .checked_sub(amount)
            .ok_or_else(LedgerError::not_enough_balance)?;
        sub.set(compartment, next);
        self.store_nft(id, sub);
        Ok(())
    }

    /// Move `amount` between two compartments of the same wallet (listing,
    /// unlisting, auction start/failure).
    pub fn nft_move(
        &mut self,
        id: &str,
        from: Compartment,
        to: Compartment,
        amount: &Amount,
    ) -> Result<(), LedgerError> {
        let mut sub = self.nft_balance(id);
        let debited = sub
            .get(from)
            .checked_sub(amount)
            .ok_or_else(LedgerError::not_enough_balance)?;
        sub.set(from, debited);
        let credited = sub.get(to).checked_add(amount)?;
        sub.set(to, credited);
        self.store_nft(id, sub);
        Ok(())
    }

    fn store_nft(&mut self, id: &str, sub: NftSubBalance) {
        if sub.is_empty() {
            self.nft_balances.remove(id);
        } else {
            self.nft_balances.insert(id.to_string(), sub);
        }
    }
}
