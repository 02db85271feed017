//! Wallet persistence helpers over the staged store. Wallets are keyed by
//! their address; every load validates the checksum first.

use crate::entities::Wallet;
use mtl_store::TxStore;
use mtl_types::error::codes;
use mtl_types::{check_address, LedgerError};

/// Load a wallet or fail with `3002,wallet not found …`.
pub fn load(tx: &TxStore, address: &str) -> Result<Wallet, LedgerError> {
    check_address(address)?;
    tx.get_json::<Wallet>(address)?.ok_or_else(|| {
        LedgerError::existence(codes::DATA_NOT_FOUND, format!("wallet not found {address}"))
    })
}

pub fn exists(tx: &TxStore, address: &str) -> Result<bool, LedgerError> {
    tx.exists(address)
}

/// Stage the wallet under its own address.
pub fn save(tx: &mut TxStore, wallet: &Wallet) -> Result<(), LedgerError> {
    tx.put_json(&wallet.id, wallet)
}

// --- alias-safe single-step mutations ---------------------------------------
//
// Market handlers move value between several addresses that may alias (a fee
// recipient can be the payer). Each helper is a full load-modify-save against
// the staged overlay, so a later step always observes an earlier step's
// effect on the same address.

/// Credit `amount` of `token`, optionally time-locked.
pub fn credit(
    tx: &mut TxStore,
    address: &str,
    token: i64,
    amount: &mtl_types::Amount,
    unlock_date: i64,
    now: i64,
) -> Result<(), LedgerError> {
    let mut wallet = load(tx, address)?;
    wallet.add_balance(token, amount, unlock_date, now)?;
    save(tx, &wallet)
}

/// Debit `amount` of `token` from spendable buckets.
pub fn debit(
    tx: &mut TxStore,
    address: &str,
    token: i64,
    amount: &mtl_types::Amount,
    now: i64,
) -> Result<(), LedgerError> {
    let mut wallet = load(tx, address)?;
    wallet.subtract_balance(token, amount, now)?;
    save(tx, &wallet)
}

pub fn credit_pending(
    tx: &mut TxStore,
    address: &str,
    token: i64,
    amount: &mtl_types::Amount,
) -> Result<(), LedgerError> {
    let mut wallet = load(tx, address)?;
    wallet.add_pending(token, amount)?;
    save(tx, &wallet)
}

pub fn debit_pending(
    tx: &mut TxStore,
    address: &str,
    token: i64,
    amount: &mtl_types::Amount,
) -> Result<(), LedgerError> {
    let mut wallet = load(tx, address)?;
    wallet.subtract_pending(token, amount)?;
    save(tx, &wallet)
}

pub fn nft_credit(
    tx: &mut TxStore,
    address: &str,
    id: &str,
    compartment: crate::nft::Compartment,
    amount: &mtl_types::Amount,
) -> Result<(), LedgerError> {
    let mut wallet = load(tx, address)?;
    wallet.nft_add(id, compartment, amount)?;
    save(tx, &wallet)
}

pub fn nft_debit(
    tx: &mut TxStore,
    address: &str,
    id: &str,
    compartment: crate::nft::Compartment,
    amount: &mtl_types::Amount,
) -> Result<(), LedgerError> {
    let mut wallet = load(tx, address)?;
    wallet.nft_subtract(id, compartment, amount)?;
    save(tx, &wallet)
}

pub fn nft_move(
    tx: &mut TxStore,
    address: &str,
    id: &str,
    from: crate::nft::Compartment,
    to: crate::nft::Compartment,
    amount: &mtl_types::Amount,
) -> Result<(), LedgerError> {
    let mut wallet = load(tx, address)?;
    wallet.nft_move(id, from, to, amount)?;
    save(tx, &wallet)
}

#[cfg(test)]
mod tests {
    use super::*;
    use mtl_store::MemoryStore;
    use mtl_types::derive_address;

    #[test]
    fn test_load_save_roundtrip() {
        let base = MemoryStore::new();
        let mut tx = TxStore::new(&base);
        let addr = derive_address(&["pem", "", "1"]);
        let wallet = Wallet::new(addr.clone(), "pem".into(), "n".into(), 1);
        save(&mut tx, &wallet).unwrap();
        assert_eq!(load(&tx, &addr).unwrap(), wallet);
    }

    #[test]
    fn test_load_missing_wallet() {
        let base = MemoryStore::new();
        let tx = TxStore::new(&base);
        let addr = derive_address(&["pem", "", "2"]);
        let err = load(&tx, &addr).unwrap_err();
        assert_eq!(err.code(), 3002);
    }

    #[test]
    fn test_load_rejects_bad_address() {
        let base = MemoryStore::new();
        let tx = TxStore::new(&base);
        assert_eq!(load(&tx, "not-an-address").unwrap_err().code(), 3001);
    }
}
