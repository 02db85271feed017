//! Registry operations. Ownership is checked here against the caller the
//! runtime authenticated; all balance effects go through the wallet engine
//! on the staged store.

use crate::entities::{Mrc010, TokenReserve};
use mtl_store::{keys, TxStore};
use mtl_types::error::codes;
use mtl_types::validate::{check_string, check_url};
use mtl_types::{Amount, LedgerError};
use mtl_wallet::repo as wallet_repo;
use mtl_wallet::BalanceBucket;
use serde::Deserialize;
use tracing::info;

pub fn get_token(tx: &TxStore, sn: i64) -> Result<Mrc010, LedgerError> {
    tx.get_json::<Mrc010>(&keys::token_key(sn))?
        .ok_or_else(|| LedgerError::not_found(&format!("token {sn}")))
}

pub fn save_token(tx: &mut TxStore, token: &Mrc010) -> Result<(), LedgerError> {
    tx.put_json(&keys::token_key(token.id), token)
}

/// DEX pair discipline: a register succeeds iff the target is declared by
/// the base and the target's base points back at the base.
pub fn check_pair(base: &Mrc010, target: &Mrc010) -> Result<(), LedgerError> {
    if !base.target_tokens.contains(&target.id) || target.base_token != base.id {
        return Err(LedgerError::precondition(
            codes::PAIR_NOT_ALLOWED,
            format!("pair {} -> {} not allowed", base.id, target.id),
        ));
    }
    Ok(())
}

/// `TokenRegister` payload.
#[derive(Debug, Deserialize)]
pub struct RegisterParams {
    pub owner: String,
    pub symbol: String,
    pub name: String,
    pub decimal: u32,
    #[serde(rename = "totalsupply")]
    pub total_supply: Amount,
    #[serde(default)]
    pub reserve: Vec<TokenReserve>,
    #[serde(rename = "type", default)]
    pub token_type: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub info: String,
    #[serde(default)]
    pub image: String,
}

/// Register a token: assign the next SN, persist the record, distribute the
/// declared reserves. The reserve sum must not exceed the total supply.
pub fn register(tx: &mut TxStore, params: RegisterParams, now: i64) -> Result<i64, LedgerError> {
    check_string("symbol", &params.symbol, 1, 12)?;
    check_string("name", &params.name, 1, 64)?;
    check_url("url", &params.url, 0, 255)?;
    if params.decimal > 18 {
        return Err(LedgerError::validation(
            codes::DECIMAL_RANGE,
            "decimal must be 0..18",
        ));
    }
    let token_type = if params.token_type.is_empty() {
        "010".to_string()
    } else {
        params.token_type
    };
    if !matches!(token_type.as_str(), "010" | "100" | "101") {
        return Err(LedgerError::validation(
            codes::BAD_PARAMETER,
            format!("unknown token type {token_type}"),
        ));
    }

    let mut reserved = Amount::zero();
    for r in &params.reserve {
        reserved = reserved.checked_add(&r.amount)?;
    }
    if params.total_supply.checked_sub(&reserved).is_none() {
        return Err(LedgerError::validation(
            codes::BAD_PARAMETER,
            "reserve exceeds total supply",
        ));
    }

    let sn = tx.next_token_sn()?;
    let token = Mrc010 {
        id: sn,
        owner: params.owner.clone(),
        symbol: params.symbol,
        name: params.name,
        decimal: params.decimal,
        total_supply: params.total_supply,
        burnt_amount: Amount::zero(),
        base_token: 0,
        target_tokens: Default::default(),
        loggers: Default::default(),
        token_type,
        url: params.url,
        info: params.info,
        image: params.image,
        regdate: now,
    };
    save_token(tx, &token)?;

    for r in &params.reserve {
        let mut wallet = wallet_repo::load(tx, &r.address)?;
        if sn == 0 {
            // The native token's reserve replaces the retained zero bucket.
            wallet.balances[0] = BalanceBucket::new(0, r.amount, r.unlock_date.max(0));
        } else {
            wallet.add_balance(sn, &r.amount, r.unlock_date, now)?;
        }
        wallet_repo::save(tx, &wallet)?;
    }
    info!(sn, reserves = params.reserve.len(), "token registered");
    Ok(sn)
}

/// Owner-only metadata update.
pub fn update(
    tx: &mut TxStore,
    sn: i64,
    caller: &str,
    url: &str,
    info_text: &str,
    image: &str,
) -> Result<(), LedgerError> {
    let mut token = get_token(tx, sn)?;
    require_owner(&token, caller)?;
    check_url("url", url, 0, 255)?;
    check_url("image", image, 0, 255)?;
    check_string("info", info_text, 0, 4096)?;
    token.url = url.to_string();
    token.info = info_text.to_string();
    token.image = image.to_string();
    save_token(tx, &token)
}

/// Burn from the owner's spendable balance; `burntamount` grows so that
/// circulating supply shrinks by exactly `amount`.
pub fn burn(tx: &mut TxStore, sn: i64, caller: &str, amount: &Amount, now: i64) -> Result<(), LedgerError> {
    let mut token = get_token(tx, sn)?;
    require_owner(&token, caller)?;
    if token.circulating().checked_sub(amount).is_none() {
        return Err(LedgerError::resource(
            codes::SUPPLY_UNDERFLOW,
            "burn exceeds circulating supply",
        ));
    }
    let mut wallet = wallet_repo::load(tx, caller)?;
    wallet.subtract_balance(sn, amount, now)?;
    wallet_repo::save(tx, &wallet)?;
    token.burnt_amount = token.burnt_amount.checked_add(amount)?;
    save_token(tx, &token)?;
    info!(sn, %amount, "token burned");
    Ok(())
}

/// Mint to the owner's balance; `totalsupply` grows by exactly `amount`.
pub fn mint(tx: &mut TxStore, sn: i64, caller: &str, amount: &Amount, now: i64) -> Result<(), LedgerError> {
    let mut token = get_token(tx, sn)?;
    require_owner(&token, caller)?;
    let mut wallet = wallet_repo::load(tx, caller)?;
    wallet.add_balance(sn, amount, 0, now)?;
    wallet_repo::save(tx, &wallet)?;
    token.total_supply = token.total_supply.checked_add(amount)?;
    save_token(tx, &token)?;
    info!(sn, %amount, "token minted");
    Ok(())
}

pub fn set_base(tx: &mut TxStore, sn: i64, caller: &str, base_sn: i64) -> Result<(), LedgerError> {
    let mut token = get_token(tx, sn)?;
    require_owner(&token, caller)?;
    if base_sn != 0 {
        get_token(tx, base_sn)?; // must exist
    }
    token.base_token = base_sn;
    save_token(tx, &token)
}

pub fn add_target(tx: &mut TxStore, sn: i64, caller: &str, target_sn: i64) -> Result<(), LedgerError> {
    let mut token = get_token(tx, sn)?;
    require_owner(&token, caller)?;
    get_token(tx, target_sn)?; // must exist
    token.target_tokens.insert(target_sn);
    save_token(tx, &token)
}

pub fn remove_target(tx: &mut TxStore, sn: i64, caller: &str, target_sn: i64) -> Result<(), LedgerError> {
    let mut token = get_token(tx, sn)?;
    require_owner(&token, caller)?;
    if !token.target_tokens.remove(&target_sn) {
        return Err(LedgerError::not_found(&format!("target token {target_sn}")));
    }
    save_token(tx, &token)
}

/// MRC100 logger allow-list. Only "100"-typed tokens carry loggers.
pub fn add_logger(tx: &mut TxStore, sn: i64, caller: &str, logger: &str, now: i64) -> Result<(), LedgerError> {
    let mut token = get_token(tx, sn)?;
    require_owner(&token, caller)?;
    require_mrc100(&token)?;
    if !wallet_repo::exists(tx, logger)? {
        return Err(LedgerError::existence(
            codes::DATA_NOT_FOUND,
            format!("wallet not found {logger}"),
        ));
    }
    token.loggers.insert(logger.to_string(), now);
    save_token(tx, &token)
}

pub fn remove_logger(tx: &mut TxStore, sn: i64, caller: &str, logger: &str) -> Result<(), LedgerError> {
    let mut token = get_token(tx, sn)?;
    require_owner(&token, caller)?;
    require_mrc100(&token)?;
    if token.loggers.remove(logger).is_none() {
        return Err(LedgerError::not_found(&format!("logger {logger}")));
    }
    save_token(tx, &token)
}

fn require_owner(token: &Mrc010, caller: &str) -> Result<(), LedgerError> {
    if token.owner != caller {
        return Err(LedgerError::not_permitted(&format!("token {}", token.id)));
    }
    Ok(())
}

fn require_mrc100(token: &Mrc010) -> Result<(), LedgerError> {
    if token.token_type != "100" {
        return Err(LedgerError::precondition(
            codes::WRONG_STATE,
            format!("token {} is not MRC100 typed", token.id),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use mtl_store::{KvStore, MemoryStore};
    use mtl_types::derive_address;
    use mtl_wallet::Wallet;

    fn seed_wallet(store: &mut MemoryStore, tag: &str) -> String {
        let addr = derive_address(&["pem", tag, "1"]);
        let wallet = Wallet::new(addr.clone(), "pem".into(), "n".into(), 1);
        store
            .put(&addr, serde_json::to_vec(&wallet).unwrap())
            .unwrap();
        addr
    }

    fn commit(store: &mut MemoryStore, writes: std::collections::BTreeMap<String, Vec<u8>>) {
        for (k, v) in writes {
            store.put(&k, v).unwrap();
        }
    }

    fn amt(s: &str) -> Amount {
        Amount::parse(s).unwrap()
    }

    fn params(owner: &str, supply: &str, reserve: Vec<TokenReserve>) -> RegisterParams {
        RegisterParams {
            owner: owner.into(),
            symbol: "TKN".into(),
            name: "Token".into(),
            decimal: 0,
            total_supply: amt(supply),
            reserve,
            token_type: String::new(),
            url: String::new(),
            info: String::new(),
            image: String::new(),
        }
    }

    #[test]
    fn test_register_assigns_serials_and_distributes_reserve() {
        let mut store = MemoryStore::new();
        let owner = seed_wallet(&mut store, "owner");
        let mut tx = TxStore::new(&store);
        let sn0 = register(
            &mut tx,
            params(
                &owner,
                "1000",
                vec![TokenReserve {
                    address: owner.clone(),
                    amount: amt("1000"),
                    unlock_date: 0,
                }],
            ),
            100,
        )
        .unwrap();
        let sn1 = register(&mut tx, params(&owner, "500", vec![]), 100).unwrap();
        assert_eq!(sn0, 0);
        assert_eq!(sn1, 1);
        let writes = tx.into_writes();
        commit(&mut store, writes);

        let tx = TxStore::new(&store);
        let wallet = wallet_repo::load(&tx, &owner).unwrap();
        // native reserve replaced the retained zero bucket
        assert_eq!(wallet.balances[0].token, 0);
        assert_eq!(wallet.balances[0].amount, amt("1000"));
        assert_eq!(get_token(&tx, 1).unwrap().total_supply, amt("500"));
    }

    #[test]
    fn test_register_rejects_reserve_over_supply() {
        let mut store = MemoryStore::new();
        let owner = seed_wallet(&mut store, "owner");
        let mut tx = TxStore::new(&store);
        let err = register(
            &mut tx,
            params(
                &owner,
                "10",
                vec![TokenReserve {
                    address: owner.clone(),
                    amount: amt("11"),
                    unlock_date: 0,
                }],
            ),
            100,
        )
        .unwrap_err();
        assert_eq!(err.code(), 1201);
    }

    #[test]
    fn test_mint_burn_roundtrip_is_noop() {
        let mut store = MemoryStore::new();
        let owner = seed_wallet(&mut store, "owner");
        let mut tx = TxStore::new(&store);
        let sn = register(&mut tx, params(&owner, "100", vec![]), 100).unwrap();
        mint(&mut tx, sn, &owner, &amt("40"), 100).unwrap();
        burn(&mut tx, sn, &owner, &amt("40"), 100).unwrap();
        let token = get_token(&tx, sn).unwrap();
        assert_eq!(token.total_supply, amt("140"));
        assert_eq!(token.burnt_amount, amt("40"));
        assert_eq!(token.circulating(), amt("100"));
        let wallet = wallet_repo::load(&tx, &owner).unwrap();
        assert_eq!(wallet.spendable(sn, 100), amt("0"));
    }

    #[test]
    fn test_burn_requires_owner_and_balance() {
        let mut store = MemoryStore::new();
        let owner = seed_wallet(&mut store, "owner");
        let other = seed_wallet(&mut store, "other");
        let mut tx = TxStore::new(&store);
        let sn = register(&mut tx, params(&owner, "100", vec![]), 100).unwrap();
        assert_eq!(
            burn(&mut tx, sn, &other, &amt("1"), 100).unwrap_err().code(),
            4100
        );
        // owner holds nothing yet
        assert_eq!(
            burn(&mut tx, sn, &owner, &amt("1"), 100).unwrap_err().code(),
            5000
        );
    }

    #[test]
    fn test_pair_discipline() {
        let mut store = MemoryStore::new();
        let owner = seed_wallet(&mut store, "owner");
        let mut tx = TxStore::new(&store);
        let base = register(&mut tx, params(&owner, "100", vec![]), 100).unwrap();
        let target = register(&mut tx, params(&owner, "100", vec![]), 100).unwrap();
        add_target(&mut tx, base, &owner, target).unwrap();
        set_base(&mut tx, target, &owner, base).unwrap();

        let base_t = get_token(&tx, base).unwrap();
        let target_t = get_token(&tx, target).unwrap();
        assert!(check_pair(&base_t, &target_t).is_ok());
        // reversed direction is not a declared pair
        assert_eq!(check_pair(&target_t, &base_t).unwrap_err().code(), 4205);
    }

    #[test]
    fn test_logger_allow_list_requires_mrc100() {
        let mut store = MemoryStore::new();
        let owner = seed_wallet(&mut store, "owner");
        let logger = seed_wallet(&mut store, "logger");
        let mut tx = TxStore::new(&store);
        let plain = register(&mut tx, params(&owner, "10", vec![]), 100).unwrap();
        assert_eq!(
            add_logger(&mut tx, plain, &owner, &logger, 100)
                .unwrap_err()
                .code(),
            4201
        );

        let mut p = params(&owner, "10", vec![]);
        p.token_type = "100".into();
        let game = register(&mut tx, p, 100).unwrap();
        add_logger(&mut tx, game, &owner, &logger, 100).unwrap();
        let token = get_token(&tx, game).unwrap();
        assert!(token.may_log(&logger));
        assert!(token.may_log(&owner));
        remove_logger(&mut tx, game, &owner, &logger).unwrap();
        assert!(!get_token(&tx, game).unwrap().may_log(&logger));
    }
}
