//! Project and item registry: create/update, transfer, melt.
//!
//! Item creation escrows the declared `initialreserve` out of the creator's
//! balance; melting is the only way that reserve re-enters a wallet.

use crate::entities::{Mrc400, Mrc401, Transferable, MELTED_OWNER};
use mtl_store::{keys, TxStore};
use mtl_types::error::codes;
use mtl_types::validate::{check_string, check_url};
use mtl_types::{derive_id, Amount, FeeRate, LedgerError};
use mtl_wallet::repo as wallet_repo;
use serde::Deserialize;
use tracing::info;

/// Most items a single `Mrc401Create` call may carry.
pub const MAX_ITEMS_PER_CREATE: usize = 100;

pub fn get_project(tx: &TxStore, id: &str) -> Result<Mrc400, LedgerError> {
    keys::check_prefixed_key("mrc400", keys::MRC400_PREFIX, id)?;
    tx.get_json::<Mrc400>(id)?
        .ok_or_else(|| LedgerError::not_found(&format!("mrc400 {id}")))
}

pub fn save_project(tx: &mut TxStore, project: &Mrc400) -> Result<(), LedgerError> {
    tx.put_json(&project.id, project)
}

pub fn get_item(tx: &TxStore, id: &str) -> Result<Mrc401, LedgerError> {
    keys::check_mrc401_key(id)?;
    tx.get_json::<Mrc401>(id)?
        .ok_or_else(|| LedgerError::not_found(&format!("mrc401 {id}")))
}

pub fn save_item(tx: &mut TxStore, item: &Mrc401) -> Result<(), LedgerError> {
    tx.put_json(&item.id, item)
}

/// Fee strings are validated once at creation and re-parsed at use.
pub(crate) fn fee_rate(name: &str, s: &str) -> Result<FeeRate, LedgerError> {
    FeeRate::parse_bounded(s, 100).map_err(|_| {
        LedgerError::validation(codes::INVALID_NUMBER, format!("invalid {name}: {s}"))
    })
}

/// `Mrc400Create` payload.
#[derive(Debug, Deserialize)]
pub struct ProjectParams {
    pub owner: String,
    pub name: String,
    #[serde(default)]
    pub url: String,
    #[serde(rename = "imageurl", default)]
    pub image_url: String,
    #[serde(rename = "allowtoken", default)]
    pub allow_token: i64,
    #[serde(rename = "itemurl", default)]
    pub item_url: String,
    #[serde(rename = "itemimageurl", default)]
    pub item_image_url: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub partner: String,
    #[serde(default)]
    pub data: String,
}

pub fn create_project(
    tx: &mut TxStore,
    params: ProjectParams,
    salt: &str,
    now: i64,
) -> Result<String, LedgerError> {
    check_string("name", &params.name, 1, 64)?;
    check_url("url", &params.url, 0, 255)?;
    check_url("imageurl", &params.image_url, 0, 255)?;
    check_string("description", &params.description, 0, 4096)?;
    if !wallet_repo::exists(tx, &params.owner)? {
        return Err(LedgerError::existence(
            codes::DATA_NOT_FOUND,
            format!("wallet not found {}", params.owner),
        ));
    }
    if params.allow_token != 0 {
        mtl_token::registry::get_token(tx, params.allow_token)?;
    }

    let id = derive_id(keys::MRC400_PREFIX, &[&params.owner, &now.to_string(), salt])?;
    if tx.exists(&id)? {
        return Err(LedgerError::existence(
            codes::DUPLICATE_KEY,
            format!("mrc400 {id} already exists"),
        ));
    }
    let project = Mrc400 {
        id: id.clone(),
        owner: params.owner,
        name: params.name,
        url: params.url,
        image_url: params.image_url,
        allow_token: params.allow_token,
        item_url: params.item_url,
        item_image_url: params.item_image_url,
        category: params.category,
        description: params.description,
        partner: params.partner,
        data: params.data,
        regdate: now,
    };
    save_project(tx, &project)?;
    info!(id = %id, "mrc400 project created");
    Ok(id)
}

/// `Mrc400Update` payload; ownership, name, and `allowtoken` are immutable.
#[derive(Debug, Deserialize)]
pub struct ProjectUpdateParams {
    #[serde(default)]
    pub url: String,
    #[serde(rename = "imageurl", default)]
    pub image_url: String,
    #[serde(rename = "itemurl", default)]
    pub item_url: String,
    #[serde(rename = "itemimageurl", default)]
    pub item_image_url: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub partner: String,
    #[serde(default)]
    pub data: String,
}

pub fn update_project(
    tx: &mut TxStore,
    id: &str,
    caller: &str,
    params: ProjectUpdateParams,
) -> Result<(), LedgerError> {
    let mut project = get_project(tx, id)?;
    require_project_owner(&project, caller)?;
    check_url("url", &params.url, 0, 255)?;
    check_url("imageurl", &params.image_url, 0, 255)?;
    check_string("description", &params.description, 0, 4096)?;
    project.url = params.url;
    project.image_url = params.image_url;
    project.item_url = params.item_url;
    project.item_image_url = params.item_image_url;
    project.category = params.category;
    project.description = params.description;
    project.partner = params.partner;
    project.data = params.data;
    save_project(tx, &project)
}

/// One entry of the `Mrc401Create` item list.
#[derive(Debug, Deserialize)]
pub struct ItemParams {
    #[serde(rename = "itemID")]
    pub item_id: String,
    #[serde(rename = "itemurl", default)]
    pub item_url: String,
    #[serde(rename = "itemimageurl", default)]
    pub item_image_url: String,
    #[serde(rename = "groupid", default)]
    pub group_id: String,
    #[serde(rename = "initialtoken", default)]
    pub initial_token: i64,
    #[serde(rename = "initialreserve")]
    pub initial_reserve: Amount,
    #[serde(rename = "meltingfee")]
    pub melting_fee: String,
    pub transferable: String,
    #[serde(rename = "sellfee")]
    pub sell_fee: String,
    #[serde(rename = "jsonmeta", default)]
    pub json_meta: String,
}

/// Mint items into a project. Project owner only; the owner's balance is
/// debited each item's `initialreserve`.
pub fn create_items(
    tx: &mut TxStore,
    project_id: &str,
    caller: &str,
    items: Vec<ItemParams>,
    now: i64,
) -> Result<Vec<String>, LedgerError> {
    let project = get_project(tx, project_id)?;
    require_project_owner(&project, caller)?;
    if items.is_empty() || items.len() > MAX_ITEMS_PER_CREATE {
        return Err(LedgerError::validation(
            codes::BAD_PARAMETER,
            format!("item list must hold 1..{MAX_ITEMS_PER_CREATE} items"),
        ));
    }

    let mut ids = Vec::with_capacity(items.len());
    for params in items {
        if params.item_id.len() != 40
            || !params.item_id.bytes().all(|b| b.is_ascii_alphanumeric())
        {
            return Err(LedgerError::validation(
                codes::BAD_PARAMETER,
                format!("invalid item id: {}", params.item_id),
            ));
        }
        fee_rate("meltingfee", &params.melting_fee)?;
        fee_rate("sellfee", &params.sell_fee)?;
        let transferable = Transferable::parse(&params.transferable).ok_or_else(|| {
            LedgerError::validation(
                codes::BAD_PARAMETER,
                format!("invalid transferable: {}", params.transferable),
            )
        })?;
        if params.initial_token != 0 {
            mtl_token::registry::get_token(tx, params.initial_token)?;
        }

        let id = format!("{project_id}_{}", params.item_id);
        if tx.exists(&id)? {
            return Err(LedgerError::existence(
                codes::ALREADY_EXISTS,
                format!("mrc401 {id} already exists"),
            ));
        }
        if !params.initial_reserve.is_zero() {
            wallet_repo::debit(tx, caller, params.initial_token, &params.initial_reserve, now)?;
        }

        let item = Mrc401 {
            id: id.clone(),
            mrc400: project_id.to_string(),
            owner: caller.to_string(),
            item_url: params.item_url,
            item_image_url: params.item_image_url,
            group_id: params.group_id,
            initial_token: params.initial_token,
            initial_reserve: params.initial_reserve,
            melting_fee: params.melting_fee,
            melting_date: 0,
            transferable,
            sell_fee: params.sell_fee,
            sell_date: 0,
            sell_price: Amount::zero(),
            sell_token: 0,
            auction_date: 0,
            auction_end: 0,
            auction_token: 0,
            auction_bidding_unit: Amount::zero(),
            auction_start_price: Amount::zero(),
            auction_buynow_price: Amount::zero(),
            auction_current_price: Amount::zero(),
            auction_current_bidder: String::new(),
            last_trade_date: 0,
            json_meta: params.json_meta,
        };
        save_item(tx, &item)?;
        ids.push(id);
    }
    info!(project = %project_id, count = ids.len(), "mrc401 items created");
    Ok(ids)
}

/// `Mrc401Update` payload: the mutable metadata subset.
#[derive(Debug, Deserialize)]
pub struct ItemUpdateParams {
    #[serde(rename = "itemurl", default)]
    pub item_url: String,
    #[serde(rename = "itemimageurl", default)]
    pub item_image_url: String,
    #[serde(rename = "groupid", default)]
    pub group_id: String,
    #[serde(rename = "jsonmeta", default)]
    pub json_meta: String,
}

pub fn update_item(
    tx: &mut TxStore,
    item_id: &str,
    caller: &str,
    params: ItemUpdateParams,
) -> Result<(), LedgerError> {
    let mut item = get_item(tx, item_id)?;
    if item.is_melted() {
        return Err(LedgerError::already_melted());
    }
    let project = get_project(tx, &item.mrc400)?;
    require_project_owner(&project, caller)?;
    item.item_url = params.item_url;
    item.item_image_url = params.item_image_url;
    item.group_id = params.group_id;
    item.json_meta = params.json_meta;
    save_item(tx, &item)
}

/// Move an idle item to another wallet. `Bound` items move only on the
/// project owner's signature; everything else moves on the item owner's.
pub fn transfer(
    tx: &mut TxStore,
    caller: &str,
    to: &str,
    item_id: &str,
) -> Result<(), LedgerError> {
    let mut item = get_item(tx, item_id)?;
    item.require_idle()?;
    match item.transferable {
        Transferable::Bound => {
            let project = get_project(tx, &item.mrc400)?;
            require_project_owner(&project, caller)?;
        }
        Transferable::Permanent | Transferable::Temprary => {
            if item.owner != caller {
                return Err(LedgerError::not_permitted(&format!("mrc401 {item_id}")));
            }
        }
    }
    if !wallet_repo::exists(tx, to)? {
        return Err(LedgerError::existence(
            codes::DATA_NOT_FOUND,
            format!("wallet not found {to}"),
        ));
    }
    item.owner = to.to_string();
    save_item(tx, &item)
}

/// Destroy the item and pay its reserve out: the creator collects the
/// melting fee, the final owner the rest. Terminal.
pub fn melt(tx: &mut TxStore, caller: &str, item_id: &str, now: i64) -> Result<(), LedgerError> {
    let mut item = get_item(tx, item_id)?;
    item.require_idle()?;
    if item.owner != caller {
        return Err(LedgerError::not_permitted(&format!("mrc401 {item_id}")));
    }
    let project = get_project(tx, &item.mrc400)?;

    let fee = item
        .initial_reserve
        .percent_floor(fee_rate("meltingfee", &item.melting_fee)?.scaled())?;
    let rest = item
        .initial_reserve
        .checked_sub(&fee)
        .ok_or_else(LedgerError::not_enough_balance)?;
    if !fee.is_zero() {
        wallet_repo::credit(tx, &project.owner, item.initial_token, &fee, 0, now)?;
    }
    if !rest.is_zero() {
        wallet_repo::credit(tx, caller, item.initial_token, &rest, 0, now)?;
    }

    item.owner = MELTED_OWNER.to_string();
    item.melting_date = now;
    save_item(tx, &item)?;
    info!(id = %item_id, %fee, "mrc401 melted");
    Ok(())
}

pub(crate) fn require_project_owner(project: &Mrc400, caller: &str) -> Result<(), LedgerError> {
    if project.owner != caller {
        return Err(LedgerError::not_permitted(&format!("mrc400 {}", project.id)));
    }
    Ok(())
}


#[cfg(test)]
mod tests {
    use super::test_helpers::*;
    use super::*;
    use mtl_store::MemoryStore;

    #[test]
    fn test_create_items_escrows_reserve() {
        let mut store = MemoryStore::new();
        let creator = seed_wallet(&mut store, "creator");
        let mut tx = TxStore::new(&store);
        fund_native(&mut tx, &creator, &[&creator], "1000");
        let project = create_project(&mut tx, project_params(&creator), "sig", 100).unwrap();

        let ids = create_items(
            &mut tx,
            &project,
            &creator,
            vec![item_params(&item_id40('a'), "100"), item_params(&item_id40('b'), "250")],
            100,
        )
        .unwrap();
        assert_eq!(ids.len(), 2);
        assert_eq!(ids[0].len(), 81);

        let wallet = wallet_repo::load(&tx, &creator).unwrap();
        assert_eq!(wallet.spendable(0, 100), amt("650"));
        assert_eq!(get_item(&tx, &ids[0]).unwrap().owner, creator);
    }

    #[test]
    fn test_create_items_rejects_duplicates_and_bad_ids() {
        let mut store = MemoryStore::new();
        let creator = seed_wallet(&mut store, "creator");
        let mut tx = TxStore::new(&store);
        fund_native(&mut tx, &creator, &[&creator], "1000");
        let project = create_project(&mut tx, project_params(&creator), "sig", 100).unwrap();

        create_items(&mut tx, &project, &creator, vec![item_params(&item_id40('a'), "1")], 100)
            .unwrap();
        assert_eq!(
            create_items(&mut tx, &project, &creator, vec![item_params(&item_id40('a'), "1")], 100)
                .unwrap_err()
                .code(),
            3005
        );
        assert_eq!(
            create_items(&mut tx, &project, &creator, vec![item_params("short", "1")], 100)
                .unwrap_err()
                .code(),
            1201
        );
    }

    #[test]
    fn test_only_project_owner_creates_items() {
        let mut store = MemoryStore::new();
        let creator = seed_wallet(&mut store, "creator");
        let other = seed_wallet(&mut store, "other");
        let mut tx = TxStore::new(&store);
        fund_native(&mut tx, &creator, &[&creator, &other], "1000");
        let project = create_project(&mut tx, project_params(&creator), "sig", 100).unwrap();
        assert_eq!(
            create_items(&mut tx, &project, &other, vec![item_params(&item_id40('a'), "1")], 100)
                .unwrap_err()
                .code(),
            4100
        );
    }

    #[test]
    fn test_transfer_rules() {
        let mut store = MemoryStore::new();
        let creator = seed_wallet(&mut store, "creator");
        let alice = seed_wallet(&mut store, "alice");
        let bob = seed_wallet(&mut store, "bob");
        let mut tx = TxStore::new(&store);
        fund_native(&mut tx, &creator, &[&creator], "1000");
        let project = create_project(&mut tx, project_params(&creator), "sig", 100).unwrap();

        let mut bound = item_params(&item_id40('a'), "0");
        bound.transferable = "Bound".into();
        let ids = create_items(
            &mut tx,
            &project,
            &creator,
            vec![item_params(&item_id40('p'), "0"), bound],
            100,
        )
        .unwrap();
        let (permanent, bound) = (&ids[0], &ids[1]);

        transfer(&mut tx, &creator, &alice, permanent).unwrap();
        assert_eq!(get_item(&tx, permanent).unwrap().owner, alice);
        // new owner moves it on
        transfer(&mut tx, &alice, &bob, permanent).unwrap();
        // alice no longer owns it
        assert_eq!(transfer(&mut tx, &alice, &bob, permanent).unwrap_err().code(), 4100);

        // bound: only the project owner may move it, even after handover
        transfer(&mut tx, &creator, &alice, bound).unwrap();
        assert_eq!(transfer(&mut tx, &alice, &bob, bound).unwrap_err().code(), 4100);
        transfer(&mut tx, &creator, &bob, bound).unwrap();
        assert_eq!(get_item(&tx, bound).unwrap().owner, bob);
    }

    #[test]
    fn test_melt_pays_reserve_split_and_is_terminal() {
        let mut store = MemoryStore::new();
        let creator = seed_wallet(&mut store, "creator");
        let alice = seed_wallet(&mut store, "alice");
        let mut tx = TxStore::new(&store);
        fund_native(&mut tx, &creator, &[&creator], "1000");
        let project = create_project(&mut tx, project_params(&creator), "sig", 100).unwrap();
        // reserve 100, melting fee 10%
        let ids = create_items(&mut tx, &project, &creator, vec![item_params(&item_id40('a'), "100")], 100)
            .unwrap();
        transfer(&mut tx, &creator, &alice, &ids[0]).unwrap();

        // only the owner melts
        assert_eq!(melt(&mut tx, &creator, &ids[0], 200).unwrap_err().code(), 4100);
        melt(&mut tx, &alice, &ids[0], 200).unwrap();

        let item = get_item(&tx, &ids[0]).unwrap();
        assert_eq!(item.owner, MELTED_OWNER);
        assert_eq!(item.melting_date, 200);
        // creator: 1000 - 100 reserve + 10 fee; alice: 90
        assert_eq!(wallet_repo::load(&tx, &creator).unwrap().spendable(0, 200), amt("910"));
        assert_eq!(wallet_repo::load(&tx, &alice).unwrap().spendable(0, 200), amt("90"));

        assert_eq!(melt(&mut tx, &alice, &ids[0], 300).unwrap_err().code(), 4203);
        assert_eq!(
            transfer(&mut tx, &alice, &creator, &ids[0]).unwrap_err().code(),
            4203
        );
    }
}
