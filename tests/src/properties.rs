//! Ledger-wide invariants, checked by scanning the backing store after
//! realistic workloads.

use crate::support::{args, keypair, sign, Harness};
use mtl_runtime::Runtime;
use mtl_store::MemoryStore;

fn wallets(h: &Harness) -> Vec<serde_json::Value> {
    h.rt
        .store()
        .iter()
        .filter(|(key, _)| key.len() == 40 && key.starts_with("MT"))
        .map(|(_, value)| serde_json::from_slice(value).expect("wallet json"))
        .filter(|v: &serde_json::Value| v.get("publicKey").is_some())
        .collect()
}

/// Σ balances + Σ pending of `token` over every wallet.
fn circulating(h: &Harness, token: i64) -> u64 {
    wallets(h)
        .iter()
        .map(|w| {
            let buckets: u64 = w["balances"]
                .as_array()
                .expect("buckets")
                .iter()
                .filter(|b| b["tokenId"].as_i64() == Some(token))
                .map(|b| b["amount"].as_str().expect("amount").parse::<u64>().expect("number"))
                .sum();
            let pending = w["pending"]
                .get(token.to_string())
                .and_then(|a| a.as_str())
                .map(|s| s.parse::<u64>().expect("number"))
                .unwrap_or(0);
            buckets + pending
        })
        .sum()
}

#[test]
fn test_fungible_supply_is_conserved_across_dex_lifecycle() {
    let mut h = Harness::new();
    let w1 = h.actor("maker");
    let w2 = h.actor("taker");
    let base = h.register_token(&w1, 0, "2000", &[(&w1.address, "1000"), (&w2.address, "1000")]);
    let target = h.register_token(&w1, 0, "1000", &[(&w1.address, "1000")]);
    let (base_s, target_s) = (base.to_string(), target.to_string());
    h.call("TokenSetBase", &w1, &[&target_s, &base_s]).unwrap();
    h.call("TokenAddTarget", &w1, &[&base_s, &target_s]).unwrap();
    assert_eq!(circulating(&h, base), 2000);
    assert_eq!(circulating(&h, target), 1000);

    let item = h
        .call(
            "StodexRegister",
            &w1,
            &[&w1.address, "SELL", &base_s, &target_s, "3", "10"],
        )
        .unwrap();
    // escrow moved into pending, nothing minted or lost
    assert_eq!(circulating(&h, target), 1000);

    h.call("StodexExchange", &w2, &[&w2.address, &item, "4", "EXPK-C1"])
        .unwrap();
    assert_eq!(circulating(&h, base), 2000);
    assert_eq!(circulating(&h, target), 1000);

    h.call("StodexUnRegister", &w1, &[&w1.address, &item])
        .unwrap();
    assert_eq!(circulating(&h, target), 1000);
    // the unfilled remainder came home
    assert_eq!(h.holdings(&w1.address, target), 996);
}

#[test]
fn test_zero_buckets_are_pruned_but_native_survives() {
    let mut h = Harness::new();
    let w1 = h.actor("w1");
    let w2 = h.actor("w2");
    h.register_token(&w1, 0, "100", &[(&w1.address, "100")]);
    let t = h.register_token(&w1, 0, "100", &[(&w2.address, "100")]);
    let t_s = t.to_string();

    h.call_with_message(
        "Transfer",
        &w2,
        &[&w2.address, &w1.address, "100", &t_s, "0", "", ""],
        &[&w2.address, &w1.address, "100", &t_s, "0"],
    )
    .unwrap();

    let buckets = h.buckets(&w2.address);
    assert!(
        !buckets.iter().any(|b| b.0 == t),
        "drained bucket must not survive: {buckets:?}"
    );
    assert!(
        buckets.contains(&(0, 0, 0)),
        "native zero bucket is retained: {buckets:?}"
    );
}

#[test]
fn test_nonce_changes_after_every_state_change() {
    let mut h = Harness::new();
    let w1 = h.actor("w1");
    let w2 = h.actor("w2");
    h.register_token(&w1, 0, "1000", &[(&w1.address, "1000")]);

    let mut seen = Vec::new();
    for _ in 0..3 {
        let nonce = h
            .rt
            .invoke("GetNonce", &args(&[&w1.address]), h.now)
            .unwrap();
        assert_eq!(nonce.len(), 40);
        assert!(!seen.contains(&nonce), "nonce reused: {nonce}");
        seen.push(nonce);
        h.call_with_message(
            "Transfer",
            &w1,
            &[&w1.address, &w2.address, "10", "0", "0", "", ""],
            &[&w1.address, &w2.address, "10", "0", "0"],
        )
        .unwrap();
    }
}

#[test]
fn test_dex_register_requires_symmetric_pair_links() {
    let mut h = Harness::new();
    let w1 = h.actor("w1");
    let base = h.register_token(&w1, 0, "1000", &[(&w1.address, "1000")]);
    let target = h.register_token(&w1, 0, "1000", &[(&w1.address, "1000")]);
    let (base_s, target_s) = (base.to_string(), target.to_string());
    let fields = [
        w1.address.as_str(),
        "SELL",
        base_s.as_str(),
        target_s.as_str(),
        "3",
        "10",
    ];

    // no links at all
    let err = h.call("StodexRegister", &w1, &fields).unwrap_err();
    assert_eq!(err.code(), 4205);

    // forward link only
    h.call("TokenAddTarget", &w1, &[&base_s, &target_s]).unwrap();
    let err = h.call("StodexRegister", &w1, &fields).unwrap_err();
    assert_eq!(err.code(), 4205);

    // both links
    h.call("TokenSetBase", &w1, &[&target_s, &base_s]).unwrap();
    h.call("StodexRegister", &w1, &fields).unwrap();
}

#[test]
fn test_auction_price_increases_strictly_across_bids() {
    let mut h = Harness::new();
    let funder = h.actor("funder");
    let creator = h.actor("creator");
    let platform = h.actor("platform");
    let b1 = h.actor("b1");
    let b2 = h.actor("b2");
    h.register_token(
        &funder,
        0,
        "10000",
        &[(&b1.address, "5000"), (&b2.address, "5000")],
    );
    let token_json = format!(
        r#"{{"creator":"{}","name":"Gem","totalsupply":"5"}}"#,
        creator.address
    );
    let sft = h.call("Mrc402Create", &creator, &[&token_json]).unwrap();

    let start = h.now.to_string();
    let end = (h.now + 7200).to_string();
    let lot = h
        .call(
            "Mrc402Auction",
            &creator,
            &[
                &creator.address,
                &sft,
                "5",
                "1000",
                "0",
                "10",
                "0",
                &start,
                &end,
                &platform.address,
                "0",
            ],
        )
        .unwrap();

    h.call("Mrc402AuctionBid", &b1, &[&b1.address, &lot, "1000", "0"])
        .unwrap();
    // matching the current price is not an overbid
    let err = h
        .call("Mrc402AuctionBid", &b2, &[&b2.address, &lot, "1000", "0"])
        .unwrap_err();
    assert_eq!(err.code(), 1101);
    // the leader cannot raise against itself
    let err = h
        .call("Mrc402AuctionBid", &b1, &[&b1.address, &lot, "1010", "0"])
        .unwrap_err();
    assert_eq!(err.code(), 4100);

    h.call("Mrc402AuctionBid", &b2, &[&b2.address, &lot, "1010", "0"])
        .unwrap();
    let record = h.record("GetDEX402", &lot);
    assert_eq!(record["auction_current_price"], "1010");
    assert_eq!(record["auction_current_bidder"], b2.address);
    // the outbid escrow went home
    assert_eq!(h.holdings(&b1.address, 0), 5000);
}

#[test]
fn test_identical_inputs_replay_to_identical_state() {
    let (sk1, pem1) = keypair();
    let (_sk2, pem2) = keypair();
    let now = 1_700_000_000;

    let mut script: Vec<(String, Vec<String>)> = Vec::new();
    let mut first = Runtime::new(MemoryStore::new());

    let mut run = |rt: &mut Runtime<MemoryStore>,
                   script: &mut Vec<(String, Vec<String>)>,
                   op: &str,
                   call: Vec<String>| {
        script.push((op.to_string(), call.clone()));
        rt.invoke(op, &call, now).unwrap()
    };

    let a1 = run(&mut first, &mut script, "NewWallet", args(&[&pem1, "a"]));
    let a2 = run(&mut first, &mut script, "NewWallet", args(&[&pem2, "b"]));
    let token_json = format!(
        r#"{{"owner":"{a1}","symbol":"TST","name":"Test Token","decimal":0,"totalsupply":"1000","reserve":[{{"address":"{a1}","amount":"1000"}}]}}"#
    );
    let nonce = first.invoke("GetNonce", &args(&[&a1]), now).unwrap();
    let sig = sign(&sk1, &[&token_json, &nonce]);
    run(
        &mut first,
        &mut script,
        "TokenRegister",
        args(&[&token_json, &sig, &nonce]),
    );
    let nonce = first.invoke("GetNonce", &args(&[&a1]), now).unwrap();
    let sig = sign(&sk1, &[&a1, &a2, "250", "0", "0", &nonce]);
    run(
        &mut first,
        &mut script,
        "Transfer",
        args(&[&a1, &a2, "250", "0", "0", "", "", &sig, &nonce]),
    );

    let mut second = Runtime::new(MemoryStore::new());
    for (op, call) in &script {
        second.invoke(op, call, now).unwrap();
    }

    let left: Vec<_> = first.store().iter().collect();
    let right: Vec<_> = second.store().iter().collect();
    assert_eq!(left, right);
}
