//! End-to-end flows across wallet, token, DEX, NFT, and SFT operations.

use crate::support::{args, item_id40, Harness};
use mtl_store::KvStore;

#[test]
fn test_locked_transfer_frees_after_unlock() {
    let mut h = Harness::new();
    let w1 = h.actor("w1");
    let w2 = h.actor("w2");
    let w3 = h.actor("w3");
    let sn = h.register_token(&w1, 0, "1000", &[(&w1.address, "1000")]);
    let sn = sn.to_string();

    let unlock = (h.now + 3600).to_string();
    h.call_with_message(
        "Transfer",
        &w1,
        &[&w1.address, &w2.address, "100", &sn, &unlock, "", ""],
        &[&w1.address, &w2.address, "100", &sn, &unlock],
    )
    .unwrap();
    let buckets = h.buckets(&w2.address);
    assert!(buckets.contains(&(0, 100, h.now + 3600)), "{buckets:?}");

    // the bucket is frozen: spending before the unlock date fails
    h.now += 10;
    let err = h
        .call_with_message(
            "Transfer",
            &w2,
            &[&w2.address, &w3.address, "50", &sn, "0", "", ""],
            &[&w2.address, &w3.address, "50", &sn, "0"],
        )
        .unwrap_err();
    assert_eq!(err.code(), 5000);

    h.now += 3591; // past the unlock date
    h.call_with_message(
        "Transfer",
        &w2,
        &[&w2.address, &w3.address, "50", &sn, "0", "", ""],
        &[&w2.address, &w3.address, "50", &sn, "0"],
    )
    .unwrap();
    assert_eq!(h.holdings(&w3.address, 0), 50);
}

#[test]
fn test_dex_sell_order_fills_partially() {
    let mut h = Harness::new();
    let w1 = h.actor("maker");
    let w2 = h.actor("taker");
    let base = h.register_token(&w1, 0, "2000", &[(&w1.address, "1000"), (&w2.address, "1000")]);
    let target = h.register_token(&w1, 0, "1000", &[(&w1.address, "1000")]);
    let (base_s, target_s) = (base.to_string(), target.to_string());
    h.call("TokenSetBase", &w1, &[&target_s, &base_s]).unwrap();
    h.call("TokenAddTarget", &w1, &[&base_s, &target_s]).unwrap();

    let item_id = h
        .call(
            "StodexRegister",
            &w1,
            &[&w1.address, "SELL", &base_s, &target_s, "3", "10"],
        )
        .unwrap();
    // the escrow left the maker's spendable balance
    assert_eq!(h.holdings(&w1.address, target), 990);

    h.call("StodexExchange", &w2, &[&w2.address, &item_id, "4", "EXPK-1"])
        .unwrap();
    assert_eq!(h.holdings(&w2.address, base), 988);
    assert_eq!(h.holdings(&w2.address, target), 4);
    assert_eq!(h.holdings(&w1.address, base), 1012);

    let raw = h.rt.store().get(&item_id).unwrap().unwrap();
    let item: serde_json::Value = serde_json::from_slice(&raw).unwrap();
    assert_eq!(item["remainqtt"], "6");
    assert_eq!(item["status"], "TRADING");
}

#[test]
fn test_nft_melt_pays_fee_to_project_owner() {
    let mut h = Harness::new();
    let p = h.actor("project-owner");
    let holder = h.actor("holder");
    h.register_token(&p, 0, "2000", &[(&p.address, "2000")]);
    let project = h.create_project(&p, "Relics");
    let item = h.create_item(&p, &project, &item_id40('a'), 0, "1000", "2.5000", "0");
    assert_eq!(h.holdings(&p.address, 0), 1000); // reserve escrowed

    h.call("Mrc401Transfer", &p, &[&holder.address, &item])
        .unwrap();
    h.call("Mrc401Melt", &holder, &[&item]).unwrap();

    assert_eq!(h.holdings(&p.address, 0), 1025);
    assert_eq!(h.holdings(&holder.address, 0), 975);
    let record = h.record("GetMRC401", &item);
    assert_eq!(record["owner"], "MELTED");

    let err = h.call("Mrc401Melt", &holder, &[&item]).unwrap_err();
    assert_eq!(err.code(), 4203);
}

#[test]
fn test_nft_auction_buy_now_settles_immediately() {
    let mut h = Harness::new();
    let p = h.actor("project-owner");
    let seller = h.actor("seller");
    let b1 = h.actor("bidder-1");
    let b2 = h.actor("bidder-2");
    h.register_token(
        &p,
        0,
        "2000",
        &[(&b1.address, "1000"), (&b2.address, "1000")],
    );
    let project = h.create_project(&p, "Auction House");
    let item = h.create_item(&p, &project, &item_id40('b'), 0, "0", "0", "10.0000");
    h.call("Mrc401Transfer", &p, &[&seller.address, &item])
        .unwrap();

    let end = (h.now + 86_400).to_string();
    h.call(
        "Mrc401Auction",
        &seller,
        &[&seller.address, &item, "100", "500", "10", "0", &end],
    )
    .unwrap();

    h.call("Mrc401AuctionBid", &b1, &[&b1.address, &item, "120", "0"])
        .unwrap();
    assert_eq!(h.holdings(&b1.address, 0), 880);

    // a bid at the buy-now price settles without waiting for the end date
    h.call("Mrc401AuctionBid", &b2, &[&b2.address, &item, "500", "0"])
        .unwrap();
    assert_eq!(h.holdings(&b1.address, 0), 1000); // refunded
    assert_eq!(h.holdings(&b2.address, 0), 500);
    assert_eq!(h.holdings(&seller.address, 0), 450);
    assert_eq!(h.holdings(&p.address, 0), 50);
    let record = h.record("GetMRC401", &item);
    assert_eq!(record["owner"], b2.address);
}

#[test]
fn test_sft_auction_splits_commissions() {
    let mut h = Harness::new();
    let funder = h.actor("funder");
    let creator = h.actor("creator");
    let seller = h.actor("seller");
    let platform = h.actor("platform");
    let share_x = h.actor("share-x");
    let share_y = h.actor("share-y");
    let bidder = h.actor("bidder");
    h.register_token(&funder, 0, "2000", &[(&bidder.address, "2000")]);

    let token_json = format!(
        r#"{{"creator":"{}","name":"Gem","totalsupply":"10","creatorcommission":"3.00","shareholder":{{"{}":"2.00","{}":"2.00"}}}}"#,
        creator.address, share_x.address, share_y.address
    );
    let sft = h.call("Mrc402Create", &creator, &[&token_json]).unwrap();
    h.call(
        "Mrc402Transfer",
        &creator,
        &[&creator.address, &seller.address, &sft, "10", "", ""],
    )
    .unwrap();

    let start = h.now.to_string();
    let end = (h.now + 3600).to_string();
    let lot = h
        .call(
            "Mrc402Auction",
            &seller,
            &[
                &seller.address,
                &sft,
                "10",
                "1000",
                "0",
                "10",
                "0",
                &start,
                &end,
                &platform.address,
                "1.00",
            ],
        )
        .unwrap();

    h.call("Mrc402AuctionBid", &bidder, &[&bidder.address, &lot, "1000", "0"])
        .unwrap();
    h.now += 3600;
    h.rt.invoke("Mrc402AuctionFinish", &args(&[&lot]), h.now)
        .unwrap();

    assert_eq!(h.holdings(&creator.address, 0), 30);
    assert_eq!(h.holdings(&share_x.address, 0), 20);
    assert_eq!(h.holdings(&share_y.address, 0), 20);
    assert_eq!(h.holdings(&platform.address, 0), 10);
    assert_eq!(h.holdings(&seller.address, 0), 920);
    assert_eq!(h.holdings(&bidder.address, 0), 1000);

    // the lot moved into the winner's free compartment; the seller's
    // emptied sub-balance entry is gone entirely
    let raw = h.rt.store().get(&bidder.address).unwrap().unwrap();
    let wallet: serde_json::Value = serde_json::from_slice(&raw).unwrap();
    assert_eq!(wallet["nftBalances"][&sft]["free"], "10");
    let raw = h.rt.store().get(&seller.address).unwrap().unwrap();
    let wallet: serde_json::Value = serde_json::from_slice(&raw).unwrap();
    assert!(wallet["nftBalances"].get(&sft).is_none());
}

#[test]
fn test_exchange_fee_to_counterparty_nets_in_one_wallet() {
    let mut h = Harness::new();
    let w1 = h.actor("w1");
    let w2 = h.actor("w2");
    let t = h.register_token(&w1, 0, "200", &[(&w1.address, "100"), (&w2.address, "100")]);
    let t_s = t.to_string();

    // w1's fee goes to w2, so w2's wallet is touched by three legs of the
    // same swap and must net them all
    h.exchange(
        &w1,
        "10",
        &t_s,
        "5",
        &w2.address,
        &w2,
        "20",
        &t_s,
        "0",
        "",
    )
    .unwrap();
    assert_eq!(h.holdings(&w1.address, t), 105);
    assert_eq!(h.holdings(&w2.address, t), 95);
}

#[test]
fn test_exchange_rolls_back_when_one_leg_fails() {
    let mut h = Harness::new();
    let w1 = h.actor("w1");
    let w2 = h.actor("w2");
    let fee_addr = h.actor("fee-collector");
    let t1 = h.register_token(&w1, 0, "200", &[(&w1.address, "200")]);
    let t2 = h.register_token(&w2, 0, "5", &[(&w2.address, "5")]);
    let (t1_s, t2_s) = (t1.to_string(), t2.to_string());

    // w2 cannot cover 7 + 1 fee of t2, so the whole swap must unwind
    let err = h
        .exchange(
            &w1,
            "100",
            &t1_s,
            "1",
            &fee_addr.address,
            &w2,
            "7",
            &t2_s,
            "1",
            &fee_addr.address,
        )
        .unwrap_err();
    assert_eq!(err.code(), 5000);
    assert_eq!(h.holdings(&w1.address, t1), 200);
    assert_eq!(h.holdings(&w2.address, t2), 5);
    assert_eq!(h.holdings(&fee_addr.address, t1), 0);

    // a swap w2 can cover clears both legs and both fees
    h.exchange(
        &w1,
        "100",
        &t1_s,
        "1",
        &fee_addr.address,
        &w2,
        "4",
        &t2_s,
        "1",
        &fee_addr.address,
    )
    .unwrap();
    assert_eq!(h.holdings(&w1.address, t1), 99);
    assert_eq!(h.holdings(&w1.address, t2), 4);
    assert_eq!(h.holdings(&w2.address, t1), 100);
    assert_eq!(h.holdings(&w2.address, t2), 0);
    assert_eq!(h.holdings(&fee_addr.address, t1), 1);
    assert_eq!(h.holdings(&fee_addr.address, t2), 1);
}
